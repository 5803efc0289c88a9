//! Constants used throughout the program.

/// Altitude (feet AGL) at or above which we start watching for a decreasing trend:
pub const ARM_ALTITUDE_FEET: f32 = 9000.0;

/// Window capacity used with the strict policy on the flight computer:
pub const STRICT_WINDOW_SIZE: usize = 5;
/// Window capacity used with the majority-vote policy:
pub const MAJORITY_WINDOW_SIZE: usize = 100;

/// Window capacities the command line tools know how to instantiate.
pub const SUPPORTED_WINDOW_SIZES: [usize; 5] = [5, 20, 50, 100, 200];

pub const FEET_PER_METER: f32 = 3.28084;

/// Sea level pressure window (hPa) the altimeter must read at power-up to be trusted:
pub const MIN_SEA_LEVEL_PRESSURE_HPA: f32 = 929.0;
pub const MAX_SEA_LEVEL_PRESSURE_HPA: f32 = 1041.0;

/// Magnitude window (m/s^2) a resting accelerometer must report to be trusted:
pub const MIN_GRAVITY_METERS_PER_SECOND_SQUARED: f32 = 9.6;
pub const MAX_GRAVITY_METERS_PER_SECOND_SQUARED: f32 = 10.0;

/// Angular rates above this magnitude (deg/s) do not fit in a frame and are replaced by -128.
pub const MAX_ENCODED_RATE_DEGREES_PER_SECOND: f32 = 127.0;
pub const SATURATED_RATE: i8 = -128;

/// Scale from degrees to the fixed point latitude/longitude in a frame.
pub const COORDINATE_SCALE: f64 = 1.0e7;

/// Standard deviation of the altitude noise added by the replay tool (feet):
pub const REPLAY_NOISE_STDEV_FEET: f32 = 1.4432;
pub const REPLAY_RUNS: usize = 10;

pub const DEFAULT_SERIAL_PORT: &str = "/dev/ttyS0";
pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub const SERIAL_TIMEOUT_MILLISECONDS: u64 = 7000;
