use std::fs::{self, File};
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use log::{LevelFilter, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use payload_core::constants::{DEFAULT_BAUD_RATE, REPLAY_NOISE_STDEV_FEET, REPLAY_RUNS};
use payload_core::error::ConfigError;
use payload_core::flight_log::{AltitudeSample, read_altitude_log, read_sensor_log, replay};
use payload_core::plausibility::{gravity_plausible, meters_to_feet};
use payload_core::recorder::FrameRecorder;
use payload_core::transmitter::{Transmitter, spawn_downlink};
use payload_core::{
    ApogeeEvent, DetectorConfig, FlightComputer, FlightConfig, Frame, FrameLayout,
    SensorReading, TrendPolicy, decode,
};

/// Runs `$run::<N>(args..)` for the window capacity chosen at runtime.
macro_rules! with_window {
    ($capacity:expr, $run:ident($($arg:expr),* $(,)?)) => {
        match $capacity {
            5 => $run::<5>($($arg),*),
            20 => $run::<20>($($arg),*),
            50 => $run::<50>($($arg),*),
            100 => $run::<100>($($arg),*),
            200 => $run::<200>($($arg),*),
            other => Err(ConfigError::UnsupportedWindow(other).into()),
        }
    };
}

#[derive(Parser)]
#[command(name = "payload-core")]
#[command(about = "Apogee detection and telemetry frames for the payload flight computer")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Replay(ReplayArgs),
    Downlink(DownlinkArgs),
    Decode(DecodeArgs),
}

#[derive(clap::Args)]
struct FlightArgs {
    /// JSON flight config; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    window: Option<usize>,
    #[arg(long)]
    policy: Option<TrendPolicy>,
    #[arg(long)]
    arm_threshold: Option<f32>,
    #[arg(long)]
    extended: bool,
}

impl FlightArgs {
    fn resolve(&self) -> Result<FlightConfig> {
        let mut config = match &self.config {
            Some(path) => FlightConfig::read(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => FlightConfig::default(),
        };
        if let Some(window) = self.window {
            config.window_capacity = window;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(arm_threshold) = self.arm_threshold {
            config.arm_threshold = arm_threshold;
        }
        config.extended_fields |= self.extended;
        config.validate()?;
        Ok(config)
    }
}

#[derive(clap::Args)]
#[command(about = "Replay a time,altitude log with injected noise and report apogee")]
struct ReplayArgs {
    log: PathBuf,
    #[clap(flatten)]
    flight: FlightArgs,
    #[arg(long, default_value_t = REPLAY_NOISE_STDEV_FEET)]
    noise_stdev: f32,
    #[arg(long, default_value_t = REPLAY_RUNS)]
    runs: usize,
    #[arg(long)]
    seed: Option<u64>,
    /// The log's altitudes are in meters
    #[arg(long)]
    meters: bool,
}

#[derive(clap::Args)]
#[command(about = "Fly a sensor log through the flight computer and ship the frames")]
struct DownlinkArgs {
    log: PathBuf,
    #[clap(flatten)]
    flight: FlightArgs,
    /// Serial port of the radio
    #[arg(long, conflicts_with = "out")]
    port: Option<String>,
    #[arg(long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,
    /// Frame file to append to; defaults to a new timestamped file under frames/
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(clap::Args)]
#[command(about = "Decode a file of raw frames")]
struct DecodeArgs {
    file: PathBuf,
    #[arg(long)]
    extended: bool,
}

fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Replay(args) => replay_command(args),
        Commands::Downlink(args) => downlink_command(args),
        Commands::Decode(args) => decode_command(args),
    }
}

fn replay_command(args: ReplayArgs) -> Result<()> {
    let config = args.flight.resolve()?;
    let file = File::open(&args.log).with_context(|| format!("opening {}", args.log.display()))?;
    let mut samples = read_altitude_log(BufReader::new(file))?;
    if args.meters {
        for sample in &mut samples {
            sample.altitude = meters_to_feet(sample.altitude);
        }
    }
    info!(
        "Replaying {} samples: window {}, {} policy, armed at {}",
        samples.len(),
        config.window_capacity,
        config.policy,
        config.arm_threshold
    );

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let detector = config.detector();
    for run in 1..=args.runs {
        let apogee = with_window!(
            config.window_capacity,
            replay_run(&samples, detector, args.noise_stdev, &mut rng)
        )?;
        match apogee {
            Some(event) => println!(
                "Run {}: apogee at time {:.3} s ({:.1} ft)",
                run,
                event.timestamp.as_secs_f32(),
                event.altitude
            ),
            None => println!("Run {}: no apogee detected", run),
        }
    }
    Ok(())
}

fn replay_run<const N: usize>(
    samples: &[AltitudeSample],
    detector: DetectorConfig,
    noise_stdev: f32,
    rng: &mut StdRng,
) -> Result<Option<ApogeeEvent>> {
    Ok(replay::<N, _>(samples, detector, noise_stdev, rng)?)
}

fn downlink_command(args: DownlinkArgs) -> Result<()> {
    let config = args.flight.resolve()?;
    let file = File::open(&args.log).with_context(|| format!("opening {}", args.log.display()))?;
    let readings = read_sensor_log(BufReader::new(file))?;
    if let Some(first) = readings.first() {
        if !gravity_plausible(&first.acceleration) {
            warn!("First reading is not at rest on the pad, check the accelerometer");
        }
    }

    let (sender, receiver) = mpsc::channel();
    let downlink = match (&args.port, &args.out) {
        (Some(port), _) => spawn_downlink(Transmitter::open_serial(port, args.baud)?, receiver),
        (None, Some(path)) => spawn_downlink(
            FrameRecorder::open(path).with_context(|| format!("opening {}", path.display()))?,
            receiver,
        ),
        (None, None) => {
            let recorder = FrameRecorder::create_in("frames")?;
            info!("Recording frames to {}", recorder.path().display());
            spawn_downlink(recorder, receiver)
        }
    };

    let apogee = with_window!(config.window_capacity, fly(&config, readings, sender))?;
    let stats = downlink
        .join()
        .map_err(|_| anyhow!("downlink thread panicked"))?;

    if apogee.is_none() {
        println!("No apogee detected");
    }
    println!(
        "{} frames of {} bytes sent, {} dropped",
        stats.sent,
        config.layout().size(),
        stats.dropped
    );
    Ok(())
}

/// Runs every reading through a flight computer; the frames go to the downlink thread.
fn fly<const N: usize>(
    config: &FlightConfig,
    readings: Vec<SensorReading>,
    frames: Sender<Frame>,
) -> Result<Option<ApogeeEvent>> {
    let mut computer = FlightComputer::<N>::from_config(config)?;
    let mut apogee = None;
    for reading in readings {
        let report = computer.update(reading);
        if let Some(event) = report.apogee {
            println!(
                "Apogee at tick {}, {:?} after midnight ({:.1} ft)",
                event.tick, event.timestamp, event.altitude
            );
            apogee = Some(event);
        }
        frames
            .send(report.frame)
            .context("downlink thread stopped")?;
    }
    Ok(apogee)
}

fn decode_command(args: DecodeArgs) -> Result<()> {
    let layout = FrameLayout::from_extended_fields(args.extended);
    let bytes = fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let frames = bytes.chunks_exact(layout.size());
    if !frames.remainder().is_empty() {
        warn!(
            "Ignoring {} trailing bytes, not a whole {} byte frame",
            frames.remainder().len(),
            layout.size()
        );
    }

    for (index, chunk) in frames.enumerate() {
        let reading = decode(chunk, layout)?;
        let coordinates = reading.coordinates;
        let time = coordinates.timestamp;
        print!(
            "{:>5} {:02}:{:02}:{:02}.{:03} lat {:.7} lon {:.7} sats {:>2} alt {:>6} ft accel {:?} gyro {:?}",
            index,
            time.hours,
            time.minutes,
            time.seconds,
            time.milliseconds,
            coordinates.latitude,
            coordinates.longitude,
            coordinates.num_satellites,
            reading.altitude_agl_ft,
            reading.acceleration,
            reading.gyro,
        );
        match reading.atmosphere {
            Some(atmosphere) => println!(
                " voc {} humidity {}% temp {:.1} C",
                atmosphere.voc, atmosphere.humidity, atmosphere.temperature
            ),
            None => println!(),
        }
    }
    Ok(())
}
