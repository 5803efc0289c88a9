//! One sampling tick: phase detection and frame encoding from the same snapshot.

use log::{debug, info};

use crate::config::FlightConfig;
use crate::error::ConfigError;
use crate::frame::{self, Frame, FrameLayout};
use crate::reading::SensorReading;
use crate::state::{ApogeeEvent, DetectorConfig, FlightPhase, PhaseDetector};

/// What a single tick produced.
#[derive(Clone, Copy, Debug)]
pub struct TickReport {
    pub phase: FlightPhase,
    pub apogee: Option<ApogeeEvent>,
    pub frame: Frame,
}

pub struct FlightComputer<const N: usize> {
    detector: PhaseDetector<N>,
    layout: FrameLayout,
}

impl<const N: usize> FlightComputer<N> {
    pub fn new(detector: DetectorConfig, layout: FrameLayout) -> Self {
        FlightComputer {
            detector: PhaseDetector::new(detector),
            layout,
        }
    }

    /// Builds a flight computer from a config whose window capacity must be `N`.
    pub fn from_config(config: &FlightConfig) -> Result<Self, ConfigError> {
        if config.window_capacity != N {
            return Err(ConfigError::UnsupportedWindow(config.window_capacity));
        }
        Ok(Self::new(config.detector(), config.layout()))
    }

    pub fn phase(&self) -> FlightPhase {
        self.detector.phase()
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn detector(&self) -> &PhaseDetector<N> {
        &self.detector
    }

    /// Runs one tick. The reading is taken by value, neither consumer can change what the
    /// other sees.
    pub fn update(&mut self, reading: SensorReading) -> TickReport {
        let previous = self.detector.phase();
        let apogee = self.detector.tick(
            reading.altitude_agl_ft,
            reading.coordinates.timestamp.as_duration(),
        );
        let phase = self.detector.phase();
        if phase != previous {
            info!("Phase change: {} -> {}", previous, phase);
        }

        let frame = frame::encode(&reading, self.layout);
        debug!(
            "[{}] {} ft, {} byte frame",
            phase.code(),
            reading.altitude_agl_ft,
            frame.len()
        );

        TickReport {
            phase,
            apogee,
            frame,
        }
    }
}
