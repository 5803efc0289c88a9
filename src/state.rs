//! Flight phase state machine driven by altitude samples.

use std::fmt;
use std::time::Duration;

use log::{debug, info};

use crate::constants::ARM_ALTITUDE_FEET;
use crate::trend::TrendPolicy;
use crate::window::SampleWindow;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum FlightPhase {
    /// Below the arm altitude, nothing is recorded yet.
    #[default]
    BelowThreshold,
    /// Armed; every sample goes into the window and the trend is checked.
    Ascending,
    /// Apogee has been detected. Terminal.
    PastApogee,
}

impl FlightPhase {
    pub fn name(&self) -> &'static str {
        match self {
            FlightPhase::BelowThreshold => "BelowThreshold",
            FlightPhase::Ascending => "Ascending",
            FlightPhase::PastApogee => "PastApogee",
        }
    }

    /// Single character used when a phase has to fit in a narrow column.
    pub fn code(&self) -> char {
        match self {
            FlightPhase::BelowThreshold => 'B',
            FlightPhase::Ascending => 'A',
            FlightPhase::PastApogee => 'P',
        }
    }
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Emitted once, on the tick that moves the detector into [`FlightPhase::PastApogee`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApogeeEvent {
    /// Zero based index of the tick, counting every sample the detector was given.
    pub tick: u64,
    /// Timestamp the caller supplied with the deciding sample.
    pub timestamp: Duration,
    /// The deciding sample itself, not the peak.
    pub altitude: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorConfig {
    pub arm_threshold: f32,
    pub policy: TrendPolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            arm_threshold: ARM_ALTITUDE_FEET,
            policy: TrendPolicy::Strict,
        }
    }
}

/// Decides when apogee has passed from a stream of altitude samples.
///
/// The detector only moves forward: `BelowThreshold -> Ascending -> PastApogee`. Samples are
/// written to the window only while ascending.
#[derive(Clone, Debug)]
pub struct PhaseDetector<const N: usize> {
    config: DetectorConfig,
    phase: FlightPhase,
    window: SampleWindow<N>,
    ticks: u64,
    apogee: Option<ApogeeEvent>,
}

impl<const N: usize> PhaseDetector<N> {
    pub fn new(config: DetectorConfig) -> Self {
        PhaseDetector {
            config,
            phase: FlightPhase::BelowThreshold,
            window: SampleWindow::new(),
            ticks: 0,
            apogee: None,
        }
    }

    pub fn phase(&self) -> FlightPhase {
        self.phase
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn window(&self) -> &SampleWindow<N> {
        &self.window
    }

    /// Number of samples fed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// The apogee event, once it has fired.
    pub fn apogee(&self) -> Option<ApogeeEvent> {
        self.apogee
    }

    /// Feeds one altitude sample. Returns the apogee event on the tick it is detected and
    /// `None` on every other tick.
    pub fn tick(&mut self, altitude: f32, timestamp: Duration) -> Option<ApogeeEvent> {
        let tick = self.ticks;
        self.ticks += 1;

        match self.phase {
            FlightPhase::BelowThreshold => {
                if altitude >= self.config.arm_threshold {
                    info!(
                        "Armed at tick {} ({} >= {}), watching for apogee",
                        tick, altitude, self.config.arm_threshold
                    );
                    self.phase = FlightPhase::Ascending;
                }
                None
            }
            FlightPhase::Ascending => {
                self.window.insert(altitude);
                if !self.config.policy.is_decreasing(&self.window) {
                    debug!("Tick {}: {} still ascending", tick, altitude);
                    return None;
                }

                let event = ApogeeEvent {
                    tick,
                    timestamp,
                    altitude,
                };
                info!(
                    "Apogee detected at tick {} ({:?}), {} policy over {} samples, window max {}",
                    tick,
                    timestamp,
                    self.config.policy,
                    N,
                    self.window.maximum()
                );
                self.phase = FlightPhase::PastApogee;
                self.apogee = Some(event);
                Some(event)
            }
            FlightPhase::PastApogee => None,
        }
    }
}

impl<const N: usize> Default for PhaseDetector<N> {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}
