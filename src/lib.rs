//! Apogee detection and telemetry framing for a rocket payload.
//!
//! [`state::PhaseDetector`] watches altitude samples for apogee, [`frame::encode`] packs one
//! [`reading::SensorReading`] into a fixed size frame, and [`flight_computer::FlightComputer`]
//! runs both once per sampling tick.

pub mod config;
pub mod constants;
pub mod error;
pub mod flight_computer;
pub mod flight_log;
pub mod frame;
pub mod plausibility;
pub mod reading;
pub mod recorder;
pub mod state;
pub mod time;
pub mod transmitter;
pub mod trend;
pub mod window;

pub use config::FlightConfig;
pub use flight_computer::{FlightComputer, TickReport};
pub use frame::{Frame, FrameLayout, decode, encode};
pub use reading::SensorReading;
pub use state::{ApogeeEvent, DetectorConfig, FlightPhase, PhaseDetector};
pub use trend::TrendPolicy;
pub use window::SampleWindow;
