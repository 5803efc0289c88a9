//! Flight configuration: window, trend policy, arm altitude and frame layout.

use std::fs::read_to_string;
use std::path::Path;

use serde::Deserialize;

use crate::constants::{ARM_ALTITUDE_FEET, STRICT_WINDOW_SIZE, SUPPORTED_WINDOW_SIZES};
use crate::error::ConfigError;
use crate::frame::FrameLayout;
use crate::state::DetectorConfig;
use crate::trend::TrendPolicy;

/// Every knob of the flight computer. Missing keys in a config file fall back to the
/// defaults in [`crate::constants`].
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlightConfig {
    pub window_capacity: usize,
    pub policy: TrendPolicy,
    pub arm_threshold: f32,
    pub extended_fields: bool,
}

impl Default for FlightConfig {
    fn default() -> Self {
        FlightConfig {
            window_capacity: STRICT_WINDOW_SIZE,
            policy: TrendPolicy::Strict,
            arm_threshold: ARM_ALTITUDE_FEET,
            extended_fields: false,
        }
    }
}

impl FlightConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FlightConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Self::from_json(&read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if SUPPORTED_WINDOW_SIZES.contains(&self.window_capacity) {
            Ok(())
        } else {
            Err(ConfigError::UnsupportedWindow(self.window_capacity))
        }
    }

    pub fn detector(&self) -> DetectorConfig {
        DetectorConfig {
            arm_threshold: self.arm_threshold,
            policy: self.policy,
        }
    }

    pub fn layout(&self) -> FrameLayout {
        FrameLayout::from_extended_fields(self.extended_fields)
    }
}
