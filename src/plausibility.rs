//! The one sanity check each sensor gets before its readings are trusted.

use log::warn;

use crate::constants::{
    FEET_PER_METER, MAX_GRAVITY_METERS_PER_SECOND_SQUARED, MAX_SEA_LEVEL_PRESSURE_HPA,
    MIN_GRAVITY_METERS_PER_SECOND_SQUARED, MIN_SEA_LEVEL_PRESSURE_HPA,
};
use crate::reading::Vector3;

/// Whether a pressure read on the pad is believable as the local sea level reference.
pub fn sea_level_pressure_plausible(pressure_hpa: f32) -> bool {
    let plausible =
        (MIN_SEA_LEVEL_PRESSURE_HPA..=MAX_SEA_LEVEL_PRESSURE_HPA).contains(&pressure_hpa);
    if !plausible {
        warn!("Sea level pressure {} hPa is not plausible", pressure_hpa);
    }
    plausible
}

/// Whether a resting accelerometer reads something close to gravity.
pub fn gravity_plausible(acceleration: &Vector3) -> bool {
    let magnitude = acceleration.magnitude();
    let plausible = (MIN_GRAVITY_METERS_PER_SECOND_SQUARED
        ..=MAX_GRAVITY_METERS_PER_SECOND_SQUARED)
        .contains(&magnitude);
    if !plausible {
        warn!("Resting acceleration {} m/s^2 is not plausible", magnitude);
    }
    plausible
}

pub fn meters_to_feet(meters: f32) -> f32 {
    meters * FEET_PER_METER
}
