//! Plain sensor readings handed to the flight computer once per tick.

use crate::time::TimeOfDay;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3 { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

/// Position fix from the GPS receiver.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,  // degrees
    pub longitude: f64, // degrees
    pub num_satellites: u8,
    pub timestamp: TimeOfDay,
}

/// Readings only the atmospheric sensing capsule carries.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AtmosphericReading {
    pub voc: u16,         // Raw 0-1023 counts from the VOC sensor
    pub humidity: f32,    // Relative humidity, %
    pub temperature: f32, // Celsius
}

/// Everything one frame describes. Copied by value into each consumer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SensorReading {
    pub coordinates: Coordinates,
    pub gyro: Vector3,         // rad/s
    pub acceleration: Vector3, // m/s^2
    pub altitude_agl_ft: f32,
    pub atmosphere: Option<AtmosphericReading>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn magnitude_of_resting_accelerometer() {
        assert_relative_eq!(Vector3::new(0.0, 0.0, 9.81).magnitude(), 9.81);
        assert_relative_eq!(Vector3::new(3.0, 4.0, 12.0).magnitude(), 13.0);
    }
}
