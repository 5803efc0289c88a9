//! Reading recorded flights back in and replaying them through the detector.

use std::io::Read;
use std::time::Duration;

use csv::{ReaderBuilder, Trim};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::Deserialize;

use crate::error::FlightLogError;
use crate::reading::{AtmosphericReading, Coordinates, SensorReading, Vector3};
use crate::state::{ApogeeEvent, DetectorConfig, PhaseDetector};
use crate::time::TimeOfDay;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AltitudeSample {
    pub time: f32, // seconds since launch
    pub altitude: f32,
}

/// Reads `time,altitude` rows. Extra columns are ignored, a non-numeric first row is taken as
/// a header, and thousands separators inside quoted numbers (`"9,050"`) are accepted.
pub fn read_altitude_log<R: Read>(reader: R) -> Result<Vec<AltitudeSample>, FlightLogError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let line = index + 1;
        let (Some(time), Some(altitude)) = (record.get(0), record.get(1)) else {
            return Err(FlightLogError::MissingColumns { line });
        };

        match (parse_number(time), parse_number(altitude)) {
            (Some(time), Some(altitude)) => samples.push(AltitudeSample { time, altitude }),
            _ if line == 1 => continue,
            _ => {
                return Err(FlightLogError::InvalidNumber {
                    line,
                    value: format!("{},{}", time, altitude),
                });
            }
        }
    }
    Ok(samples)
}

fn parse_number(field: &str) -> Option<f32> {
    field.replace(',', "").trim().parse().ok()
}

/// One row of a full sensor log.
#[derive(Clone, Debug, Deserialize)]
pub struct SensorRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub satellites: u8,
    pub time_ms: u32,
    pub gyro_x: f32,
    pub gyro_y: f32,
    pub gyro_z: f32,
    pub accel_x: f32,
    pub accel_y: f32,
    pub accel_z: f32,
    pub altitude_agl: f32,
    pub voc: Option<u16>,
    pub humidity: Option<f32>,
    pub temperature: Option<f32>,
}

impl From<SensorRecord> for SensorReading {
    fn from(record: SensorRecord) -> Self {
        let has_atmosphere =
            record.voc.is_some() || record.humidity.is_some() || record.temperature.is_some();
        SensorReading {
            coordinates: Coordinates {
                latitude: record.latitude,
                longitude: record.longitude,
                num_satellites: record.satellites,
                timestamp: TimeOfDay::from_total_millis(record.time_ms),
            },
            gyro: Vector3::new(record.gyro_x, record.gyro_y, record.gyro_z),
            acceleration: Vector3::new(record.accel_x, record.accel_y, record.accel_z),
            altitude_agl_ft: record.altitude_agl,
            atmosphere: has_atmosphere.then(|| AtmosphericReading {
                voc: record.voc.unwrap_or(0),
                humidity: record.humidity.unwrap_or(0.0),
                temperature: record.temperature.unwrap_or(0.0),
            }),
        }
    }
}

/// Reads a sensor log with a header row naming the [`SensorRecord`] columns.
pub fn read_sensor_log<R: Read>(reader: R) -> Result<Vec<SensorReading>, FlightLogError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut readings = Vec::new();
    for record in reader.deserialize::<SensorRecord>() {
        readings.push(record?.into());
    }
    Ok(readings)
}

/// Feeds a recorded flight through a fresh detector, adding zero-mean Gaussian noise with
/// `noise_stdev` to every sample. Returns the apogee event, if the flight produced one.
pub fn replay<const N: usize, R: Rng + ?Sized>(
    samples: &[AltitudeSample],
    config: DetectorConfig,
    noise_stdev: f32,
    rng: &mut R,
) -> Result<Option<ApogeeEvent>, FlightLogError> {
    // Normal::new only rejects non-finite deviations.
    if !(noise_stdev >= 0.0 && noise_stdev.is_finite()) {
        return Err(FlightLogError::InvalidNoise(noise_stdev));
    }
    let noise =
        Normal::new(0.0, noise_stdev).map_err(|_| FlightLogError::InvalidNoise(noise_stdev))?;
    let mut detector = PhaseDetector::<N>::new(config);

    for sample in samples {
        let altitude = sample.altitude + noise.sample(rng);
        let timestamp = Duration::try_from_secs_f32(sample.time).unwrap_or_default();
        if let Some(event) = detector.tick(altitude, timestamp) {
            return Ok(Some(event));
        }
    }
    Ok(None)
}
