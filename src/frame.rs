//! Fixed layout binary telemetry frame.
//!
//! A frame is the densest encoding of one [`SensorReading`] we send over the radio or append to
//! storage. Multi-byte fields are little endian and there is never any padding between or after
//! fields:
//!
//! | Offset | Width | Field                         | Encoding                         |
//! |--------|-------|-------------------------------|----------------------------------|
//! | 0      | 4     | latitude                      | `i32`, degrees x 10^7            |
//! | 4      | 4     | longitude                     | `i32`, degrees x 10^7            |
//! | 8      | 4     | timestamp                     | `u32`, ms since local midnight   |
//! | 12     | 1     | satellites                    | `u8`                             |
//! | 13     | 1     | pitch (gyro x)                | `i8`, deg/s                      |
//! | 14     | 1     | roll (gyro y)                 | `i8`, deg/s                      |
//! | 15     | 1     | yaw (gyro z)                  | `i8`, deg/s                      |
//! | 16     | 6     | acceleration x, y, z          | `i16` each, cm/s^2               |
//! | 22     | 2     | altitude                      | `i16`, feet AGL                  |
//! | 24     | 2     | VOC (extended only)           | `u16`, raw counts                |
//! | 26     | 2     | temperature (extended only)   | `i16`, tenths of a degree C      |
//! | 28     | 1     | humidity (extended only)      | `u8`, %                          |
//!
//! Encoding never fails. Values that do not fit are truncated toward zero and saturate at the
//! limits of their integer type, except angular rates: anything beyond 127 deg/s in either
//! direction is written as -128.

use std::fmt;

use crate::constants::{COORDINATE_SCALE, MAX_ENCODED_RATE_DEGREES_PER_SECOND, SATURATED_RATE};
use crate::error::FrameError;
use crate::reading::{AtmosphericReading, Coordinates, SensorReading, Vector3};
use crate::time::TimeOfDay;

pub const STANDARD_FRAME_SIZE: usize = 4 + 4 + 4 + 1 + 3 + 3 * 2 + 2;
pub const ATMOSPHERIC_FIELDS_SIZE: usize = 2 + 2 + 1;
pub const EXTENDED_FRAME_SIZE: usize = STANDARD_FRAME_SIZE + ATMOSPHERIC_FIELDS_SIZE;
pub const MAX_FRAME_SIZE: usize = EXTENDED_FRAME_SIZE;

/// Which fields a build puts on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FrameLayout {
    /// Position, time, rates, acceleration and altitude.
    #[default]
    Standard,
    /// Standard fields followed by the atmospheric sensing fields.
    Extended,
}

impl FrameLayout {
    pub const fn from_extended_fields(extended_fields: bool) -> Self {
        if extended_fields {
            FrameLayout::Extended
        } else {
            FrameLayout::Standard
        }
    }

    pub const fn size(self) -> usize {
        match self {
            FrameLayout::Standard => STANDARD_FRAME_SIZE,
            FrameLayout::Extended => EXTENDED_FRAME_SIZE,
        }
    }

    pub const fn has_atmosphere(self) -> bool {
        matches!(self, FrameLayout::Extended)
    }
}

/// One encoded frame. Only the first `layout().size()` bytes are part of the frame.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bytes: [u8; MAX_FRAME_SIZE],
    layout: FrameLayout,
}

impl Frame {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.layout.size()]
    }

    pub fn layout(&self) -> FrameLayout {
        self.layout
    }

    pub fn len(&self) -> usize {
        self.layout.size()
    }

    /// Always false, every layout has a fixed non-zero size.
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("layout", &self.layout)
            .field("bytes", &self.as_bytes())
            .finish()
    }
}

/// The atmospheric fields as they appear on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AtmosphericFields {
    pub voc: u16,
    pub temperature: i16, // tenths of a degree C
    pub humidity: u8,
}

/// A frame's fields as the integers that appear on the wire.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameFields {
    pub latitude: i32,
    pub longitude: i32,
    pub timestamp: u32,
    pub num_satellites: u8,
    pub pitch: i8,
    pub roll: i8,
    pub yaw: i8,
    pub acceleration: [i16; 3], // cm/s^2
    pub altitude: i16,          // feet AGL
    pub atmosphere: Option<AtmosphericFields>,
}

impl FrameFields {
    /// Scales a reading into wire integers. An extended layout without an atmospheric reading
    /// gets zeroed atmospheric fields; a standard layout drops them.
    pub fn from_reading(reading: &SensorReading, layout: FrameLayout) -> Self {
        let atmosphere = layout.has_atmosphere().then(|| {
            let atmosphere = reading.atmosphere.unwrap_or_default();
            AtmosphericFields {
                voc: atmosphere.voc,
                temperature: (atmosphere.temperature * 10.0) as i16,
                humidity: atmosphere.humidity.clamp(0.0, 100.0) as u8,
            }
        });

        FrameFields {
            latitude: degrees_to_fixed_point(reading.coordinates.latitude),
            longitude: degrees_to_fixed_point(reading.coordinates.longitude),
            timestamp: reading.coordinates.timestamp.total_millis(),
            num_satellites: reading.coordinates.num_satellites,
            pitch: radians_to_capped_degrees(reading.gyro.x),
            roll: radians_to_capped_degrees(reading.gyro.y),
            yaw: radians_to_capped_degrees(reading.gyro.z),
            acceleration: [
                (reading.acceleration.x * 100.0) as i16,
                (reading.acceleration.y * 100.0) as i16,
                (reading.acceleration.z * 100.0) as i16,
            ],
            altitude: reading.altitude_agl_ft as i16,
            atmosphere,
        }
    }

    pub fn layout(&self) -> FrameLayout {
        FrameLayout::from_extended_fields(self.atmosphere.is_some())
    }

    pub fn to_frame(&self) -> Frame {
        let layout = self.layout();
        let mut writer = FrameWriter::new(layout);
        writer.put(self.latitude.to_le_bytes());
        writer.put(self.longitude.to_le_bytes());
        writer.put(self.timestamp.to_le_bytes());
        writer.put([self.num_satellites]);
        writer.put(self.pitch.to_le_bytes());
        writer.put(self.roll.to_le_bytes());
        writer.put(self.yaw.to_le_bytes());
        for axis in self.acceleration {
            writer.put(axis.to_le_bytes());
        }
        writer.put(self.altitude.to_le_bytes());
        if let Some(atmosphere) = self.atmosphere {
            writer.put(atmosphere.voc.to_le_bytes());
            writer.put(atmosphere.temperature.to_le_bytes());
            writer.put([atmosphere.humidity]);
        }
        writer.finish()
    }

    pub fn parse(bytes: &[u8], layout: FrameLayout) -> Result<Self, FrameError> {
        if bytes.len() != layout.size() {
            return Err(FrameError::WrongLength {
                expected: layout.size(),
                actual: bytes.len(),
            });
        }

        let mut reader = FrameReader { bytes, position: 0 };
        let mut fields = FrameFields {
            latitude: i32::from_le_bytes(reader.take()),
            longitude: i32::from_le_bytes(reader.take()),
            timestamp: u32::from_le_bytes(reader.take()),
            num_satellites: u8::from_le_bytes(reader.take()),
            pitch: i8::from_le_bytes(reader.take()),
            roll: i8::from_le_bytes(reader.take()),
            yaw: i8::from_le_bytes(reader.take()),
            acceleration: [
                i16::from_le_bytes(reader.take()),
                i16::from_le_bytes(reader.take()),
                i16::from_le_bytes(reader.take()),
            ],
            altitude: i16::from_le_bytes(reader.take()),
            atmosphere: None,
        };
        if layout.has_atmosphere() {
            fields.atmosphere = Some(AtmosphericFields {
                voc: u16::from_le_bytes(reader.take()),
                temperature: i16::from_le_bytes(reader.take()),
                humidity: u8::from_le_bytes(reader.take()),
            });
        }
        Ok(fields)
    }

    /// Converts wire integers back into physical units.
    pub fn to_reading(&self) -> SensorReading {
        SensorReading {
            coordinates: Coordinates {
                latitude: self.latitude as f64 / COORDINATE_SCALE,
                longitude: self.longitude as f64 / COORDINATE_SCALE,
                num_satellites: self.num_satellites,
                timestamp: TimeOfDay::from_total_millis(self.timestamp),
            },
            gyro: Vector3::new(
                (self.pitch as f32).to_radians(),
                (self.roll as f32).to_radians(),
                (self.yaw as f32).to_radians(),
            ),
            acceleration: Vector3::new(
                self.acceleration[0] as f32 / 100.0,
                self.acceleration[1] as f32 / 100.0,
                self.acceleration[2] as f32 / 100.0,
            ),
            altitude_agl_ft: self.altitude as f32,
            atmosphere: self.atmosphere.map(|atmosphere| AtmosphericReading {
                voc: atmosphere.voc,
                humidity: atmosphere.humidity as f32,
                temperature: atmosphere.temperature as f32 / 10.0,
            }),
        }
    }
}

pub fn encode(reading: &SensorReading, layout: FrameLayout) -> Frame {
    FrameFields::from_reading(reading, layout).to_frame()
}

/// Inverse of [`encode`], up to the precision each field is stored with.
pub fn decode(bytes: &[u8], layout: FrameLayout) -> Result<SensorReading, FrameError> {
    Ok(FrameFields::parse(bytes, layout)?.to_reading())
}

/// Angular rate in deg/s as a signed byte. Rates beyond 127 deg/s in either direction become
/// -128, so the sign of a saturated rate is lost.
pub fn radians_to_capped_degrees(radians: f32) -> i8 {
    let degrees = radians.to_degrees();
    if degrees.abs() > MAX_ENCODED_RATE_DEGREES_PER_SECOND {
        SATURATED_RATE
    } else {
        degrees as i8
    }
}

pub fn degrees_to_fixed_point(degrees: f64) -> i32 {
    (degrees * COORDINATE_SCALE) as i32
}

struct FrameWriter {
    bytes: [u8; MAX_FRAME_SIZE],
    position: usize,
    layout: FrameLayout,
}

impl FrameWriter {
    fn new(layout: FrameLayout) -> Self {
        FrameWriter {
            bytes: [0; MAX_FRAME_SIZE],
            position: 0,
            layout,
        }
    }

    fn put<const W: usize>(&mut self, field: [u8; W]) {
        self.bytes[self.position..self.position + W].copy_from_slice(&field);
        self.position += W;
    }

    fn finish(self) -> Frame {
        debug_assert_eq!(self.position, self.layout.size());
        Frame {
            bytes: self.bytes,
            layout: self.layout,
        }
    }
}

struct FrameReader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl FrameReader<'_> {
    fn take<const W: usize>(&mut self) -> [u8; W] {
        let mut field = [0; W];
        field.copy_from_slice(&self.bytes[self.position..self.position + W]);
        self.position += W;
        field
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn reading() -> SensorReading {
        SensorReading {
            coordinates: Coordinates {
                latitude: 43.2609876,
                longitude: -79.9192345,
                num_satellites: 11,
                timestamp: TimeOfDay::new(14, 3, 27, 512),
            },
            gyro: Vector3::new(0.5, -1.2, 2.0),
            acceleration: Vector3::new(0.12, -3.456, 98.1),
            altitude_agl_ft: 9123.7,
            atmosphere: Some(AtmosphericReading {
                voc: 412,
                humidity: 47.6,
                temperature: -12.34,
            }),
        }
    }

    #[test]
    fn frame_sizes_exclude_padding() {
        assert_eq!(STANDARD_FRAME_SIZE, 24);
        assert_eq!(EXTENDED_FRAME_SIZE, 29);
        assert_eq!(encode(&reading(), FrameLayout::Standard).as_bytes().len(), 24);
        assert_eq!(encode(&reading(), FrameLayout::Extended).as_bytes().len(), 29);
        assert_eq!(
            FrameLayout::Extended.size() - FrameLayout::Standard.size(),
            ATMOSPHERIC_FIELDS_SIZE
        );
    }

    #[test]
    fn byte_layout() {
        let frame = encode(&reading(), FrameLayout::Extended);
        let bytes = frame.as_bytes();
        assert_eq!(bytes[0..4], 432_609_876i32.to_le_bytes());
        assert_eq!(bytes[4..8], (-799_192_345i32).to_le_bytes());
        assert_eq!(bytes[8..12], 50_607_512u32.to_le_bytes());
        assert_eq!(bytes[12], 11);
        assert_eq!(bytes[13] as i8, 28); // 0.5 rad = 28.6 deg/s
        assert_eq!(bytes[14] as i8, -68); // -1.2 rad = -68.8 deg/s
        assert_eq!(bytes[15] as i8, 114); // 2.0 rad = 114.6 deg/s
        assert_eq!(bytes[16..18], 12i16.to_le_bytes());
        assert_eq!(bytes[18..20], (-345i16).to_le_bytes());
        assert_eq!(bytes[20..22], 9810i16.to_le_bytes());
        assert_eq!(bytes[22..24], 9123i16.to_le_bytes());
        assert_eq!(bytes[24..26], 412u16.to_le_bytes());
        assert_eq!(bytes[26..28], (-123i16).to_le_bytes());
        assert_eq!(bytes[28], 47);
    }

    #[test]
    fn standard_layout_is_prefix_of_extended() {
        let standard = encode(&reading(), FrameLayout::Standard);
        let extended = encode(&reading(), FrameLayout::Extended);
        assert_eq!(standard.as_bytes(), &extended.as_bytes()[..STANDARD_FRAME_SIZE]);
    }

    #[test]
    fn angular_rate_saturates_to_negative_cap() {
        let rate = 200f32.to_radians();
        assert_eq!(radians_to_capped_degrees(rate), -128);
        assert_eq!(radians_to_capped_degrees(-rate), -128);
        assert_eq!(radians_to_capped_degrees(127.5f32.to_radians()), -128);
        assert_eq!(radians_to_capped_degrees(126.5f32.to_radians()), 126);
        assert_eq!(radians_to_capped_degrees(-126.5f32.to_radians()), -126);
        assert_eq!(radians_to_capped_degrees(f32::NAN), 0);
    }

    #[test]
    fn scaled_fields_truncate_toward_zero() {
        let mut reading = reading();
        reading.acceleration = Vector3::new(-1.239, 1.239, 0.004);
        reading.altitude_agl_ft = -12.9;
        let fields = FrameFields::from_reading(&reading, FrameLayout::Standard);
        assert_eq!(fields.acceleration, [-123, 123, 0]);
        assert_eq!(fields.altitude, -12);
    }

    #[test]
    fn out_of_range_values_saturate() {
        let mut reading = reading();
        reading.acceleration = Vector3::new(1.0e6, -1.0e6, f32::NAN);
        reading.altitude_agl_ft = 100_000.0;
        reading.coordinates.latitude = 1.0e9;
        reading.atmosphere = Some(AtmosphericReading {
            voc: 1023,
            humidity: 140.0,
            temperature: 9999.0,
        });
        let fields = FrameFields::from_reading(&reading, FrameLayout::Extended);
        assert_eq!(fields.acceleration, [i16::MAX, i16::MIN, 0]);
        assert_eq!(fields.altitude, i16::MAX);
        assert_eq!(fields.latitude, i32::MAX);
        assert_eq!(
            fields.atmosphere,
            Some(AtmosphericFields {
                voc: 1023,
                temperature: i16::MAX,
                humidity: 100,
            })
        );
    }

    #[test]
    fn extended_layout_without_atmosphere_is_zeroed() {
        let mut reading = reading();
        reading.atmosphere = None;
        let frame = encode(&reading, FrameLayout::Extended);
        assert_eq!(frame.as_bytes()[STANDARD_FRAME_SIZE..], [0; ATMOSPHERIC_FIELDS_SIZE]);
    }

    fn assert_round_trip(sent: &SensorReading) {
        for layout in [FrameLayout::Standard, FrameLayout::Extended] {
            let decoded = decode(encode(sent, layout).as_bytes(), layout).unwrap();

            let coordinates = decoded.coordinates;
            let coordinate_step = 1.000_001 / COORDINATE_SCALE;
            assert_abs_diff_eq!(
                coordinates.latitude,
                sent.coordinates.latitude,
                epsilon = coordinate_step
            );
            assert_abs_diff_eq!(
                coordinates.longitude,
                sent.coordinates.longitude,
                epsilon = coordinate_step
            );
            assert_eq!(coordinates.timestamp, sent.coordinates.timestamp);
            assert_eq!(coordinates.num_satellites, sent.coordinates.num_satellites);

            let one_degree = 1f32.to_radians() + 1e-6;
            let rates = [
                (decoded.gyro.x, sent.gyro.x),
                (decoded.gyro.y, sent.gyro.y),
                (decoded.gyro.z, sent.gyro.z),
            ];
            for (received, rate) in rates {
                if radians_to_capped_degrees(rate) == SATURATED_RATE {
                    assert_eq!(received, (SATURATED_RATE as f32).to_radians());
                } else {
                    assert_abs_diff_eq!(received, rate, epsilon = one_degree);
                }
            }

            assert_abs_diff_eq!(decoded.acceleration.x, sent.acceleration.x, epsilon = 0.0101);
            assert_abs_diff_eq!(decoded.acceleration.y, sent.acceleration.y, epsilon = 0.0101);
            assert_abs_diff_eq!(decoded.acceleration.z, sent.acceleration.z, epsilon = 0.0101);
            assert_abs_diff_eq!(decoded.altitude_agl_ft, sent.altitude_agl_ft, epsilon = 1.0);

            match layout {
                FrameLayout::Standard => assert!(decoded.atmosphere.is_none()),
                FrameLayout::Extended => {
                    let atmosphere = decoded.atmosphere.unwrap();
                    let expected = sent.atmosphere.unwrap_or_default();
                    assert_eq!(atmosphere.voc, expected.voc);
                    assert_abs_diff_eq!(
                        atmosphere.temperature,
                        expected.temperature,
                        epsilon = 0.1001
                    );
                    assert_abs_diff_eq!(atmosphere.humidity, expected.humidity, epsilon = 1.0);
                }
            }
        }
    }

    #[test]
    fn round_trip_within_precision() {
        assert_round_trip(&reading());
    }

    #[test]
    fn round_trip_at_field_extremes() {
        let corners = [(90.0, 180.0), (-90.0, -180.0), (90.0, -180.0), (-90.0, 180.0)];
        let rates = [127.0f32, -127.0, 126.9, -126.9];
        let times = [TimeOfDay::MIDNIGHT, TimeOfDay::new(23, 59, 59, 999)];

        for (latitude, longitude) in corners {
            for rate in rates {
                for timestamp in times {
                    let mut sent = reading();
                    sent.coordinates.latitude = latitude;
                    sent.coordinates.longitude = longitude;
                    sent.coordinates.timestamp = timestamp;
                    let radians = rate.to_radians();
                    sent.gyro = Vector3::new(radians, -radians, radians);
                    sent.acceleration = Vector3::new(-9.81, -156.2, -0.005);
                    sent.altitude_agl_ft = -42.5;
                    assert_round_trip(&sent);
                }
            }
        }

        // 127 deg/s lands just past the cap after the radian round trip.
        assert_eq!(radians_to_capped_degrees(127f32.to_radians()), SATURATED_RATE);
        assert_eq!(radians_to_capped_degrees(126.9f32.to_radians()), 126);
        assert_eq!(radians_to_capped_degrees((-126.9f32).to_radians()), -126);
    }

    #[test]
    fn parse_inverts_to_frame() {
        let fields = FrameFields::from_reading(&reading(), FrameLayout::Extended);
        let frame = fields.to_frame();
        assert_eq!(FrameFields::parse(frame.as_bytes(), frame.layout()).unwrap(), fields);
    }

    #[test]
    fn rejects_wrong_length() {
        let frame = encode(&reading(), FrameLayout::Extended);
        match decode(frame.as_bytes(), FrameLayout::Standard) {
            Err(FrameError::WrongLength { expected, actual }) => {
                assert_eq!(expected, 24);
                assert_eq!(actual, 29);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(decode(&[], FrameLayout::Standard).is_err());
    }
}
