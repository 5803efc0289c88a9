//! GPS time of day.

use std::time::Duration;

use chrono::{NaiveTime, Timelike};

const MILLISECONDS_BITS: u32 = 10;
const SECONDS_BITS: u32 = 6;
const MINUTES_BITS: u32 = 6;
const HOURS_BITS: u32 = 5;

const SECONDS_SHIFT: u32 = MILLISECONDS_BITS;
const MINUTES_SHIFT: u32 = SECONDS_SHIFT + SECONDS_BITS;
const HOURS_SHIFT: u32 = MINUTES_SHIFT + MINUTES_BITS;

const MILLISECONDS_PER_DAY: u32 = 24 * 3_600_000;

const fn mask(bits: u32) -> u32 {
    (1 << bits) - 1
}

/// Time of day as reported by the GPS receiver.
///
/// Packed layout, used by the receiver and by older log files:
///
/// ```text
///  31     27 26     22 21       16 15       10 9                0
/// +---------+---------+-----------+-----------+------------------+
/// |  zero   |  hours  |  minutes  |  seconds  |   milliseconds   |
/// +---------+---------+-----------+-----------+------------------+
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub milliseconds: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay::new(0, 0, 0, 0);

    pub const fn new(hours: u8, minutes: u8, seconds: u8, milliseconds: u16) -> Self {
        TimeOfDay {
            hours,
            minutes,
            seconds,
            milliseconds,
        }
    }

    /// Milliseconds since local midnight.
    pub fn total_millis(&self) -> u32 {
        self.hours as u32 * 3_600_000
            + self.minutes as u32 * 60_000
            + self.seconds as u32 * 1000
            + self.milliseconds as u32
    }

    /// Inverse of [`TimeOfDay::total_millis`]; wraps at 24 hours.
    pub fn from_total_millis(total: u32) -> Self {
        let total = total % MILLISECONDS_PER_DAY;
        TimeOfDay {
            hours: (total / 3_600_000) as u8,
            minutes: (total / 60_000 % 60) as u8,
            seconds: (total / 1000 % 60) as u8,
            milliseconds: (total % 1000) as u16,
        }
    }

    /// Packs the fields into their bit positions. Fields wider than their slot are masked.
    pub fn to_packed(&self) -> u32 {
        (self.milliseconds as u32 & mask(MILLISECONDS_BITS))
            | (self.seconds as u32 & mask(SECONDS_BITS)) << SECONDS_SHIFT
            | (self.minutes as u32 & mask(MINUTES_BITS)) << MINUTES_SHIFT
            | (self.hours as u32 & mask(HOURS_BITS)) << HOURS_SHIFT
    }

    pub fn from_packed(raw: u32) -> Self {
        TimeOfDay {
            hours: (raw >> HOURS_SHIFT & mask(HOURS_BITS)) as u8,
            minutes: (raw >> MINUTES_SHIFT & mask(MINUTES_BITS)) as u8,
            seconds: (raw >> SECONDS_SHIFT & mask(SECONDS_BITS)) as u8,
            milliseconds: (raw & mask(MILLISECONDS_BITS)) as u16,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_millis(self.total_millis() as u64)
    }
}

impl From<NaiveTime> for TimeOfDay {
    fn from(time: NaiveTime) -> Self {
        TimeOfDay {
            hours: time.hour() as u8,
            minutes: time.minute() as u8,
            seconds: time.second() as u8,
            // Leap seconds show up as nanosecond values past one second.
            milliseconds: (time.nanosecond() / 1_000_000).min(999) as u16,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_millis_since_midnight() {
        let time = TimeOfDay::new(13, 45, 7, 250);
        assert_eq!(time.total_millis(), 13 * 3_600_000 + 45 * 60_000 + 7_000 + 250);
        assert_eq!(TimeOfDay::MIDNIGHT.total_millis(), 0);
        assert_eq!(TimeOfDay::new(23, 59, 59, 999).total_millis(), 86_399_999);
    }

    #[test]
    fn total_millis_inverse() {
        let time = TimeOfDay::new(23, 59, 59, 999);
        assert_eq!(TimeOfDay::from_total_millis(time.total_millis()), time);
        assert_eq!(TimeOfDay::from_total_millis(MILLISECONDS_PER_DAY), TimeOfDay::MIDNIGHT);
    }

    #[test]
    fn packed_bit_layout() {
        let time = TimeOfDay::new(1, 2, 3, 4);
        assert_eq!(time.to_packed(), 1 << 22 | 2 << 16 | 3 << 10 | 4);
        assert_eq!(TimeOfDay::from_packed(time.to_packed()), time);

        let latest = TimeOfDay::new(23, 59, 59, 999);
        assert_eq!(TimeOfDay::from_packed(latest.to_packed()), latest);
        assert_eq!(latest.to_packed() >> 27, 0);
    }

    #[test]
    fn from_packed_ignores_high_bits() {
        let raw = 0xF800_0000 | TimeOfDay::new(5, 6, 7, 8).to_packed();
        assert_eq!(TimeOfDay::from_packed(raw), TimeOfDay::new(5, 6, 7, 8));
    }

    #[test]
    fn from_chrono() {
        let time = NaiveTime::from_hms_milli_opt(18, 30, 15, 123).unwrap();
        assert_eq!(TimeOfDay::from(time), TimeOfDay::new(18, 30, 15, 123));
    }
}
