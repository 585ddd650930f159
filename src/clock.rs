//! Time sources.
//!
//! The generator samples the current UTC time once at the start of every frame cycle.
//! Any `FnMut() -> TimeSample` works as a source; [`SystemClock`] reads the host clock
//! through `chrono` (feature `chrono`).

use crate::frame::TimeSample;

/// Provides the current UTC time of day and day of year.
pub trait TimeSource {
    /// Samples the current time. Leap seconds are not represented.
    fn now_utc(&mut self) -> TimeSample;
}

impl<F: FnMut() -> TimeSample> TimeSource for F {
    fn now_utc(&mut self) -> TimeSample {
        self()
    }
}

/// The host's wall clock, read as UTC.
#[cfg(feature = "chrono")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

#[cfg(feature = "chrono")]
impl SystemClock {
    /// Converts a `chrono` UTC timestamp into a sample.
    pub fn sample_of(time: &chrono::DateTime<chrono::Utc>) -> TimeSample {
        use chrono::{Datelike, Timelike};

        TimeSample {
            // chrono reports a leap second as second 59 with an overlong nanosecond field.
            seconds: time.second() as u8,
            minutes: time.minute() as u8,
            hours: time.hour() as u8,
            day_of_year: time.ordinal() as u16,
        }
    }
}

#[cfg(feature = "chrono")]
impl TimeSource for SystemClock {
    fn now_utc(&mut self) -> TimeSample {
        Self::sample_of(&chrono::Utc::now())
    }
}
