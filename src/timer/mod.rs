//! Bit timing for IRIG-B transmission.
//!
//! Every frame bit occupies exactly one bit duration, split into a high phase and a low
//! phase according to its [`Symbol`]. Durations are kept in integer nanoseconds, which
//! is what [`embedded_hal::delay::DelayNs`] takes, and the low phase is always computed
//! as the remainder of the bit so the two phases sum to the bit duration exactly.
//!
//! Contains helpers for bit scheduling, including:
//! - [`PulseTiming::for_symbol`]: high/low split of one bit
//! - [`bit_duration_from_millis`] and [`bit_duration_from_rate`]: bit duration calculators
//! - [`DeadlineDelay`]: a `DelayNs` provider that sleeps until absolute deadlines
//!   (feature `std`)
//!
//! Common bit durations:
//!
//! | Bit duration | `bit_duration_ns` | Frame duration |
//! |--------------|-------------------|----------------|
//! |       1 s    |     1_000_000_000 |           60 s |
//! |     100 ms   |       100_000_000 |            6 s |
//! |      10 ms   |        10_000_000 |          600 ms |

use crate::frame::Symbol;

#[cfg(feature = "std")]
mod deadline;
#[cfg(feature = "std")]
pub use deadline::DeadlineDelay;

/// 1,000,000,000 nanoseconds = 1 second
pub const NANOS_PER_SECOND: u32 = 1_000_000_000;
/// 1,000,000 nanoseconds = 1 millisecond
pub const NANOS_PER_MILLISECOND: u32 = 1_000_000;
/// The conventional IRIG-B bit duration of one second.
pub const DEFAULT_BIT_DURATION_NS: u32 = NANOS_PER_SECOND;
/// Shortest accepted bit duration; below this a 2/10 phase would round to zero.
pub const MIN_BIT_DURATION_NS: u32 = 10;

/// The two phases of one transmitted bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseTiming {
    /// Time the line is held high, in nanoseconds.
    pub high_ns: u32,
    /// Time the line is held low after the high phase, in nanoseconds.
    pub low_ns: u32,
}

impl PulseTiming {
    /// Splits `bit_duration_ns` for `symbol`.
    ///
    /// The high phase is `high_tenths / 10` of the bit (rounded down); the low phase is
    /// the rest, so `high_ns + low_ns == bit_duration_ns` for every input.
    pub const fn for_symbol(symbol: Symbol, bit_duration_ns: u32) -> Self {
        let high_ns = (bit_duration_ns as u64 * symbol.high_tenths() as u64 / 10) as u32;
        Self {
            high_ns,
            low_ns: bit_duration_ns - high_ns,
        }
    }

    /// Total duration of the bit.
    pub const fn total_ns(&self) -> u32 {
        self.high_ns + self.low_ns
    }
}

/// Converts a bit duration in milliseconds into nanoseconds.
///
/// # Returns
/// `None` if the result does not fit in a `u32` (about 4.29 s).
pub const fn bit_duration_from_millis(millis: u32) -> Option<u32> {
    millis.checked_mul(NANOS_PER_MILLISECOND)
}

/// Compute the bit duration for a bit rate
///
/// # Arguments
/// - `bits_per_second`: desired bit rate (1 for standard one-second bits)
///
/// # Returns
/// - Bit duration in nanoseconds, or `None` for a zero rate
pub const fn bit_duration_from_rate(bits_per_second: u32) -> Option<u32> {
    NANOS_PER_SECOND.checked_div(bits_per_second)
}

/// Duration of a full 60-bit frame, in nanoseconds.
pub const fn frame_duration_ns(bit_duration_ns: u32) -> u64 {
    bit_duration_ns as u64 * crate::consts::FRAME_LEN as u64
}
