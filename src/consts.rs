//! Constants describing the IRIG-B frame layout and pulse shapes.
//!
//! This module defines the fixed bit-slot assignment of the 60-bit frame,
//! the widths of the BCD fields placed into it, and the duty cycles of the
//! three pulse shapes used on the output line.
//!
//! ## Frame Layout
//!
//! | Field              | Frame bits             | Width |
//! |--------------------|------------------------|-------|
//! | Position markers   | 0, 10, 20, 30, 40, 50  | 1     |
//! | Seconds            | 1–8                    | 8     |
//! | Minutes            | 10–17                  | 8     |
//! | Hours              | 20–27                  | 8     |
//! | Day-of-year (high) | 30–39                  | 10    |
//! | Day-of-year (low)  | 40–48                  | 9     |
//!
//! All other slots are unused and always carry a logical `0`.
//!
//! These values should be used wherever frame layout or pulse timing is implemented to
//! keep the builder, decoder and transmitter in agreement.

/// Number of bits in one IRIG-B frame.
pub const FRAME_LEN: usize = 60;

/// Distance between position markers. Every index with `index % MARKER_INTERVAL == 0`
/// is rendered as a marker pulse regardless of the bit it stores.
pub const MARKER_INTERVAL: usize = 10;

/// First frame bit of the seconds field.
pub const SECONDS_OFFSET: usize = 1;
/// Width of the seconds BCD field.
pub const SECONDS_WIDTH: u8 = 8;

/// First frame bit of the minutes field.
pub const MINUTES_OFFSET: usize = 10;
/// Width of the minutes BCD field.
pub const MINUTES_WIDTH: u8 = 8;

/// First frame bit of the hours field.
pub const HOURS_OFFSET: usize = 20;
/// Width of the hours BCD field.
pub const HOURS_WIDTH: u8 = 8;

/// Width of the full day-of-year BCD field before it is split across two frame regions.
pub const DAY_OF_YEAR_WIDTH: u8 = 17;

/// First frame bit of the high part of the day-of-year field.
pub const DAY_HIGH_OFFSET: usize = 30;
/// Number of day-of-year bits stored in the high region (bits 30–39).
pub const DAY_HIGH_WIDTH: usize = 10;

/// First frame bit of the low part of the day-of-year field.
pub const DAY_LOW_OFFSET: usize = 40;
/// Number of frame slots reserved for the low region (bits 40–48).
///
/// Only the remaining 7 bits of the 17-bit field are produced; the last two slots are
/// always padded with `false`.
pub const DAY_LOW_WIDTH: usize = 9;

/// Largest BCD field width supported by the encoder (8 decimal digits).
pub const MAX_BCD_WIDTH: usize = 32;

/// High time of a position marker, in tenths of a bit duration (800 ms of a 1 s bit).
pub const MARKER_HIGH_TENTHS: u32 = 8;

/// High time of a logical `1`, in tenths of a bit duration (500 ms of a 1 s bit).
pub const ONE_HIGH_TENTHS: u32 = 5;

/// High time of a logical `0`, in tenths of a bit duration (200 ms of a 1 s bit).
pub const ZERO_HIGH_TENTHS: u32 = 2;
