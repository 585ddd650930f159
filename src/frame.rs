//! IRIG-B frame construction.
//!
//! A [`Frame`] is built fresh from one [`TimeSample`] per cycle and is immutable
//! afterwards. It is consumed once by the [`transmitter`](crate::transmitter) and then
//! discarded.
//!
//! Marker status is purely positional: every index with `index % 10 == 0` is a
//! [`Symbol::Marker`], whatever boolean the frame happens to store there. The BCD fields
//! for minutes, hours and day-of-year start on marker slots, so the stored boolean at
//! those indices belongs to the field but is never put on the line.

use core::fmt;

use crate::consts::{
    DAY_HIGH_OFFSET, DAY_HIGH_WIDTH, DAY_LOW_OFFSET, DAY_LOW_WIDTH, DAY_OF_YEAR_WIDTH, FRAME_LEN,
    HOURS_OFFSET, HOURS_WIDTH, MARKER_HIGH_TENTHS, MARKER_INTERVAL, MINUTES_OFFSET,
    MINUTES_WIDTH, ONE_HIGH_TENTHS, SECONDS_OFFSET, SECONDS_WIDTH, ZERO_HIGH_TENTHS,
};
use crate::encoding::{decode_bcd, encode_bcd};
use crate::error::{EncodingError, FrameError};

/// One sample of the current UTC time, as carried by a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSample {
    /// Seconds, 0–59.
    pub seconds: u8,
    /// Minutes, 0–59.
    pub minutes: u8,
    /// Hours, 0–23.
    pub hours: u8,
    /// Day of the year, 1–366.
    pub day_of_year: u16,
}

impl TimeSample {
    /// Creates a new sample. No range checks are made here; out-of-range values are
    /// caught by the encoder only when they do not fit their BCD field.
    pub const fn new(seconds: u8, minutes: u8, hours: u8, day_of_year: u16) -> Self {
        Self {
            seconds,
            minutes,
            hours,
            day_of_year,
        }
    }
}

impl fmt::Display for TimeSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:03} {:02}:{:02}:{:02}",
            self.day_of_year, self.hours, self.minutes, self.seconds
        )
    }
}

/// The pulse shape used to transmit one frame bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// Position identifier: high for 8/10 of the bit.
    Marker,
    /// Logical `1`: high for 5/10 of the bit.
    One,
    /// Logical `0`: high for 2/10 of the bit.
    Zero,
}

impl Symbol {
    /// Classifies frame bit `index` holding `bit`.
    pub const fn classify(index: usize, bit: bool) -> Self {
        if Frame::is_marker(index) {
            Symbol::Marker
        } else if bit {
            Symbol::One
        } else {
            Symbol::Zero
        }
    }

    /// Length of the high phase in tenths of a bit duration.
    pub const fn high_tenths(self) -> u32 {
        match self {
            Symbol::Marker => MARKER_HIGH_TENTHS,
            Symbol::One => ONE_HIGH_TENTHS,
            Symbol::Zero => ZERO_HIGH_TENTHS,
        }
    }

    /// Character used when rendering a frame.
    pub const fn as_char(self) -> char {
        match self {
            Symbol::Marker => 'P',
            Symbol::One => '1',
            Symbol::Zero => '0',
        }
    }
}

/// A 60-bit IRIG-B frame.
///
/// The length invariant is carried by the type: the bits are stored in a
/// `[bool; FRAME_LEN]`, and [`Frame::from_bits`] refuses slices of any other length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    bits: [bool; FRAME_LEN],
}

impl Frame {
    /// Builds the frame for `sample`.
    ///
    /// Marker slots are set first, then the seconds, minutes and hours fields, then the
    /// 17-bit day-of-year field split into bits 30–39 and 40–48 (the last two slots of
    /// the low region stay `false`).
    ///
    /// # Errors
    /// Returns an [`EncodingError`] if a field value does not fit its BCD width.
    pub fn build(sample: &TimeSample) -> Result<Self, EncodingError> {
        let mut bits = [false; FRAME_LEN];
        for pos in (0..FRAME_LEN).step_by(MARKER_INTERVAL) {
            bits[pos] = true;
        }

        let seconds = encode_bcd(u32::from(sample.seconds), SECONDS_WIDTH)?;
        bits[SECONDS_OFFSET..SECONDS_OFFSET + seconds.len()].copy_from_slice(&seconds);

        let minutes = encode_bcd(u32::from(sample.minutes), MINUTES_WIDTH)?;
        bits[MINUTES_OFFSET..MINUTES_OFFSET + minutes.len()].copy_from_slice(&minutes);

        let hours = encode_bcd(u32::from(sample.hours), HOURS_WIDTH)?;
        bits[HOURS_OFFSET..HOURS_OFFSET + hours.len()].copy_from_slice(&hours);

        let day = encode_bcd(u32::from(sample.day_of_year), DAY_OF_YEAR_WIDTH)?;
        let (high, low) = day.split_at(DAY_HIGH_WIDTH);
        bits[DAY_HIGH_OFFSET..DAY_HIGH_OFFSET + DAY_HIGH_WIDTH].copy_from_slice(high);
        debug_assert!(low.len() <= DAY_LOW_WIDTH);
        bits[DAY_LOW_OFFSET..DAY_LOW_OFFSET + low.len()].copy_from_slice(low);

        Ok(Self { bits })
    }

    /// Wraps a raw bit sequence, checking the frame length invariant.
    ///
    /// # Errors
    /// [`FrameError::InvalidLength`] if `bits` does not hold exactly 60 values.
    pub fn from_bits(bits: &[bool]) -> Result<Self, FrameError> {
        let bits: [bool; FRAME_LEN] = bits
            .try_into()
            .map_err(|_| FrameError::InvalidLength(bits.len()))?;
        Ok(Self { bits })
    }

    /// Whether frame index `index` is a position marker slot.
    pub const fn is_marker(index: usize) -> bool {
        index % MARKER_INTERVAL == 0
    }

    /// The stored bits.
    pub fn bits(&self) -> &[bool; FRAME_LEN] {
        &self.bits
    }

    /// Number of bits in the frame, always [`FRAME_LEN`].
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Always `false`; frames are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The pulse shape for bit `index`, or `None` past the end of the frame.
    pub fn symbol(&self, index: usize) -> Option<Symbol> {
        self.bits
            .get(index)
            .map(|&bit| Symbol::classify(index, bit))
    }

    /// Iterates over the pulse shapes of all 60 bits, in transmission order.
    pub fn symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.bits
            .iter()
            .enumerate()
            .map(|(index, &bit)| Symbol::classify(index, bit))
    }

    /// Recovers the time sample stored in the frame.
    ///
    /// This reads the stored booleans, including the field bits that share marker slots.
    ///
    /// # Errors
    /// [`EncodingError::InvalidDigit`] if a field holds a nibble above 9.
    pub fn decode(&self) -> Result<TimeSample, EncodingError> {
        let field = |offset: usize, width: u8| {
            decode_bcd(&self.bits[offset..offset + usize::from(width)])
        };

        let mut day = [false; DAY_OF_YEAR_WIDTH as usize];
        let low_width = day.len() - DAY_HIGH_WIDTH;
        day[..DAY_HIGH_WIDTH].copy_from_slice(
            &self.bits[DAY_HIGH_OFFSET..DAY_HIGH_OFFSET + DAY_HIGH_WIDTH],
        );
        day[DAY_HIGH_WIDTH..]
            .copy_from_slice(&self.bits[DAY_LOW_OFFSET..DAY_LOW_OFFSET + low_width]);

        Ok(TimeSample {
            seconds: narrow(field(SECONDS_OFFSET, SECONDS_WIDTH)?)?,
            minutes: narrow(field(MINUTES_OFFSET, MINUTES_WIDTH)?)?,
            hours: narrow(field(HOURS_OFFSET, HOURS_WIDTH)?)?,
            day_of_year: u16::try_from(decode_bcd(&day)?)
                .map_err(|_| EncodingError::InvalidWidth { width: day.len() })?,
        })
    }
}

fn narrow(value: u32) -> Result<u8, EncodingError> {
    // An 8-bit BCD field tops out at 99.
    u8::try_from(value).map_err(|_| EncodingError::InvalidWidth { width: 8 })
}

impl fmt::Display for Frame {
    /// Renders the frame as 60 characters: `P` at marker slots, `0`/`1` elsewhere.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.symbols() {
            write!(f, "{}", symbol.as_char())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '1').collect()
    }

    #[test]
    fn test_build_boundary_samples() {
        for sample in [
            TimeSample::new(0, 0, 0, 1),
            TimeSample::new(59, 59, 23, 366),
        ] {
            let frame = Frame::build(&sample).unwrap();
            assert_eq!(frame.len(), FRAME_LEN);
            assert_eq!(frame.bits().len(), 60);
            assert_eq!(frame.decode(), Ok(sample));
        }
    }

    #[test]
    fn test_build_end_to_end_layout() {
        let frame = Frame::build(&TimeSample::new(9, 0, 0, 1)).unwrap();
        let stored = frame.bits();

        assert_eq!(&stored[1..9], bits("00001001").as_slice());
        // 10 high bits of BCD(1, 17), then the remaining 7 and two pad slots.
        assert_eq!(&stored[30..40], bits("0000000000").as_slice());
        assert_eq!(&stored[40..49], bits("000000100").as_slice());
        assert_eq!(
            frame.to_string(),
            "P000010010P000000000P000000000P000000000P000001000P000000000"
        );
    }

    #[test]
    fn test_render_markers_and_data() {
        let frame = Frame::build(&TimeSample::new(59, 0, 0, 1)).unwrap();
        let rendered = frame.to_string();
        assert_eq!(rendered.len(), 60);
        assert_eq!(&rendered[..10], "P010110010");
        for (index, c) in rendered.chars().enumerate() {
            if index % 10 == 0 {
                assert_eq!(c, 'P', "index {index}");
            } else {
                assert_ne!(c, 'P', "index {index}");
            }
        }
    }

    #[test]
    fn test_marker_slots_store_start_value() {
        let frame = Frame::build(&TimeSample::new(0, 0, 0, 1)).unwrap();
        // Slots 0 and 50 only ever hold the marker flag.
        assert!(frame.bits()[0]);
        assert!(frame.bits()[50]);
        // Slots 10, 20, 30, 40 are overwritten by the leading field bits.
        assert!(!frame.bits()[10]);
        assert!(!frame.bits()[20]);
        assert!(!frame.bits()[30]);
        assert!(!frame.bits()[40]);
    }

    #[test]
    fn test_marker_symbol_ignores_stored_bit() {
        // Day 40 sets the tens-of-days 4 bit, which lands on marker slot 40.
        let frame = Frame::build(&TimeSample::new(0, 0, 0, 40)).unwrap();
        assert!(frame.bits()[40]);
        assert_eq!(frame.symbol(40), Some(Symbol::Marker));
        assert_eq!(frame.symbol(60), None);
        assert_eq!(
            frame.symbols().filter(|&s| s == Symbol::Marker).count(),
            6
        );
        assert_eq!(frame.decode().unwrap().day_of_year, 40);
    }

    #[test]
    fn test_unused_slots_are_zero() {
        let frame = Frame::build(&TimeSample::new(59, 59, 23, 366)).unwrap();
        for index in [9, 18, 19, 28, 29, 47, 48, 49, 51, 55, 59] {
            assert!(!frame.bits()[index], "index {index}");
            assert_eq!(frame.symbol(index), Some(Symbol::Zero));
        }
    }

    #[test]
    fn test_build_rejects_out_of_range_field() {
        assert_eq!(
            Frame::build(&TimeSample::new(100, 0, 0, 1)),
            Err(EncodingError::TooManyDigits {
                value: 100,
                width: 8,
            })
        );
    }

    #[test]
    fn test_from_bits_checks_length() {
        assert_eq!(
            Frame::from_bits(&[false; 59]),
            Err(FrameError::InvalidLength(59))
        );
        assert_eq!(
            Frame::from_bits(&[false; 61]),
            Err(FrameError::InvalidLength(61))
        );
        let frame = Frame::from_bits(&[true; 60]).unwrap();
        assert_eq!(frame.symbol(1), Some(Symbol::One));
        assert_eq!(frame.symbol(0), Some(Symbol::Marker));
    }

    #[test]
    fn test_decode_rejects_invalid_digit() {
        let mut raw = *Frame::build(&TimeSample::new(0, 0, 0, 1)).unwrap().bits();
        // Units of seconds = 0b1111.
        raw[5..9].copy_from_slice(&[true; 4]);
        let frame = Frame::from_bits(&raw).unwrap();
        assert_eq!(
            frame.decode(),
            Err(EncodingError::InvalidDigit { nibble: 0xf })
        );
    }

    #[test]
    fn test_time_sample_display() {
        assert_eq!(TimeSample::new(9, 5, 3, 42).to_string(), "042 03:05:09");
    }
}
