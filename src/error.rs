//! Error types used across modules.
//!
//! Encoding and frame errors are plain data and carry no hardware types. Errors raised
//! while driving the output line are generic over the pin's error type `E`, which is
//! whatever the HAL's [`embedded_hal::digital::OutputPin`] implementation reports.

use thiserror::Error;

/// The error type for BCD encoding and decoding.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingError {
    /// The requested field width is zero or larger than
    /// [`MAX_BCD_WIDTH`](crate::consts::MAX_BCD_WIDTH).
    #[error("invalid BCD field width: {width}")]
    InvalidWidth {
        /// The rejected width in bits.
        width: usize,
    },
    /// The value needs more decimal digits than a field of this width holds.
    #[error("value {value} needs more BCD digits than a {width}-bit field holds")]
    TooManyDigits {
        /// The value that was being encoded.
        value: u32,
        /// The target field width in bits.
        width: u8,
    },
    /// The leading bits dropped to fit the field width were not all zero, so the field
    /// would not carry the value.
    #[error("value {value} loses set bits when truncated to {width} bits")]
    Truncated {
        /// The value that was being encoded.
        value: u32,
        /// The target field width in bits.
        width: u8,
    },
    /// A decoded nibble was not a decimal digit.
    #[error("invalid BCD digit: {nibble:#x}")]
    InvalidDigit {
        /// The 4-bit group that was read.
        nibble: u8,
    },
}

/// A frame held a number of bits other than [`FRAME_LEN`](crate::consts::FRAME_LEN).
///
/// This is a programming defect rather than a runtime condition: frames produced by
/// [`Frame::build`](crate::frame::Frame::build) always have the right length.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The frame had the given length instead of 60 bits.
    #[error("frame invariant violated: expected 60 bits, got {0}")]
    InvalidLength(usize),
}

/// The output line reported a failure in the middle of a frame.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("line write failed at bit {bit}: {error:?}")]
pub struct TransmitError<E> {
    /// Index of the frame bit being transmitted when the failure occurred.
    pub bit: usize,
    /// The error reported by the output pin.
    pub error: E,
}

/// The error type for rejected configuration values.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The bit duration is too short to give every pulse phase a non-zero length.
    #[error("bit duration of {0} ns is below the 10 ns minimum")]
    BitDurationTooShort(u32),
    /// The requested bit duration does not fit the delay provider's nanosecond range.
    #[error("bit duration of {0} ms does not fit in u32 nanoseconds")]
    BitDurationOverflow(u32),
}

/// Top-level error for running the generator loop.
#[derive(Error, Debug)]
pub enum Error<E> {
    /// A frame was aborted because the line failed.
    #[error("{0}")]
    Transmit(TransmitError<E>),
    /// The line could not be acquired or released.
    #[error("output line error: {0:?}")]
    Line(E),
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(ConfigError),
    /// The worker thread running the loop panicked.
    #[cfg(feature = "std")]
    #[error("generator worker panicked")]
    WorkerPanicked,
}

impl<E> From<TransmitError<E>> for Error<E> {
    fn from(err: TransmitError<E>) -> Self {
        Error::Transmit(err)
    }
}

impl<E> From<ConfigError> for Error<E> {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}
