//! IRIG-B frame transmitter.
//!
//! This module drives a digital output line with the pulse-width modulated IRIG-B
//! signal. Every frame bit occupies exactly one bit duration and is sent as one high
//! phase followed by one low phase:
//!
//! | Symbol         | High              | Low               |
//! |----------------|-------------------|-------------------|
//! | Position marker | 0.8 × bit duration | 0.2 × bit duration |
//! | Logical `1`    | 0.5 × bit duration | 0.5 × bit duration |
//! | Logical `0`    | 0.2 × bit duration | 0.8 × bit duration |
//!
//! ## Example
//!
//! ```rust
//! # use embedded_hal_mock::eh1::digital::{Mock as Pin, State as PinState, Transaction as PinTransaction};
//! # use embedded_hal_mock::eh1::delay::NoopDelay;
//! use core::sync::atomic::AtomicBool;
//! use irigb::frame::{Frame, TimeSample};
//! use irigb::transmitter::{Transmission, Transmitter};
//!
//! # let mut expected = vec![PinTransaction::set(PinState::Low)];
//! # for _ in 0..60 {
//! #     expected.push(PinTransaction::set(PinState::High));
//! #     expected.push(PinTransaction::set(PinState::Low));
//! # }
//! # expected.push(PinTransaction::set(PinState::Low));
//! # let pin = Pin::new(&expected);
//! let mut transmitter = Transmitter::new(pin, NoopDelay::new(), 1_000_000_000).unwrap();
//! let frame = Frame::build(&TimeSample::new(9, 0, 0, 1)).unwrap();
//!
//! let stop = AtomicBool::new(false);
//! assert_eq!(transmitter.transmit(&frame, &stop), Ok(Transmission::Complete));
//! # let (mut pin, _) = transmitter.release().unwrap();
//! # pin.done();
//! ```
//!
//! ## Design Notes
//!
//! Timing comes entirely from the [`DelayNs`] provider. The phases are blocking waits on
//! the calling thread, so nothing else should run on it while a frame is on the line.
//! On hosts, [`DeadlineDelay`](crate::timer::DeadlineDelay) keeps successive phases on
//! an absolute schedule.
//!
//! Stop requests are honoured at bit boundaries only; a pulse that has started is always
//! finished, which leaves the line low.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::cancel::StopSignal;
use crate::error::{ConfigError, Error, TransmitError};
use crate::frame::Frame;
use crate::line::OutputLine;
use crate::timer::{MIN_BIT_DURATION_NS, PulseTiming};

/// How a frame transmission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transmission {
    /// All 60 bits were sent.
    Complete,
    /// A stop was requested; bits before `next_bit` were sent in full.
    Cancelled {
        /// Index of the first bit that was not sent.
        next_bit: usize,
    },
}

/// Sends `frame` on `line`, one bit per `bit_duration_ns`.
///
/// `stop` is polled before every bit. On a pin failure the transmission is abandoned,
/// the line is driven low (best effort), and the failing bit index is reported.
///
/// # Errors
/// [`TransmitError`] wrapping the pin's error and the index of the bit being sent.
pub fn transmit<L, D, S>(
    frame: &Frame,
    bit_duration_ns: u32,
    line: &mut L,
    delay: &mut D,
    stop: &S,
) -> Result<Transmission, TransmitError<L::Error>>
where
    L: OutputPin,
    D: DelayNs,
    S: StopSignal + ?Sized,
{
    for (index, symbol) in frame.symbols().enumerate() {
        if stop.stop_requested() {
            debug!("stop requested before bit {}", index);
            return Ok(Transmission::Cancelled { next_bit: index });
        }

        trace!("bit {:02}: {}", index, symbol.as_char());
        let timing = PulseTiming::for_symbol(symbol, bit_duration_ns);
        if let Err(error) = send_pulse(line, delay, timing) {
            if line.set_low().is_err() {
                warn!("failed to drive line low after bit {} failed", index);
            }
            return Err(TransmitError { bit: index, error });
        }
    }
    Ok(Transmission::Complete)
}

fn send_pulse<L: OutputPin, D: DelayNs>(
    line: &mut L,
    delay: &mut D,
    timing: PulseTiming,
) -> Result<(), L::Error> {
    line.set_high()?;
    delay.delay_ns(timing.high_ns);
    line.set_low()?;
    delay.delay_ns(timing.low_ns);
    Ok(())
}

/// Owns the output line and the delay provider, and sends frames on them.
///
/// The line is acquired (driven low) on construction and is driven low again when the
/// transmitter is [released](Transmitter::release) or dropped.
///
/// ## Type Parameters
///
/// - `P`: A type implementing [`embedded_hal::digital::OutputPin`] wired to the IRIG-B line
/// - `D`: A type implementing [`embedded_hal::delay::DelayNs`] used for pulse timing
#[derive(Debug)]
pub struct Transmitter<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    line: OutputLine<P>,
    delay: D,
    bit_duration_ns: u32,

    /// Counter of frames sent in full.
    pub frames_sent: u32,

    /// Counter of frames abandoned after a line failure.
    pub frames_failed: u32,

    /// Counter of frames cut short by a stop request.
    pub frames_cancelled: u32,
}

impl<P, D> Transmitter<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Creates a transmitter, driving the line low.
    ///
    /// # Arguments
    /// - `pin`: The output pin, already configured as an output by the HAL.
    /// - `delay`: The delay provider used for pulse timing.
    /// - `bit_duration_ns`: Duration of one frame bit (1 s for standard IRIG-B).
    ///
    /// # Errors
    /// - [`Error::Config`] if `bit_duration_ns` is below 10 ns
    /// - [`Error::Line`] if the line cannot be driven low
    pub fn new(pin: P, delay: D, bit_duration_ns: u32) -> Result<Self, Error<P::Error>> {
        check_bit_duration(bit_duration_ns)?;
        let line = OutputLine::acquire(pin).map_err(Error::Line)?;
        Ok(Self {
            line,
            delay,
            bit_duration_ns,
            frames_sent: 0,
            frames_failed: 0,
            frames_cancelled: 0,
        })
    }

    /// The current bit duration in nanoseconds.
    pub fn bit_duration_ns(&self) -> u32 {
        self.bit_duration_ns
    }

    /// Whether the line was last driven high.
    pub fn line_is_high(&self) -> bool {
        self.line.is_high()
    }

    /// Sends one frame. See [`transmit`].
    pub fn transmit<S: StopSignal + ?Sized>(
        &mut self,
        frame: &Frame,
        stop: &S,
    ) -> Result<Transmission, TransmitError<P::Error>> {
        let result = transmit(
            frame,
            self.bit_duration_ns,
            &mut self.line,
            &mut self.delay,
            stop,
        );
        match &result {
            Ok(Transmission::Complete) => {
                self.frames_sent += 1;
                debug!("frame complete ({} sent)", self.frames_sent);
            }
            Ok(Transmission::Cancelled { next_bit }) => {
                self.frames_cancelled += 1;
                debug!("frame cancelled at bit {}", next_bit);
            }
            Err(err) => {
                self.frames_failed += 1;
                warn!("frame aborted at bit {}", err.bit);
            }
        }
        result
    }

    /// Holds the line low for `bits` bit durations, honouring `stop` between bits.
    pub fn hold_low<S: StopSignal + ?Sized>(
        &mut self,
        bits: u32,
        stop: &S,
    ) -> Result<(), P::Error> {
        self.line.set_level(false)?;
        for _ in 0..bits {
            if stop.stop_requested() {
                break;
            }
            self.delay.delay_ns(self.bit_duration_ns);
        }
        Ok(())
    }

    /// Drives the line low and returns the pin and delay provider.
    ///
    /// # Errors
    /// Returns the pin's error if the final write fails.
    pub fn release(self) -> Result<(P, D), P::Error> {
        let Self { line, delay, .. } = self;
        let pin = line.release()?;
        Ok((pin, delay))
    }
}

fn check_bit_duration(bit_duration_ns: u32) -> Result<(), ConfigError> {
    if bit_duration_ns < MIN_BIT_DURATION_NS {
        return Err(ConfigError::BitDurationTooShort(bit_duration_ns));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::{CancelToken, NeverStop};
    use crate::frame::{Symbol, TimeSample};
    use crate::testing::{Event, LineFault, Trace};
    use crate::timer::NANOS_PER_SECOND;
    use embedded_hal_mock::eh1::MockError;
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };
    use std::io::ErrorKind;

    const MS: u32 = 1_000_000;

    fn sample_frame() -> Frame {
        Frame::build(&TimeSample::new(9, 0, 0, 1)).unwrap()
    }

    #[test]
    fn test_transmitter_initialization() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let transmitter = Transmitter::new(pin, NoopDelay::new(), NANOS_PER_SECOND).unwrap();
        assert!(!transmitter.line_is_high());
        assert_eq!(transmitter.bit_duration_ns(), NANOS_PER_SECOND);
        let (mut pin, _) = transmitter.release().unwrap();
        pin.done();
    }

    #[test]
    fn test_rejects_short_bit_duration() {
        let pin = PinMock::new(&[]);
        let mut check = pin.clone();
        assert!(matches!(
            Transmitter::new(pin, NoopDelay::new(), 9),
            Err(Error::Config(ConfigError::BitDurationTooShort(9)))
        ));
        check.done();
    }

    #[test]
    fn test_frame_level_sequence() {
        let mut expected = vec![PinTransaction::set(PinState::Low)];
        for _ in 0..60 {
            expected.push(PinTransaction::set(PinState::High));
            expected.push(PinTransaction::set(PinState::Low));
        }
        expected.push(PinTransaction::set(PinState::Low));
        let pin = PinMock::new(&expected);

        let mut transmitter = Transmitter::new(pin, NoopDelay::new(), NANOS_PER_SECOND).unwrap();
        assert_eq!(
            transmitter.transmit(&sample_frame(), &NeverStop),
            Ok(Transmission::Complete)
        );
        assert_eq!(transmitter.frames_sent, 1);
        let (mut pin, _) = transmitter.release().unwrap();
        pin.done();
    }

    #[test]
    fn test_pulse_widths_follow_symbols() {
        let trace = Trace::new();
        let frame = sample_frame();
        let mut transmitter =
            Transmitter::new(trace.line(), trace.delay(), NANOS_PER_SECOND).unwrap();
        assert_eq!(
            transmitter.transmit(&frame, &NeverStop),
            Ok(Transmission::Complete)
        );

        let pulses = trace.pulses();
        assert_eq!(pulses.len(), 60);
        for (index, (symbol, &(high, low))) in frame.symbols().zip(pulses.iter()).enumerate() {
            let expected = match symbol {
                Symbol::Marker => (800 * MS, 200 * MS),
                Symbol::One => (500 * MS, 500 * MS),
                Symbol::Zero => (200 * MS, 800 * MS),
            };
            assert_eq!((high, low), expected, "bit {index}");
            assert_eq!(high + low, NANOS_PER_SECOND);
        }
        // Seconds units: 9 = 1001 at bits 5..9.
        assert_eq!(pulses[5], (500 * MS, 500 * MS));
        assert_eq!(pulses[6], (200 * MS, 800 * MS));
        assert_eq!(pulses[8], (500 * MS, 500 * MS));
    }

    #[test]
    fn test_frame_duration_has_no_drift() {
        let trace = Trace::new();
        let bit = 1_000_003;
        let mut transmitter = Transmitter::new(trace.line(), trace.delay(), bit).unwrap();
        let frame = Frame::build(&TimeSample::new(59, 59, 23, 366)).unwrap();
        let _ = transmitter.transmit(&frame, &NeverStop).unwrap();

        let total: u64 = trace
            .events()
            .iter()
            .map(|e| match e {
                Event::Delay(ns) => u64::from(*ns),
                _ => 0,
            })
            .sum();
        assert_eq!(total, 60 * u64::from(bit));
    }

    #[test]
    fn test_marker_ignores_stored_value() {
        for stored in [false, true] {
            let trace = Trace::new();
            let frame = Frame::from_bits(&[stored; 60]).unwrap();
            let mut transmitter = Transmitter::new(trace.line(), trace.delay(), 1000).unwrap();
            let _ = transmitter.transmit(&frame, &NeverStop).unwrap();

            let pulses = trace.pulses();
            for index in (0..60).step_by(10) {
                assert_eq!(pulses[index], (800, 200), "bit {index} stored {stored}");
            }
            let data = if stored { (500, 500) } else { (200, 800) };
            assert_eq!(pulses[1], data);
        }
    }

    #[test]
    fn test_write_failure_aborts_with_bit_index() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High).with_error(MockError::Io(ErrorKind::Other)),
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let mut transmitter = Transmitter::new(pin, NoopDelay::new(), NANOS_PER_SECOND).unwrap();

        let err = transmitter.transmit(&sample_frame(), &NeverStop).unwrap_err();
        assert_eq!(err.bit, 1);
        assert_eq!(transmitter.frames_failed, 1);
        assert_eq!(transmitter.frames_sent, 0);
        let (mut pin, _) = transmitter.release().unwrap();
        pin.done();
    }

    #[test]
    fn test_cleanup_failure_keeps_original_error() {
        let pin = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High).with_error(MockError::Io(ErrorKind::Other)),
            PinTransaction::set(PinState::Low).with_error(MockError::Io(ErrorKind::BrokenPipe)),
            PinTransaction::set(PinState::Low),
        ]);
        let mut transmitter = Transmitter::new(pin, NoopDelay::new(), NANOS_PER_SECOND).unwrap();

        let err = transmitter.transmit(&sample_frame(), &NeverStop).unwrap_err();
        assert_eq!(err.bit, 0);
        assert!(matches!(err.error, MockError::Io(ErrorKind::Other)));
        assert_eq!(transmitter.frames_failed, 1);
        let (mut pin, _) = transmitter.release().unwrap();
        pin.done();
    }

    #[test]
    fn test_failure_leaves_line_low() {
        let trace = Trace::new();
        let line = trace.line().failing_on_high(12);
        let mut transmitter = Transmitter::new(line, trace.delay(), 1000).unwrap();

        let err = transmitter.transmit(&sample_frame(), &NeverStop).unwrap_err();
        assert_eq!(
            err,
            TransmitError {
                bit: 12,
                error: LineFault,
            }
        );
        assert_eq!(trace.last_level(), Some(Event::Low));
        assert_eq!(trace.pulses().len(), 12);
    }

    #[test]
    fn test_cancellation_finishes_current_bit() {
        let trace = Trace::new();
        let token = CancelToken::new();
        // Cancel during the high phase of bit 3 (the 7th delay).
        let delay = trace.delay().cancelling_after(7, token.clone());
        let mut transmitter = Transmitter::new(trace.line(), delay, 1000).unwrap();

        assert_eq!(
            transmitter.transmit(&sample_frame(), &token),
            Ok(Transmission::Cancelled { next_bit: 4 })
        );
        assert_eq!(trace.pulses().len(), 4);
        assert_eq!(trace.last_level(), Some(Event::Low));
        assert!(!transmitter.line_is_high());
        assert_eq!(transmitter.frames_cancelled, 1);
    }

    #[test]
    fn test_hold_low_waits_whole_bits() {
        let trace = Trace::new();
        let mut transmitter = Transmitter::new(trace.line(), trace.delay(), 1000).unwrap();
        transmitter.hold_low(3, &NeverStop).unwrap();
        assert_eq!(
            trace.events(),
            vec![
                Event::Low,
                Event::Low,
                Event::Delay(1000),
                Event::Delay(1000),
                Event::Delay(1000)
            ]
        );
    }

    #[test]
    fn test_free_function_matches_contract() {
        let trace = Trace::new();
        let mut line = trace.line();
        let mut delay = trace.delay();
        let outcome = transmit(&sample_frame(), 10, &mut line, &mut delay, &NeverStop);
        assert_eq!(outcome, Ok(Transmission::Complete));
        assert_eq!(trace.pulses()[0], (8, 2));
        assert_eq!(trace.pulses()[1], (2, 8));
    }
}
