//! The IRIG-B generator loop.
//!
//! One cycle samples the time source, builds a [`Frame`], and transmits it; the loop
//! repeats cycles until a stop is requested. Everything runs sequentially on one thread
//! so nothing is interleaved with the bit schedule.
//!
//! ## Failure handling
//!
//! - A sample that cannot be encoded skips the cycle: the line is held low for one bit
//!   duration and the next cycle samples the clock again.
//! - A line failure aborts the frame and drives the line low. Depending on
//!   [`ErrorPolicy`] the loop then stops with the error or moves on to the next cycle.
//!   A frame is never retried.
//! - However the loop ends, the line is left low.
//!
//! With the `std` feature, [`Generator::start`] moves the loop onto a worker thread and
//! returns a [`Running`] handle whose [`stop`](Running::stop) cancels it at the next bit
//! boundary and hands the pin back.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;

use crate::cancel::StopSignal;
use crate::clock::TimeSource;
use crate::error::{ConfigError, Error};
use crate::frame::Frame;
use crate::observer::FrameObserver;
use crate::timer::{DEFAULT_BIT_DURATION_NS, MIN_BIT_DURATION_NS, bit_duration_from_millis};
use crate::transmitter::{Transmission, Transmitter};

/// What the loop does after a frame is aborted by a line failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Stop the loop and return the error.
    #[default]
    Abort,
    /// Log the failure and start the next cycle.
    NextCycle,
}

/// Generator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Duration of one frame bit in nanoseconds.
    pub bit_duration_ns: u32,
    /// Behaviour after a line failure.
    pub on_transmit_error: ErrorPolicy,
}

impl Config {
    /// One-second bits, stopping on the first line failure.
    pub const fn new() -> Self {
        Self {
            bit_duration_ns: DEFAULT_BIT_DURATION_NS,
            on_transmit_error: ErrorPolicy::Abort,
        }
    }

    /// Sets the bit duration in nanoseconds.
    pub const fn with_bit_duration_ns(mut self, bit_duration_ns: u32) -> Self {
        self.bit_duration_ns = bit_duration_ns;
        self
    }

    /// Sets the bit duration in milliseconds.
    ///
    /// # Errors
    /// [`ConfigError::BitDurationOverflow`] if the duration exceeds `u32` nanoseconds.
    pub fn with_bit_duration_ms(self, millis: u32) -> Result<Self, ConfigError> {
        bit_duration_from_millis(millis)
            .map(|ns| self.with_bit_duration_ns(ns))
            .ok_or(ConfigError::BitDurationOverflow(millis))
    }

    /// Sets the line failure policy.
    pub const fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.on_transmit_error = policy;
        self
    }

    /// Checks that every pulse phase gets a non-zero duration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bit_duration_ns < MIN_BIT_DURATION_NS {
            return Err(ConfigError::BitDurationTooShort(self.bit_duration_ns));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

/// Frame counts accumulated by a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    /// Frames sent in full.
    pub frames_sent: u32,
    /// Cycles skipped because the sample could not be encoded.
    pub frames_skipped: u32,
    /// Frames aborted by a line failure.
    pub frames_failed: u32,
}

/// Outcome of one generator cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cycle {
    /// The frame was sent in full.
    Sent,
    /// The sample could not be encoded and no frame was sent.
    Skipped,
    /// The frame was aborted by a line failure and the policy is
    /// [`ErrorPolicy::NextCycle`].
    Failed,
    /// A stop was requested.
    Cancelled,
}

/// Samples the time, builds frames, and transmits them until stopped.
///
/// ## Type Parameters
///
/// - `P`: The output pin driving the IRIG-B line
/// - `D`: The delay provider used for pulse timing
/// - `C`: The [`TimeSource`] sampled every cycle
/// - `O`: The [`FrameObserver`] notified every cycle (`()` to ignore notices)
#[derive(Debug)]
pub struct Generator<P, D, C, O = ()>
where
    P: OutputPin,
    D: DelayNs,
    C: TimeSource,
    O: FrameObserver,
{
    transmitter: Transmitter<P, D>,
    clock: C,
    observer: O,
    config: Config,
    summary: Summary,
}

impl<P, D, C, O> Generator<P, D, C, O>
where
    P: OutputPin,
    D: DelayNs,
    C: TimeSource,
    O: FrameObserver,
{
    /// Creates a generator, acquiring the line and driving it low.
    ///
    /// # Errors
    /// - [`Error::Config`] if `config` is rejected by [`Config::validate`]
    /// - [`Error::Line`] if the line cannot be driven low
    pub fn new(
        pin: P,
        delay: D,
        clock: C,
        observer: O,
        config: Config,
    ) -> Result<Self, Error<P::Error>> {
        config.validate()?;
        let transmitter = Transmitter::new(pin, delay, config.bit_duration_ns)?;
        Ok(Self {
            transmitter,
            clock,
            observer,
            config,
            summary: Summary::default(),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Frame counts so far.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Runs one sample → build → transmit cycle.
    ///
    /// # Errors
    /// - [`Error::Transmit`] on a line failure under [`ErrorPolicy::Abort`]
    /// - [`Error::Line`] if the line cannot be held low after a skipped cycle
    pub fn run_cycle<S: StopSignal + ?Sized>(
        &mut self,
        stop: &S,
    ) -> Result<Cycle, Error<P::Error>> {
        if stop.stop_requested() {
            return Ok(Cycle::Cancelled);
        }

        let sample = self.clock.now_utc();
        let frame = match Frame::build(&sample) {
            Ok(frame) => frame,
            Err(err) => {
                debug!("cannot encode {}: {}", sample, err);
                self.observer.frame_skipped(&sample, &err);
                self.summary.frames_skipped += 1;
                self.transmitter.hold_low(1, stop).map_err(Error::Line)?;
                return Ok(Cycle::Skipped);
            }
        };

        self.observer.frame_built(&sample, &frame);
        match self.transmitter.transmit(&frame, stop) {
            Ok(Transmission::Complete) => {
                self.observer.frame_sent(&frame);
                self.summary.frames_sent += 1;
                Ok(Cycle::Sent)
            }
            Ok(Transmission::Cancelled { .. }) => Ok(Cycle::Cancelled),
            Err(err) => {
                self.summary.frames_failed += 1;
                match self.config.on_transmit_error {
                    ErrorPolicy::Abort => {
                        error!("{}; stopping", err);
                        Err(err.into())
                    }
                    ErrorPolicy::NextCycle => {
                        warn!("{}; continuing with the next frame", err);
                        Ok(Cycle::Failed)
                    }
                }
            }
        }
    }

    /// Runs cycles until `stop` fires.
    ///
    /// A stop request is honoured at the next bit boundary. The line is low when this
    /// returns, whether it returns a summary or an error.
    ///
    /// # Errors
    /// See [`run_cycle`](Self::run_cycle).
    pub fn run<S: StopSignal + ?Sized>(&mut self, stop: &S) -> Result<Summary, Error<P::Error>> {
        info!(
            "IRIG-B generator running, bit duration {} ns",
            self.config.bit_duration_ns
        );
        while self.run_cycle(stop)? != Cycle::Cancelled {}
        info!(
            "IRIG-B generator stopped after {} frames",
            self.summary.frames_sent
        );
        Ok(self.summary)
    }

    /// Drives the line low and returns the pin.
    ///
    /// # Errors
    /// [`Error::Line`] if the final write fails.
    pub fn release(self) -> Result<P, Error<P::Error>> {
        let (pin, _) = self.transmitter.release().map_err(Error::Line)?;
        Ok(pin)
    }
}

#[cfg(feature = "std")]
mod running {
    use super::*;
    use crate::cancel::CancelToken;
    use std::thread::{self, JoinHandle};

    type Joined<P, D, C, O> = (
        Generator<P, D, C, O>,
        Result<Summary, Error<<P as embedded_hal::digital::ErrorType>::Error>>,
    );

    /// Handle to a generator loop running on its own thread.
    #[derive(Debug)]
    pub struct Running<P, D, C, O>
    where
        P: OutputPin,
        D: DelayNs,
        C: TimeSource,
        O: FrameObserver,
    {
        token: CancelToken,
        handle: JoinHandle<Joined<P, D, C, O>>,
    }

    impl<P, D, C, O> Generator<P, D, C, O>
    where
        P: OutputPin + Send + 'static,
        P::Error: Send + 'static,
        D: DelayNs + Send + 'static,
        C: TimeSource + Send + 'static,
        O: FrameObserver + Send + 'static,
    {
        /// Starts the loop on a worker thread.
        ///
        /// The worker is the only thread touching the line until [`Running::stop`]
        /// returns it.
        pub fn start(self) -> Running<P, D, C, O> {
            let token = CancelToken::new();
            let stop = token.clone();
            let handle = thread::spawn(move || {
                let mut generator = self;
                let result = generator.run(&stop);
                (generator, result)
            });
            Running { token, handle }
        }
    }

    impl<P, D, C, O> Running<P, D, C, O>
    where
        P: OutputPin,
        D: DelayNs,
        C: TimeSource,
        O: FrameObserver,
    {
        /// A token that stops the loop when cancelled, e.g. from a signal handler.
        pub fn token(&self) -> CancelToken {
            self.token.clone()
        }

        /// Whether the loop has already ended (stopped or failed).
        pub fn is_finished(&self) -> bool {
            self.handle.is_finished()
        }

        /// Requests a stop, waits for the current bit to finish, and returns the released
        /// pin with the final frame counts.
        ///
        /// # Errors
        /// - The error the loop stopped with, after the line has been released
        /// - [`Error::WorkerPanicked`] if the worker panicked (the line guard still drove
        ///   the line low while unwinding)
        pub fn stop(self) -> Result<(P, Summary), Error<P::Error>> {
            self.token.cancel();
            let (generator, result) = self.handle.join().map_err(|_| Error::WorkerPanicked)?;
            let pin = generator.release()?;
            result.map(|summary| (pin, summary))
        }
    }
}

#[cfg(feature = "std")]
pub use running::Running;
