//! Runs the IRIG-B generator against the host clock with a simulated output line.
//!
//! Every frame is logged as `P`/`0`/`1`; line edges are logged at `trace`. Stop with
//! Ctrl-C or `--frames`.

use std::convert::Infallible;
use std::io::stderr;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use embedded_hal::digital::{ErrorType, OutputPin};
use irigb::cancel::CancelToken;
use irigb::clock::SystemClock;
use irigb::error::EncodingError;
use irigb::frame::{Frame, TimeSample};
use irigb::observer::{FrameObserver, LogObserver};
use irigb::timer::DeadlineDelay;
use irigb::{Config, ErrorPolicy, Generator};
use log::{debug, info, trace};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Duration of one frame bit in milliseconds.
    #[arg(long, default_value_t = 1000)]
    bit_ms: u32,

    /// Stop after this many frames have been sent.
    #[arg(long)]
    frames: Option<u32>,

    /// What to do after a frame is aborted by a line failure.
    #[arg(long, default_value = "abort")]
    on_error: OnError,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnError {
    Abort,
    NextCycle,
}

impl From<OnError> for ErrorPolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => ErrorPolicy::Abort,
            OnError::NextCycle => ErrorPolicy::NextCycle,
        }
    }
}

/// Output line that only logs its edges.
#[derive(Debug, Default)]
struct SimulatedLine {
    edges: u64,
}

impl ErrorType for SimulatedLine {
    type Error = Infallible;
}

impl OutputPin for SimulatedLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.edges += 1;
        trace!("line low");
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.edges += 1;
        trace!("line high");
        Ok(())
    }
}

/// Logs every frame and cancels `token` once `limit` frames have been sent.
struct FrameLimit {
    log: LogObserver,
    sent: u32,
    limit: Option<u32>,
    token: CancelToken,
}

impl FrameObserver for FrameLimit {
    fn frame_built(&mut self, sample: &TimeSample, frame: &Frame) {
        self.log.frame_built(sample, frame);
    }

    fn frame_sent(&mut self, frame: &Frame) {
        self.log.frame_sent(frame);
        self.sent += 1;
        if self.limit.is_some_and(|limit| self.sent >= limit) {
            debug!("frame limit reached");
            self.token.cancel();
        }
    }

    fn frame_skipped(&mut self, sample: &TimeSample, error: &EncodingError) {
        self.log.frame_skipped(sample, error);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = Config::new()
        .with_bit_duration_ms(cli.bit_ms)?
        .with_error_policy(cli.on_error.into());

    let token = CancelToken::new();
    let handler_token = token.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("installing Ctrl-C handler")?;

    let observer = FrameLimit {
        log: LogObserver,
        sent: 0,
        limit: cli.frames,
        token: token.clone(),
    };
    let mut generator = Generator::new(
        SimulatedLine::default(),
        DeadlineDelay::new(),
        SystemClock,
        observer,
        config,
    )?;
    info!(
        "simulating IRIG-B with {} ns bits, on line failure: {:?}",
        generator.config().bit_duration_ns,
        generator.config().on_transmit_error
    );

    let result = generator.run(&token);
    let line = generator.release()?;
    let summary = result?;

    info!(
        "{} frames sent, {} skipped, {} failed ({} line edges)",
        summary.frames_sent, summary.frames_skipped, summary.frames_failed, line.edges
    );
    Ok(())
}
