//! Observability hooks for the generator loop.
//!
//! Observers are purely informational: nothing they do feeds back into framing or
//! timing. They run on the transmitting thread between frames, so they should return
//! quickly.

use crate::error::EncodingError;
use crate::frame::{Frame, TimeSample};

/// Receives a notice for every frame cycle.
pub trait FrameObserver {
    /// Called after a frame has been built, before its first bit is transmitted.
    fn frame_built(&mut self, _sample: &TimeSample, _frame: &Frame) {}

    /// Called after all 60 bits of `frame` have been transmitted.
    fn frame_sent(&mut self, _frame: &Frame) {}

    /// Called when `sample` could not be encoded and the cycle was skipped.
    fn frame_skipped(&mut self, _sample: &TimeSample, _error: &EncodingError) {}
}

/// Ignores every notice.
impl FrameObserver for () {}

impl<O: FrameObserver + ?Sized> FrameObserver for &mut O {
    fn frame_built(&mut self, sample: &TimeSample, frame: &Frame) {
        (**self).frame_built(sample, frame);
    }

    fn frame_sent(&mut self, frame: &Frame) {
        (**self).frame_sent(frame);
    }

    fn frame_skipped(&mut self, sample: &TimeSample, error: &EncodingError) {
        (**self).frame_skipped(sample, error);
    }
}

/// Logs every frame through the `log` facade.
///
/// Frame contents are logged at `info` as the source time followed by the rendered
/// frame (`P` for markers, `0`/`1` for data), e.g.
/// `frame 001 00:00:09 P000010010P000000000...`.
#[cfg(feature = "log")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

#[cfg(feature = "log")]
impl FrameObserver for LogObserver {
    fn frame_built(&mut self, sample: &TimeSample, frame: &Frame) {
        log::info!("frame {} {}", sample, frame);
    }

    fn frame_sent(&mut self, _frame: &Frame) {
        log::info!("IRIG-B frame sent");
    }

    fn frame_skipped(&mut self, sample: &TimeSample, error: &EncodingError) {
        log::warn!("skipping frame for {}: {}", sample, error);
    }
}
