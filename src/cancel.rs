//! Cooperative cancellation.
//!
//! The transmitter polls a [`StopSignal`] at every bit boundary and never interrupts a
//! pulse, so a stop request takes effect within one bit duration and always leaves the
//! line low.

use core::sync::atomic::{AtomicBool, Ordering};

/// Something the transmit loop can poll to learn that it should stop.
pub trait StopSignal {
    /// Whether a stop has been requested.
    fn stop_requested(&self) -> bool;
}

impl StopSignal for AtomicBool {
    fn stop_requested(&self) -> bool {
        self.load(Ordering::Acquire)
    }
}

impl<S: StopSignal + ?Sized> StopSignal for &S {
    fn stop_requested(&self) -> bool {
        (**self).stop_requested()
    }
}

/// A stop signal that never fires, for running a fixed number of cycles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverStop;

impl StopSignal for NeverStop {
    fn stop_requested(&self) -> bool {
        false
    }
}

/// A cloneable cancellation flag shared between the generator thread and whatever wires
/// it to the outside world (an OS signal handler, a supervisor, a test).
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct CancelToken(std::sync::Arc<AtomicBool>);

#[cfg(feature = "std")]
impl CancelToken {
    /// Creates a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Whether [`cancel`](Self::cancel) has been called on this token or a clone of it.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[cfg(feature = "std")]
impl StopSignal for CancelToken {
    fn stop_requested(&self) -> bool {
        self.is_cancelled()
    }
}
