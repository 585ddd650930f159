use embedded_hal::delay::DelayNs;
use std::thread;
use std::time::{Duration, Instant};

/// A blocking [`DelayNs`] provider that sleeps until absolute deadlines.
///
/// Each call extends the previous deadline by the requested duration instead of
/// measuring from "now", so time spent between calls (writing the pin, building the
/// next frame) is absorbed rather than accumulated as drift. If the caller falls
/// behind by more than `max_lag`, the chain restarts from the current instant.
///
/// # Example
/// ```rust
/// use embedded_hal::delay::DelayNs;
/// use irigb::timer::DeadlineDelay;
///
/// let mut delay = DeadlineDelay::new();
/// delay.delay_ns(1_000); // Sleeps until 1 µs after the first call
/// delay.delay_ns(1_000); // Sleeps until 2 µs after the first call
/// ```
#[derive(Debug, Clone)]
pub struct DeadlineDelay {
    deadline: Option<Instant>,
    max_lag: Duration,
}

impl DeadlineDelay {
    /// Default lag after which the deadline chain is restarted.
    pub const DEFAULT_MAX_LAG: Duration = Duration::from_millis(50);

    /// Creates a delay with [`DEFAULT_MAX_LAG`](Self::DEFAULT_MAX_LAG).
    pub fn new() -> Self {
        Self::with_max_lag(Self::DEFAULT_MAX_LAG)
    }

    /// Creates a delay that resynchronises once it is more than `max_lag` behind.
    pub fn with_max_lag(max_lag: Duration) -> Self {
        Self {
            deadline: None,
            max_lag,
        }
    }

    /// Forgets the current deadline so the next delay is measured from the call.
    pub fn reset(&mut self) {
        self.deadline = None;
    }

    /// The instant the last delay was scheduled to end at.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

impl Default for DeadlineDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl DelayNs for DeadlineDelay {
    fn delay_ns(&mut self, ns: u32) {
        let now = Instant::now();
        let base = match self.deadline {
            Some(deadline) if now.saturating_duration_since(deadline) <= self.max_lag => deadline,
            _ => now,
        };
        let target = base + Duration::from_nanos(u64::from(ns));
        self.deadline = Some(target);

        if let Some(remaining) = target.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }
    }
}
