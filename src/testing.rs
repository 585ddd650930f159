//! Recording line and delay doubles shared by the unit tests.

use std::sync::{Arc, Mutex};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{self, ErrorKind, ErrorType, OutputPin};

use crate::cancel::CancelToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    High,
    Low,
    Delay(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct LineFault;

impl digital::Error for LineFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// Shared event log written by a [`TraceLine`] and a [`TraceDelay`].
#[derive(Debug, Clone, Default)]
pub(crate) struct Trace(Arc<Mutex<Vec<Event>>>);

impl Trace {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn line(&self) -> TraceLine {
        TraceLine {
            trace: self.clone(),
            highs: 0,
            fail_on_high: Vec::new(),
        }
    }

    pub(crate) fn delay(&self) -> TraceDelay {
        TraceDelay {
            trace: self.clone(),
            delays: 0,
            cancel_after: None,
        }
    }

    fn push(&self, event: Event) {
        self.0.lock().unwrap().push(event);
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.0.lock().unwrap().clone()
    }

    /// `(high_ns, low_ns)` of every complete high/low pulse, in order.
    pub(crate) fn pulses(&self) -> Vec<(u32, u32)> {
        let events = self.events();
        events
            .windows(4)
            .filter_map(|w| match w {
                [Event::High, Event::Delay(high), Event::Low, Event::Delay(low)] => {
                    Some((*high, *low))
                }
                _ => None,
            })
            .collect()
    }

    /// The last level written to the line, if any.
    pub(crate) fn last_level(&self) -> Option<Event> {
        self.events()
            .into_iter()
            .rev()
            .find(|e| matches!(e, Event::High | Event::Low))
    }
}

#[derive(Debug)]
pub(crate) struct TraceLine {
    trace: Trace,
    highs: usize,
    fail_on_high: Vec<usize>,
}

impl TraceLine {
    /// Makes the `n`th call to `set_high` (0-based) fail.
    pub(crate) fn failing_on_high(mut self, n: usize) -> Self {
        self.fail_on_high.push(n);
        self
    }
}

impl ErrorType for TraceLine {
    type Error = LineFault;
}

impl OutputPin for TraceLine {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.trace.push(Event::Low);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        let n = self.highs;
        self.highs += 1;
        if self.fail_on_high.contains(&n) {
            return Err(LineFault);
        }
        self.trace.push(Event::High);
        Ok(())
    }
}

#[derive(Debug)]
pub(crate) struct TraceDelay {
    trace: Trace,
    delays: usize,
    cancel_after: Option<(usize, CancelToken)>,
}

impl TraceDelay {
    /// Cancels `token` once `n` delays have been recorded.
    pub(crate) fn cancelling_after(mut self, n: usize, token: CancelToken) -> Self {
        self.cancel_after = Some((n, token));
        self
    }
}

impl DelayNs for TraceDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.trace.push(Event::Delay(ns));
        self.delays += 1;
        if let Some((n, token)) = &self.cancel_after {
            if self.delays >= *n {
                token.cancel();
            }
        }
    }
}
