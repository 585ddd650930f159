//! Scoped ownership of the digital output line.
//!
//! The HAL hands out an [`OutputPin`] once the pin has been configured as an output;
//! which pin that is and how the HAL is set up stays with the caller. [`OutputLine`]
//! takes that pin for the lifetime of the generator and guarantees the line is left
//! electrically inactive (low) on every exit path:
//!
//! - [`OutputLine::acquire`] drives the line low before anything is transmitted
//! - [`OutputLine::release`] drives it low and hands the pin back
//! - dropping an `OutputLine` (early return, error, panic unwinding) drives it low

use core::mem::ManuallyDrop;
use core::ptr;

use embedded_hal::digital::{ErrorType, OutputPin};

/// Exclusive owner of the output pin that forces the line low when released or dropped.
#[derive(Debug)]
pub struct OutputLine<P: OutputPin> {
    pin: P,
    high: bool,
}

impl<P: OutputPin> OutputLine<P> {
    /// Takes ownership of `pin` and drives it low.
    ///
    /// # Errors
    /// Returns the pin's error if the initial write fails. The pin is dropped in that case.
    pub fn acquire(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        debug!("output line acquired");
        Ok(Self { pin, high: false })
    }

    /// Whether the line was last driven high.
    pub fn is_high(&self) -> bool {
        self.high
    }

    /// Drives the line to `level`.
    pub fn set_level(&mut self, level: bool) -> Result<(), P::Error> {
        if level {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.high = level;
        Ok(())
    }

    /// Drives the line low, logging rather than returning a failure. Used on abort paths
    /// that already carry an error.
    pub fn force_low(&mut self) {
        if self.pin.set_low().is_ok() {
            self.high = false;
        } else {
            warn!("failed to force output line low");
        }
    }

    /// Drives the line low and returns the pin to the caller.
    ///
    /// # Errors
    /// Returns the pin's error if the final write fails. The guard is dropped in that
    /// case, which tries once more to drive the line low.
    pub fn release(mut self) -> Result<P, P::Error> {
        self.set_level(false)?;
        debug!("output line released");
        let line = ManuallyDrop::new(self);
        // SAFETY: `line` is never dropped or used again, so the pin is moved out once.
        Ok(unsafe { ptr::read(&line.pin) })
    }
}

impl<P: OutputPin> ErrorType for OutputLine<P> {
    type Error = P::Error;
}

impl<P: OutputPin> OutputPin for OutputLine<P> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set_level(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set_level(true)
    }
}

impl<P: OutputPin> Drop for OutputLine<P> {
    fn drop(&mut self) {
        self.force_low();
    }
}
