//! # irigb
//!
//! A portable, no_std Rust IRIG-B timecode generator. It encodes the current UTC time
//! into 60-bit IRIG-B frames and drives them onto a single digital output line as a
//! pulse-width modulated signal.
//!
//! The crate is built on:
//! - `embedded-hal` traits for the output line ([`OutputPin`](embedded_hal::digital::OutputPin))
//!   and pulse timing ([`DelayNs`](embedded_hal::delay::DelayNs))
//! - fixed-capacity `heapless` buffers for BCD fields, so frame building never allocates
//! - an optional `std` layer with an absolute-deadline delay, a host clock, and a
//!   threaded generator that can be stopped cleanly
//!
//! ## Crate features
//! | Feature         | Description |
//! |-----------------|-------------|
//! | `std`           | Disables `#![no_std]`; adds [`timer::DeadlineDelay`], [`cancel::CancelToken`] and [`generator::Generator::start`] |
//! | `log` (default) | Uses `log` logging |
//! | `chrono`        | Adds [`clock::SystemClock`], a UTC time source backed by `chrono` |
//! | `cli`           | Builds the `irigb-sim` binary |
//!
//! ## Frame layout
//!
//! | Bits   | Content |
//! |--------|---------|
//! | 0, 10, 20, 30, 40, 50 | Position markers |
//! | 1–8    | Seconds, BCD |
//! | 10–17  | Minutes, BCD |
//! | 20–27  | Hours, BCD |
//! | 30–46  | Day of year, BCD (17 bits, split at the bit-40 marker) |
//! | others | Zero |
//!
//! See [`consts`] for the exact offsets.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use irigb::generator::{Config, Generator};
//! use irigb::clock::SystemClock;
//! use irigb::observer::LogObserver;
//! use irigb::timer::DeadlineDelay;
//!
//! let generator = Generator::new(pin, DeadlineDelay::new(), SystemClock, LogObserver, Config::new())?;
//! let running = generator.start();
//! // ...
//! let (pin, summary) = running.stop()?;
//! ```
//!
//! On targets without `std`, drive the loop directly with a HAL delay, a time source
//! closure and any [`cancel::StopSignal`] (an `AtomicBool` works):
//!
//! ```rust,ignore
//! let mut generator = Generator::new(pin, delay, || rtc.sample(), (), Config::new())?;
//! generator.run(&STOP)?;
//! ```
//!
//! ## Integration Notes
//!
//! - Timing precision comes entirely from the delay provider; the crate adds no
//!   scheduling of its own
//! - A stop request takes effect at the next bit boundary, so the line is always left low
//! - The generator owns the pin exclusively while it runs

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

pub use embedded_hal;
pub use heapless;

// Must come first so the logging macros are visible to every module below.
mod fmt;

pub mod cancel;
pub mod clock;
pub mod consts;
pub mod encoding;
pub mod error;
pub mod frame;
pub mod generator;
pub mod line;
pub mod observer;
pub mod timer;
pub mod transmitter;

#[cfg(test)]
pub(crate) mod testing;

pub use error::Error;
pub use frame::{Frame, TimeSample};
pub use generator::{Config, ErrorPolicy, Generator, Summary};
