//! Potentiometer capability interface.
//!
//! Every controllable part implements [`Potentiometer`]. The session only ever
//! talks to devices through this trait, so single- and dual-wiper parts share
//! one control flow.
//!
//! ## Channel addressing
//! `channel` is `Some(c)` for parts with more than one wiper and `None` for
//! parts with a single wiper. Single-wiper parts ignore the argument.
//!
//! ## Bounds
//! The trait does not re-validate tap bounds. Callers guarantee
//! `tap <= tap_count` before calling [`Potentiometer::set_tap`].

use crate::error::DeviceError;
use std::time::Duration;

pub trait Potentiometer {
    /// One-time hardware initialization. Call exactly once, at startup.
    fn configure(&mut self) -> Result<(), DeviceError>;

    /// Drive the wiper of `channel` (or the only wiper) to tap 0.
    fn zero(&mut self, channel: Option<u8>) -> Result<(), DeviceError>;

    /// Command a tap position. Returns the measured command latency.
    fn set_tap(&mut self, channel: Option<u8>, tap: u16) -> Result<Duration, DeviceError>;

    /// Approximate resistance in ohms at the current wiper position.
    ///
    /// This is a model, not a measurement; see [`linear_taper`].
    fn read_value(&self, channel: Option<u8>) -> f32;

    /// Make `channel` the active wiper.
    ///
    /// Single-wiper parts keep this default, which does nothing.
    fn set_channel(&mut self, _channel: u8) -> Result<(), DeviceError> {
        Ok(())
    }
}

impl<P: Potentiometer + ?Sized> Potentiometer for Box<P> {
    fn configure(&mut self) -> Result<(), DeviceError> {
        (**self).configure()
    }

    fn zero(&mut self, channel: Option<u8>) -> Result<(), DeviceError> {
        (**self).zero(channel)
    }

    fn set_tap(&mut self, channel: Option<u8>, tap: u16) -> Result<Duration, DeviceError> {
        (**self).set_tap(channel, tap)
    }

    fn read_value(&self, channel: Option<u8>) -> f32 {
        (**self).read_value(channel)
    }

    fn set_channel(&mut self, channel: u8) -> Result<(), DeviceError> {
        (**self).set_channel(channel)
    }
}

/// Linear-taper resistance model: `resistance * tap / tap_count`.
///
/// `resistance` is the part's characterized end-to-end resistance.
#[inline]
pub fn linear_taper(resistance: f32, tap: u16, tap_count: u16) -> f32 {
    if tap_count == 0 {
        return 0.0;
    }
    resistance * f32::from(tap) / f32::from(tap_count)
}

/// Human-facing channel name: `0 -> "A"`, `1 -> "B"`, ...
pub fn channel_label(channel: u8) -> char {
    char::from(b'A'.saturating_add(channel))
}
