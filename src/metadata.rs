//! Per-device constants.
//!
//! [`DeviceSpec`] describes one potentiometer for the whole session: how many
//! taps its wipers have, how many wipers it has, its label, and the
//! characterized end-to-end resistance used by the linear-taper model. It is
//! set when the registry is built and never mutated.
//!
//! # Example
//! ```
//! use digipot_showcase::DeviceSpec;
//!
//! let spec = DeviceSpec::new("TPL0102", 255, 2, 95_700.0);
//! assert!(spec.is_multi_channel());
//! assert!(spec.validate().is_ok());
//! ```

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Highest supported wiper count per package.
pub const MAX_CHANNELS: u8 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    /// Name shown on the display and in diagnostics (e.g. `"MCP4011"`).
    pub label: String,

    /// Highest tap index; wipers move in `0..=tap_count`.
    pub tap_count: u16,

    /// Number of independently addressable wipers (1 or 2).
    #[serde(default = "default_channel_count")]
    pub channel_count: u8,

    /// Measured end-to-end resistance in ohms.
    pub resistance_ohms: f32,
}

fn default_channel_count() -> u8 {
    1
}

impl DeviceSpec {
    pub fn new(label: impl Into<String>, tap_count: u16, channel_count: u8, resistance_ohms: f32) -> Self {
        Self {
            label: label.into(),
            tap_count,
            channel_count,
            resistance_ohms,
        }
    }

    #[inline]
    pub fn is_multi_channel(&self) -> bool {
        self.channel_count > 1
    }

    /// Channel argument passed to the capability interface.
    #[inline]
    pub fn address(&self, channel: u8) -> Option<u8> {
        self.is_multi_channel().then_some(channel)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.label.trim().is_empty() {
            return Err(ConfigError::Invalid("device label is empty".into()));
        }
        if self.tap_count == 0 {
            return Err(ConfigError::Invalid(format!(
                "{}: tap_count must be at least 1",
                self.label
            )));
        }
        if self.channel_count == 0 || self.channel_count > MAX_CHANNELS {
            return Err(ConfigError::Invalid(format!(
                "{}: channel_count must be 1 or {MAX_CHANNELS}, got {}",
                self.label, self.channel_count
            )));
        }
        if !self.resistance_ohms.is_finite() || self.resistance_ohms <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "{}: resistance_ohms must be positive",
                self.label
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_three_channels() {
        let spec = DeviceSpec::new("X", 10, 3, 1_000.0);
        assert!(matches!(spec.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn rejects_zero_taps_and_blank_label() {
        assert!(DeviceSpec::new("X", 0, 1, 1_000.0).validate().is_err());
        assert!(DeviceSpec::new("  ", 10, 1, 1_000.0).validate().is_err());
        assert!(DeviceSpec::new("X", 10, 1, 0.0).validate().is_err());
    }

    #[test]
    fn address_depends_on_channel_count() {
        assert_eq!(DeviceSpec::new("S", 63, 1, 1.0).address(0), None);
        assert_eq!(DeviceSpec::new("D", 255, 2, 1.0).address(1), Some(1));
    }
}
