//! Showcase configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file yields the
//! stock three-part showcase.
//!
//! ```toml
//! [timing]
//! rotary_ms = 50
//! debounce_ms = 15
//!
//! [[devices]]
//! label = "TPL0102"
//! tap_count = 255
//! channel_count = 2
//! resistance_ohms = 95700.0
//! ```

use crate::error::ConfigError;
use crate::metadata::DeviceSpec;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Poll cadences and the debounce window, in milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub rotary_ms: u64,
    pub rotary_button_ms: u64,
    pub channel_button_ms: u64,
    pub display_ms: u64,
    pub debounce_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            rotary_ms: 50,
            rotary_button_ms: 10,
            channel_button_ms: 10,
            display_ms: 40,
            debounce_ms: 15,
        }
    }
}

impl Timing {
    pub fn rotary(&self) -> Duration {
        Duration::from_millis(self.rotary_ms)
    }

    pub fn rotary_button(&self) -> Duration {
        Duration::from_millis(self.rotary_button_ms)
    }

    pub fn channel_button(&self) -> Duration {
        Duration::from_millis(self.channel_button_ms)
    }

    pub fn display(&self) -> Duration {
        Duration::from_millis(self.display_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timing: Timing,
    pub devices: Vec<DeviceSpec>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timing: Timing::default(),
            devices: default_devices(),
        }
    }
}

/// TPL0102 (dual, 256 positions) and the MCP4011/MCP4013 pair (64 positions),
/// with their measured end-to-end resistances.
pub fn default_devices() -> Vec<DeviceSpec> {
    vec![
        DeviceSpec::new("TPL0102", 255, 2, 95_700.0),
        DeviceSpec::new("MCP4011", 63, 1, 49_220.0),
        DeviceSpec::new("MCP4013", 63, 1, 49_690.0),
    ]
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.devices.is_empty() {
            return Err(ConfigError::Invalid("at least one device is required".into()));
        }
        for spec in &self.devices {
            spec.validate()?;
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_the_stock_showcase() {
        let cfg = Config::from_toml_str("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.devices.len(), 3);
        assert_eq!(cfg.timing.rotary(), Duration::from_millis(50));
    }

    #[test]
    fn partial_timing_keeps_other_defaults() {
        let cfg = Config::from_toml_str("[timing]\ndebounce_ms = 5\n").unwrap();
        assert_eq!(cfg.timing.debounce_ms, 5);
        assert_eq!(cfg.timing.display_ms, 40);
    }

    #[test]
    fn explicit_empty_device_list_is_rejected() {
        let err = Config::from_toml_str("devices = []").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn serialized_default_parses_back() {
        let text = Config::default().to_toml_string().unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), Config::default());
    }
}
