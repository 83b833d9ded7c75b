//! Error types.
//!
//! Only [`StartupError`] and [`ConfigError`] are fatal. A [`DeviceError`] raised
//! while the session is running is logged and otherwise ignored; see
//! [`Session`](crate::session::Session).

use thiserror::Error;

/// Bus/communication failure reported by a [`Potentiometer`](crate::device::Potentiometer).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// A command was issued before `configure()` succeeded.
    #[error("device has not been configured")]
    NotConfigured,

    /// The addressed wiper does not exist on this part.
    #[error("channel {channel} out of range (device has {channel_count})")]
    InvalidChannel { channel: u8, channel_count: u8 },

    /// The transaction itself failed (NACK, stuck line, timeout...).
    #[error("bus transaction failed: {0}")]
    Bus(String),
}

/// Which step of the startup sequence failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartupStage {
    Configure,
    Zero,
    SelectChannel,
}

impl std::fmt::Display for StartupStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            StartupStage::Configure => "configure",
            StartupStage::Zero => "zero",
            StartupStage::SelectChannel => "select channel",
        };
        f.write_str(s)
    }
}

/// A device could not be brought to its known zero state.
///
/// Tap tracking assumes every wiper starts at 0, so this aborts startup.
#[derive(Debug, Error)]
#[error("{label}: {stage} failed")]
pub struct StartupError {
    pub label: String,
    pub stage: StartupStage,
    #[source]
    pub source: DeviceError,
}

/// Configuration could not be read or is inconsistent.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// A [`Session`](crate::session::Session) could not be created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("registry holds no devices; nothing to select")]
    EmptyRegistry,
    #[error("registry has not been initialized; device taps are unknown")]
    NotInitialized,
}
