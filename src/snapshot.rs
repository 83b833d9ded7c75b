//! Point-in-time view of the session.
//!
//! [`Snapshot`] is an **owned**, read-only copy of every device's mirrored
//! state plus the current selection. It is produced by
//! [`Session::snapshot`](crate::session::Session::snapshot) and is cheap to
//! clone.
//!
//! # Semantics
//! - Devices appear in registry order; `selected` indexes into `devices`.
//! - `taps` holds one entry per wiper; `channel` is the active wiper
//!   (`None` for single-wiper parts).
//! - A snapshot never touches hardware. `value` is the last resolved value the
//!   session read back, not a fresh reading.
//!
//! # Example
//! ```no_run
//! # fn show(snap: &digipot_showcase::Snapshot) {
//! for dev in snap.iter() {
//!     println!("{}: tap {} = {:.1} ohm", dev.label, dev.current_tap(), dev.value);
//! }
//! println!("{}", snap.to_json().unwrap_or_default());
//! # }
//! ```

use serde::{Deserialize, Serialize};

/// Snapshot of one registered device.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub label: String,
    pub tap_count: u16,
    pub channel_count: u8,
    pub channel: Option<u8>,
    pub taps: Vec<u16>,
    pub value: f32,
}

impl DeviceSnapshot {
    /// Tap of the active wiper.
    pub fn current_tap(&self) -> u16 {
        let idx = usize::from(self.channel.unwrap_or(0));
        self.taps.get(idx).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub selected: usize,
    pub devices: Vec<DeviceSnapshot>,
}

impl Snapshot {
    #[inline]
    pub fn selected_device(&self) -> Option<&DeviceSnapshot> {
        self.devices.get(self.selected)
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &DeviceSnapshot> {
        self.devices.iter()
    }

    /// Pretty-printed JSON, used for the exit dump.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
