//! Input and update events.
//!
//! Two event streams flow through the showcase:
//! - [`InputEvent`]s come from the debounced controls and are consumed by the
//!   [`Session`](crate::session::Session), one at a time.
//! - [`UpdateEvent`]s are produced by the session and describe which display
//!   fields must be redrawn. They carry a [`Readout`] of the affected device so
//!   consumers never have to look at the registry.
//!
//! ## Value conventions
//! - **Taps:** integer wiper positions in `0..=tap_count`.
//! - **Values:** approximate ohms from the linear-taper model, not a measurement.
//! - **Channels:** `None` for single-wiper parts, `Some(0..channel_count)` otherwise.

/// One logical user action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    /// The encoder moved. Only the sign matters; several detents within one
    /// poll window collapse into a single step.
    RotateDelta(Step),

    /// Encoder push-button: select the next device.
    SelectNext,

    /// Channel button: switch the selected device to its next wiper.
    ChannelToggle,
}

/// Direction of one tap step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Increment,
    Decrement,
}

impl Step {
    /// Sign of a raw encoder delta; `None` when the encoder did not move.
    pub fn from_delta(delta: i64) -> Option<Self> {
        match delta.signum() {
            1 => Some(Step::Increment),
            -1 => Some(Step::Decrement),
            _ => None,
        }
    }

    /// Short label for the direction field.
    pub fn label(self) -> &'static str {
        match self {
            Step::Increment => "Inc",
            Step::Decrement => "Dec",
        }
    }
}

/// Physical push-buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Button {
    /// Push switch built into the rotary encoder.
    Encoder,
    /// Dedicated channel-select button.
    Channel,
}

/// A debounced button transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Press,
    Release,
}

/// Displayable state of one device at its active channel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readout {
    pub tap: u16,
    pub channel: Option<u8>,
    /// Approximate ohms.
    pub value: f32,
}

impl Readout {
    /// Text for the channel field: `A`/`B`, or `-` for single-wiper parts.
    pub fn channel_text(&self) -> String {
        match self.channel {
            Some(c) => crate::device::channel_label(c).to_string(),
            None => "-".to_string(),
        }
    }
}

/// What changed as the result of one accepted [`InputEvent`].
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateEvent {
    /// The selection moved from `previous` to `current`.
    SelectionChanged {
        previous: usize,
        current: usize,
        readout: Readout,
    },

    /// Device `index` switched its active wiper.
    ChannelChanged { index: usize, readout: Readout },

    /// Device `index` was stepped. `clamped` is set when it was already at a
    /// bound and no command was sent.
    ValueChanged {
        index: usize,
        step: Step,
        clamped: bool,
        readout: Readout,
    },
}

impl UpdateEvent {
    /// Registry index of the device this event refers to.
    pub fn device_index(&self) -> usize {
        match self {
            UpdateEvent::SelectionChanged { current, .. } => *current,
            UpdateEvent::ChannelChanged { index, .. } => *index,
            UpdateEvent::ValueChanged { index, .. } => *index,
        }
    }

    pub fn readout(&self) -> &Readout {
        match self {
            UpdateEvent::SelectionChanged { readout, .. }
            | UpdateEvent::ChannelChanged { readout, .. }
            | UpdateEvent::ValueChanged { readout, .. } => readout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_sign_collapses_to_one_step() {
        assert_eq!(Step::from_delta(4), Some(Step::Increment));
        assert_eq!(Step::from_delta(-17), Some(Step::Decrement));
        assert_eq!(Step::from_delta(0), None);
    }

    #[test]
    fn channel_text() {
        let r = Readout { tap: 0, channel: Some(1), value: 0.0 };
        assert_eq!(r.channel_text(), "B");
        let r = Readout { tap: 0, channel: None, value: 0.0 };
        assert_eq!(r.channel_text(), "-");
    }
}
