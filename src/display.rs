//! Display sync adapter.
//!
//! The adapter turns [`UpdateEvent`]s into field-level [`DrawCommand`]s for a
//! [`DisplaySink`]. It knows which fields an event affects; the sink knows
//! where those fields are on the panel. Draws are staged until
//! [`DisplayAdapter::flush`] is called from the display cadence.
//!
//! ## Fields
//! - one value row per device (`Value(i)`) plus its highlight marker,
//! - shared `Tap`, `Channel` and `Direction` fields describing the selected
//!   device and the last rotation.

use crate::event::{Readout, UpdateEvent};
use crate::snapshot::Snapshot;

/// Placeholder shown in the direction field before the first rotation.
pub const NO_DIRECTION: &str = "---";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    /// Resolved value row of device `i`.
    Value(usize),
    Tap,
    Channel,
    Direction,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Label text for device row `i`; painted once.
    Label(usize, String),
    /// Erase `field` and write `text` in its place.
    Text(Field, String),
    /// Draw (`true`) or erase the selection marker of device row `i`.
    Highlight(usize, bool),
}

/// Anything that can render field updates.
pub trait DisplaySink {
    fn draw(&mut self, command: DrawCommand);

    /// Push the staged frame to the panel.
    fn flush(&mut self);
}

pub struct DisplayAdapter<S: DisplaySink> {
    sink: S,
    dirty: bool,
}

impl<S: DisplaySink> DisplayAdapter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, dirty: false }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Paint every field from `snapshot`.
    pub fn render_initial(&mut self, snapshot: &Snapshot) {
        for (i, dev) in snapshot.iter().enumerate() {
            self.draw(DrawCommand::Label(i, dev.label.clone()));
            self.draw(DrawCommand::Text(Field::Value(i), format_value(dev.value)));
        }
        self.draw(DrawCommand::Text(Field::Direction, NO_DIRECTION.to_string()));
        if let Some(dev) = snapshot.selected_device() {
            let readout = Readout {
                tap: dev.current_tap(),
                channel: dev.channel,
                value: dev.value,
            };
            self.draw_readout(&readout);
            self.draw(DrawCommand::Highlight(snapshot.selected, true));
        }
    }

    /// Stage the redraws for one update.
    pub fn apply(&mut self, event: &UpdateEvent) {
        match event {
            UpdateEvent::SelectionChanged {
                previous,
                current,
                readout,
            } => {
                self.draw(DrawCommand::Highlight(*previous, false));
                self.draw(DrawCommand::Text(Field::Value(*current), format_value(readout.value)));
                self.draw_readout(readout);
                self.draw(DrawCommand::Highlight(*current, true));
            }
            UpdateEvent::ChannelChanged { index, readout } => {
                self.draw(DrawCommand::Text(Field::Channel, readout.channel_text()));
                self.draw(DrawCommand::Text(Field::Tap, readout.tap.to_string()));
                self.draw(DrawCommand::Text(Field::Value(*index), format_value(readout.value)));
            }
            UpdateEvent::ValueChanged {
                index,
                step,
                readout,
                ..
            } => {
                self.draw(DrawCommand::Text(Field::Direction, step.label().to_string()));
                self.draw(DrawCommand::Text(Field::Value(*index), format_value(readout.value)));
                self.draw(DrawCommand::Text(Field::Tap, readout.tap.to_string()));
            }
        }
    }

    /// Forward to the sink if anything was drawn since the last flush.
    pub fn flush(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        self.sink.flush();
        self.dirty = false;
        true
    }

    fn draw_readout(&mut self, readout: &Readout) {
        self.draw(DrawCommand::Text(Field::Tap, readout.tap.to_string()));
        self.draw(DrawCommand::Text(Field::Channel, readout.channel_text()));
    }

    fn draw(&mut self, command: DrawCommand) {
        self.sink.draw(command);
        self.dirty = true;
    }
}

/// Ohms with one decimal.
pub fn format_value(value: f32) -> String {
    format!("{value:.1}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Step;

    #[derive(Default)]
    struct Recorder {
        commands: Vec<DrawCommand>,
        flushes: usize,
    }

    impl DisplaySink for Recorder {
        fn draw(&mut self, command: DrawCommand) {
            self.commands.push(command);
        }

        fn flush(&mut self) {
            self.flushes += 1;
        }
    }

    fn text(field: Field, s: &str) -> DrawCommand {
        DrawCommand::Text(field, s.to_string())
    }

    #[test]
    fn selection_moves_marker_and_refreshes_shared_fields() {
        let mut adapter = DisplayAdapter::new(Recorder::default());
        adapter.apply(&UpdateEvent::SelectionChanged {
            previous: 0,
            current: 1,
            readout: Readout { tap: 7, channel: None, value: 5468.9 },
        });
        assert_eq!(
            adapter.sink().commands,
            vec![
                DrawCommand::Highlight(0, false),
                text(Field::Value(1), "5468.9"),
                text(Field::Tap, "7"),
                text(Field::Channel, "-"),
                DrawCommand::Highlight(1, true),
            ]
        );
    }

    #[test]
    fn value_change_touches_direction_value_and_tap_only() {
        let mut adapter = DisplayAdapter::new(Recorder::default());
        adapter.apply(&UpdateEvent::ValueChanged {
            index: 2,
            step: Step::Decrement,
            clamped: false,
            readout: Readout { tap: 3, channel: None, value: 2366.2 },
        });
        assert_eq!(
            adapter.sink().commands,
            vec![
                text(Field::Direction, "Dec"),
                text(Field::Value(2), "2366.2"),
                text(Field::Tap, "3"),
            ]
        );
    }

    #[test]
    fn flush_only_when_dirty() {
        let mut adapter = DisplayAdapter::new(Recorder::default());
        assert!(!adapter.flush());
        adapter.apply(&UpdateEvent::ChannelChanged {
            index: 0,
            readout: Readout { tap: 0, channel: Some(1), value: 0.0 },
        });
        assert!(adapter.flush());
        assert!(!adapter.flush());
        assert_eq!(adapter.sink().flushes, 1);
        assert_eq!(adapter.sink().commands[0], text(Field::Channel, "B"));
    }
}
