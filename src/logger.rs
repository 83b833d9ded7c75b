use crate::device::channel_label;
use crate::event::UpdateEvent;
use crate::eventbus::UpdateListener;

/// A listener that writes every update event to the diagnostic log.
///
/// Device labels are resolved from the list given at construction, so log
/// lines read `MCP4011` rather than `1`.
#[derive(Default)]
pub struct Logger {
    labels: Vec<String>,
}

impl Logger {
    pub fn new(labels: Vec<String>) -> Self {
        Self { labels }
    }

    fn label(&self, index: usize) -> &str {
        self.labels.get(index).map(String::as_str).unwrap_or("?")
    }
}

impl UpdateListener for Logger {
    fn on_update(&mut self, event: &UpdateEvent) {
        let readout = event.readout();
        let device = self.label(event.device_index());
        let channel = readout.channel.map(channel_label);
        match event {
            UpdateEvent::SelectionChanged { previous, .. } => tracing::debug!(
                device,
                from = self.label(*previous),
                tap = readout.tap,
                value = readout.value,
                "update: selection"
            ),
            UpdateEvent::ChannelChanged { .. } => tracing::debug!(
                device,
                channel = ?channel,
                tap = readout.tap,
                value = readout.value,
                "update: channel"
            ),
            UpdateEvent::ValueChanged { step, clamped, .. } => tracing::debug!(
                device,
                channel = ?channel,
                step = step.label(),
                clamped,
                tap = readout.tap,
                value = readout.value,
                "update: value"
            ),
        }
    }
}
