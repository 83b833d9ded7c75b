use crate::event::UpdateEvent;
use std::collections::BTreeMap;

/// Trait for reacting to update events produced by the session.
pub trait UpdateListener {
    fn on_update(&mut self, event: &UpdateEvent);
}

/// Determines which kinds of events a listener wants to receive.
#[derive(Debug, Clone, Copy)]
pub enum EventFilter {
    All,
    SelectionOnly,
    ChannelOnly,
    ValuesOnly,
    Custom(fn(&UpdateEvent) -> bool),
}

impl EventFilter {
    pub fn accepts(&self, event: &UpdateEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::SelectionOnly => matches!(event, UpdateEvent::SelectionChanged { .. }),
            EventFilter::ChannelOnly => matches!(event, UpdateEvent::ChannelChanged { .. }),
            EventFilter::ValuesOnly => matches!(event, UpdateEvent::ValueChanged { .. }),
            EventFilter::Custom(f) => f(event),
        }
    }
}

/// Listener plus its filter and enable flag.
struct ListenerEntry {
    listener: Box<dyn UpdateListener>,
    enabled: bool,
    filter: EventFilter,
    device: Option<usize>, // only events about this registry index
}

/// Fan-out of update events to registered listeners, in registration order.
#[derive(Default)]
pub struct UpdateBus {
    next_id: u64,
    listeners: BTreeMap<u64, ListenerEntry>,
}

impl UpdateBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener with a filter and an optional device index.
    pub fn add_listener(
        &mut self,
        listener: impl UpdateListener + 'static,
        filter: EventFilter,
        device: Option<usize>,
    ) -> u64 {
        let id = self.next_id;
        self.listeners.insert(
            id,
            ListenerEntry {
                listener: Box::new(listener),
                enabled: true,
                filter,
                device,
            },
        );
        self.next_id += 1;
        id
    }

    /// Enables a previously registered listener.
    pub fn enable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = true;
        }
    }

    /// Disables (mutes) a listener without removing it.
    pub fn disable(&mut self, id: u64) {
        if let Some(entry) = self.listeners.get_mut(&id) {
            entry.enabled = false;
        }
    }

    /// Unregisters a listener entirely.
    pub fn remove_listener(&mut self, id: u64) {
        self.listeners.remove(&id);
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Emits one event to all active and matching listeners.
    pub fn emit(&mut self, event: &UpdateEvent) {
        for entry in self.listeners.values_mut() {
            if !entry.enabled {
                continue;
            }
            if let Some(wanted) = entry.device {
                if event.device_index() != wanted {
                    continue;
                }
            }
            if entry.filter.accepts(event) {
                entry.listener.on_update(event);
            }
        }
    }

    /// Emits a batch of events to matching listeners.
    pub fn emit_all(&mut self, events: &[UpdateEvent]) {
        for event in events {
            self.emit(event);
        }
    }
}
