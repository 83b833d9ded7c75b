//! Selection and tap state machine.
//!
//! [`Session`] owns the [`Registry`] and the selected index and is the only
//! place either is mutated. Each call to [`Session::handle`] consumes one
//! [`InputEvent`], issues the resulting capability calls, and returns the
//! [`UpdateEvent`]s the display needs.
//!
//! # Rules
//! - `SelectNext` advances the selection modulo the device count and never
//!   touches taps or channels.
//! - `ChannelToggle` cycles the active wiper of a multi-wiper device and
//!   re-asserts that wiper's tap. On a single-wiper device it does nothing at
//!   all: no command, no update.
//! - `RotateDelta` moves the active wiper by exactly one tap. At a bound the
//!   tap is left alone and no command is sent, but the value is re-read and
//!   still reported.
//!
//! # Failures
//! A failed `set_tap`/`set_channel` is logged and the in-memory state is kept
//! as if the command had succeeded. There is no retry; the next event
//! re-asserts the wiper anyway.

use crate::device::channel_label;
use crate::error::{DeviceError, SessionError};
use crate::event::{InputEvent, Step, UpdateEvent};
use crate::registry::{Registry, RegistryEntry};
use crate::snapshot::Snapshot;
use std::time::Duration;

pub struct Session {
    registry: Registry,
    selected: usize,
}

impl Session {
    /// Start a session with device 0 selected.
    ///
    /// The registry must have been through [`Registry::initialize`].
    pub fn new(registry: Registry) -> Result<Self, SessionError> {
        if registry.is_empty() {
            return Err(SessionError::EmptyRegistry);
        }
        if !registry.is_initialized() {
            return Err(SessionError::NotInitialized);
        }
        Ok(Self {
            registry,
            selected: 0,
        })
    }

    #[inline]
    pub fn selected(&self) -> usize {
        self.selected
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The selected device. Always present.
    pub fn selected_entry(&self) -> &RegistryEntry {
        self.registry
            .get(self.selected)
            .unwrap_or_else(|| unreachable!("selection {} out of range", self.selected))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry.snapshot(self.selected)
    }

    /// Apply one input event.
    pub fn handle(&mut self, event: InputEvent) -> Vec<UpdateEvent> {
        match event {
            InputEvent::SelectNext => vec![self.select_next()],
            InputEvent::ChannelToggle => self.toggle_channel().into_iter().collect(),
            InputEvent::RotateDelta(step) => vec![self.rotate(step)],
        }
    }

    fn select_next(&mut self) -> UpdateEvent {
        let previous = self.selected;
        self.selected = (self.selected + 1) % self.registry.len();
        let entry = self.selected_entry();
        tracing::info!(device = %entry.spec.label, index = self.selected, "selected");
        UpdateEvent::SelectionChanged {
            previous,
            current: self.selected,
            readout: entry.readout(),
        }
    }

    fn toggle_channel(&mut self) -> Option<UpdateEvent> {
        let index = self.selected;
        let entry = self.registry.get_mut(index)?;
        if !entry.spec.is_multi_channel() {
            return None;
        }

        let channel = (entry.state.current_channel + 1) % entry.spec.channel_count;
        entry.state.current_channel = channel;

        if let Err(err) = entry.handle.set_channel(channel) {
            report_failure(entry, "set_channel", &err);
        }
        let tap = entry.state.current_tap();
        let address = entry.address();
        match entry.handle.set_tap(address, tap) {
            Ok(latency) => {
                let value = entry.refresh_value();
                log_command(entry, tap, tap, value, latency);
            }
            Err(err) => {
                let value = entry.refresh_value();
                report_tap_failure(entry, tap, tap, value, &err);
            }
        }
        tracing::info!(
            device = %entry.spec.label,
            channel = %channel_label(channel),
            "channel selected"
        );

        Some(UpdateEvent::ChannelChanged {
            index,
            readout: entry.readout(),
        })
    }

    fn rotate(&mut self, step: Step) -> UpdateEvent {
        let index = self.selected;
        let Some(entry) = self.registry.get_mut(index) else {
            unreachable!("selection {index} out of range");
        };

        let old = entry.state.current_tap();
        let new = match step {
            Step::Increment if old < entry.spec.tap_count => Some(old + 1),
            Step::Decrement if old > 0 => Some(old - 1),
            _ => None,
        };

        let clamped = new.is_none();
        match new {
            Some(tap) => {
                entry.state.set_current_tap(tap);
                let address = entry.address();
                match entry.handle.set_tap(address, tap) {
                    Ok(latency) => {
                        let value = entry.refresh_value();
                        log_command(entry, old, tap, value, latency);
                    }
                    Err(err) => {
                        let value = entry.refresh_value();
                        report_tap_failure(entry, old, tap, value, &err);
                    }
                }
            }
            None => {
                let value = entry.refresh_value();
                tracing::debug!(
                    device = %entry.spec.label,
                    tap = old,
                    value,
                    step = step.label(),
                    "tap at bound, nothing sent"
                );
            }
        }

        UpdateEvent::ValueChanged {
            index,
            step,
            clamped,
            readout: entry.readout(),
        }
    }
}

fn log_command(entry: &RegistryEntry, old_tap: u16, new_tap: u16, value: f32, latency: Duration) {
    let latency_us = micros(latency);
    match entry.address() {
        Some(channel) => tracing::info!(
            device = %entry.spec.label,
            channel = %channel_label(channel),
            old_tap,
            new_tap,
            value,
            latency_us,
            "tap set"
        ),
        None => tracing::info!(
            device = %entry.spec.label,
            old_tap,
            new_tap,
            value,
            latency_us,
            "tap set"
        ),
    }
}

/// Whole microseconds, saturating.
fn micros(latency: Duration) -> u64 {
    u64::try_from(latency.as_micros()).unwrap_or(u64::MAX)
}

fn report_failure(entry: &RegistryEntry, command: &'static str, err: &DeviceError) {
    tracing::warn!(
        device = %entry.spec.label,
        command,
        error = %err,
        "device command failed; keeping local state"
    );
}

fn report_tap_failure(
    entry: &RegistryEntry,
    old_tap: u16,
    new_tap: u16,
    value: f32,
    err: &DeviceError,
) {
    match entry.address() {
        Some(channel) => tracing::warn!(
            device = %entry.spec.label,
            channel = %channel_label(channel),
            old_tap,
            new_tap,
            value,
            error = %err,
            "set_tap failed; keeping local state"
        ),
        None => tracing::warn!(
            device = %entry.spec.label,
            old_tap,
            new_tap,
            value,
            error = %err,
            "set_tap failed; keeping local state"
        ),
    }
}
