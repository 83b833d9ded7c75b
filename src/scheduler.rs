//! Cooperative control loop.
//!
//! One pass ([`ControlLoop::poll`]) checks four concerns in a fixed order:
//! rotation, channel button, encoder push-button, display flush. Each concern
//! has its own minimum re-check interval and runs to completion when due.
//! There is no preemption and nothing runs in the background, so two concerns
//! maturing at the same instant are always handled in that order.

use crate::config::Timing;
use crate::display::{DisplayAdapter, DisplaySink};
use crate::event::{InputEvent, UpdateEvent};
use crate::eventbus::UpdateBus;
use crate::input::{Clock, Controls, PollTimer, RawControls};
use crate::session::Session;

struct Timers {
    rotary: PollTimer,
    channel_button: PollTimer,
    rotary_button: PollTimer,
    display: PollTimer,
}

/// What one pass did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PassReport {
    /// Input events accepted this pass, in handling order.
    pub inputs: Vec<InputEvent>,
    /// Updates produced by those inputs.
    pub updates: Vec<UpdateEvent>,
    /// Whether the display was flushed.
    pub flushed: bool,
}

pub struct ControlLoop<R: RawControls, C: Clock, S: DisplaySink> {
    session: Session,
    controls: Controls<R>,
    clock: C,
    display: DisplayAdapter<S>,
    bus: UpdateBus,
    timers: Timers,
}

impl<R: RawControls, C: Clock, S: DisplaySink> ControlLoop<R, C, S> {
    /// Build the loop and paint the initial screen (flushed on the first display tick).
    pub fn new(session: Session, raw: R, clock: C, sink: S, timing: &Timing) -> Self {
        let mut display = DisplayAdapter::new(sink);
        display.render_initial(&session.snapshot());
        Self {
            session,
            controls: Controls::new(raw, timing.debounce()),
            clock,
            display,
            bus: UpdateBus::new(),
            timers: Timers {
                rotary: PollTimer::new(timing.rotary()),
                channel_button: PollTimer::new(timing.channel_button()),
                rotary_button: PollTimer::new(timing.rotary_button()),
                display: PollTimer::new(timing.display()),
            },
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Extra listeners (logging, tests) receive every update after the display.
    pub fn bus_mut(&mut self) -> &mut UpdateBus {
        &mut self.bus
    }

    /// Run one pass over all four concerns.
    pub fn poll(&mut self) -> PassReport {
        let now = self.clock.now();
        let mut report = PassReport::default();

        if self.timers.rotary.due(now) {
            if let Some(event) = self.controls.poll_rotation() {
                self.dispatch(event, &mut report);
            }
        }

        if self.timers.channel_button.due(now) {
            if let Some(event) = self.controls.poll_channel_button(now) {
                self.dispatch(event, &mut report);
            }
        }

        if self.timers.rotary_button.due(now) {
            if let Some(event) = self.controls.poll_select_button(now) {
                self.dispatch(event, &mut report);
            }
        }

        if self.timers.display.due(now) {
            report.flushed = self.display.flush();
        }

        report
    }

    /// Keep polling until `stop` returns true; `idle` runs between passes.
    pub fn run_until(&mut self, mut stop: impl FnMut(&Self) -> bool, mut idle: impl FnMut()) {
        while !stop(&*self) {
            self.poll();
            idle();
        }
    }

    fn dispatch(&mut self, event: InputEvent, report: &mut PassReport) {
        let updates = self.session.handle(event);
        for update in &updates {
            self.display.apply(update);
        }
        self.bus.emit_all(&updates);
        report.inputs.push(event);
        report.updates.extend(updates);
    }
}
