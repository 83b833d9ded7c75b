//! Debounced controls.
//!
//! Turns raw, noisy control levels into [`InputEvent`]s:
//! - each push-button runs its own [`Debouncer`] (`Released`/`Pressed`), and only
//!   a press edge becomes an event;
//! - the encoder is read as an absolute position; [`EncoderTracker`] reports the
//!   sign of the change since the previous read.
//!
//! Nothing here blocks or sleeps. Time comes from a [`Clock`], which tests
//! replace with [`ManualClock`].

use crate::event::{Button, Edge, InputEvent, Step};
use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<Duration>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.0.set(self.0.get() + by);
    }

    pub fn set(&self, at: Duration) {
        self.0.set(at.max(self.0.get()));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.0.get()
    }
}

/// Minimum re-check interval for one concern.
#[derive(Clone, Debug)]
pub struct PollTimer {
    interval: Duration,
    last: Duration,
}

impl PollTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: Duration::ZERO,
        }
    }

    /// True (and re-armed) once at least `interval` has passed since the last
    /// time this returned true.
    pub fn due(&mut self, now: Duration) -> bool {
        if now.saturating_sub(self.last) >= self.interval {
            self.last = now;
            true
        } else {
            false
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonState {
    Released,
    Pressed,
}

/// Stability-window debouncer for one button.
///
/// A level change is accepted only after the raw signal has held the new level
/// for `settle`.
#[derive(Clone, Debug)]
pub struct Debouncer {
    settle: Duration,
    state: ButtonState,
    raw: bool,
    raw_since: Duration,
}

impl Debouncer {
    pub fn new(settle: Duration) -> Self {
        Self {
            settle,
            state: ButtonState::Released,
            raw: false,
            raw_since: Duration::ZERO,
        }
    }

    #[inline]
    pub fn state(&self) -> ButtonState {
        self.state
    }

    /// Feed one raw sample (`true` = pressed) taken at `now`.
    pub fn update(&mut self, pressed: bool, now: Duration) -> Option<Edge> {
        if pressed != self.raw {
            self.raw = pressed;
            self.raw_since = now;
        }

        let stable = match self.state {
            ButtonState::Pressed => true,
            ButtonState::Released => false,
        };
        if self.raw == stable || now.saturating_sub(self.raw_since) < self.settle {
            return None;
        }

        if self.raw {
            self.state = ButtonState::Pressed;
            Some(Edge::Press)
        } else {
            self.state = ButtonState::Released;
            Some(Edge::Release)
        }
    }
}

/// Derives one step per poll from an absolute encoder position.
#[derive(Clone, Debug, Default)]
pub struct EncoderTracker {
    last_position: i64,
}

impl EncoderTracker {
    pub fn new(position: i64) -> Self {
        Self {
            last_position: position,
        }
    }

    pub fn poll(&mut self, position: i64) -> Option<Step> {
        let delta = position.wrapping_sub(self.last_position);
        self.last_position = position;
        Step::from_delta(delta)
    }
}

/// Raw control levels as wired to the board.
pub trait RawControls {
    /// Accumulated encoder position (detents, signed).
    fn encoder_position(&mut self) -> i64;

    /// Current level of `button`, already corrected for polarity.
    fn is_pressed(&mut self, button: Button) -> bool;
}

/// Debounced view over a [`RawControls`].
pub struct Controls<R: RawControls> {
    raw: R,
    encoder: EncoderTracker,
    select: Debouncer,
    channel: Debouncer,
}

impl<R: RawControls> Controls<R> {
    pub fn new(mut raw: R, settle: Duration) -> Self {
        let position = raw.encoder_position();
        Self {
            raw,
            encoder: EncoderTracker::new(position),
            select: Debouncer::new(settle),
            channel: Debouncer::new(settle),
        }
    }

    pub fn poll_rotation(&mut self) -> Option<InputEvent> {
        let position = self.raw.encoder_position();
        #[cfg(feature = "debug-log")]
        tracing::trace!(position, "encoder read");
        self.encoder.poll(position).map(InputEvent::RotateDelta)
    }

    pub fn poll_channel_button(&mut self, now: Duration) -> Option<InputEvent> {
        let pressed = self.raw.is_pressed(Button::Channel);
        press_edge(&mut self.channel, Button::Channel, pressed, now)
            .then_some(InputEvent::ChannelToggle)
    }

    pub fn poll_select_button(&mut self, now: Duration) -> Option<InputEvent> {
        let pressed = self.raw.is_pressed(Button::Encoder);
        press_edge(&mut self.select, Button::Encoder, pressed, now)
            .then_some(InputEvent::SelectNext)
    }
}

fn press_edge(debouncer: &mut Debouncer, button: Button, pressed: bool, now: Duration) -> bool {
    let edge = debouncer.update(pressed, now);
    #[cfg(feature = "debug-log")]
    tracing::trace!(?button, pressed, ?edge, "button sample");
    #[cfg(not(feature = "debug-log"))]
    let _ = button;
    edge == Some(Edge::Press)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn timer_fires_at_interval_boundaries() {
        let mut t = PollTimer::new(50 * MS);
        assert!(!t.due(49 * MS));
        assert!(t.due(50 * MS));
        assert!(!t.due(99 * MS));
        assert!(t.due(100 * MS));
    }

    #[test]
    fn zero_interval_is_always_due() {
        let mut t = PollTimer::new(Duration::ZERO);
        assert!(t.due(Duration::ZERO));
        assert!(t.due(Duration::ZERO));
    }

    #[test]
    fn bounce_shorter_than_settle_is_ignored() {
        let mut d = Debouncer::new(15 * MS);
        assert_eq!(d.update(true, Duration::ZERO), None);
        assert_eq!(d.update(false, 5 * MS), None);
        assert_eq!(d.update(true, 8 * MS), None);
        assert_eq!(d.update(true, 20 * MS), None);
        assert_eq!(d.update(true, 23 * MS), Some(Edge::Press));
        assert_eq!(d.state(), ButtonState::Pressed);
        assert_eq!(d.update(true, 40 * MS), None);
    }

    #[test]
    fn release_is_symmetric() {
        let mut d = Debouncer::new(10 * MS);
        d.update(true, Duration::ZERO);
        assert_eq!(d.update(true, 10 * MS), Some(Edge::Press));
        assert_eq!(d.update(false, 12 * MS), None);
        assert_eq!(d.update(false, 22 * MS), Some(Edge::Release));
        assert_eq!(d.state(), ButtonState::Released);
    }

    #[test]
    fn encoder_reports_sign_only() {
        let mut e = EncoderTracker::new(0);
        assert_eq!(e.poll(0), None);
        assert_eq!(e.poll(4), Some(Step::Increment));
        assert_eq!(e.poll(1), Some(Step::Decrement));
        assert_eq!(e.poll(1), None);
    }

    #[test]
    fn manual_clock_is_shared_and_monotonic() {
        let clock = ManualClock::new();
        let other = clock.clone();
        clock.advance(5 * MS);
        assert_eq!(other.now(), 5 * MS);
        other.set(2 * MS);
        assert_eq!(clock.now(), 5 * MS);
    }
}
