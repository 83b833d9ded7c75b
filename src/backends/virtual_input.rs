//! Scriptable raw controls.
//!
//! [`VirtualControls`] stands in for the encoder and the two push-buttons.
//! Clones share state, so a test (or the stdin reader in the demo binary) can
//! keep one handle while the control loop owns another.

use crate::event::Button;
use crate::input::RawControls;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Default)]
struct Levels {
    position: i64,
    encoder_button: bool,
    channel_button: bool,
}

#[derive(Clone, Debug, Default)]
pub struct VirtualControls(Rc<RefCell<Levels>>);

impl VirtualControls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn the encoder by `detents` (negative = counter-clockwise).
    pub fn turn(&self, detents: i64) {
        self.0.borrow_mut().position += detents;
    }

    pub fn press(&self, button: Button) {
        self.set(button, true);
    }

    pub fn release(&self, button: Button) {
        self.set(button, false);
    }

    /// Force the raw level, bounces included.
    pub fn set(&self, button: Button, pressed: bool) {
        let mut levels = self.0.borrow_mut();
        match button {
            Button::Encoder => levels.encoder_button = pressed,
            Button::Channel => levels.channel_button = pressed,
        }
    }
}

impl RawControls for VirtualControls {
    fn encoder_position(&mut self) -> i64 {
        self.0.borrow().position
    }

    fn is_pressed(&mut self, button: Button) -> bool {
        let levels = self.0.borrow();
        match button {
            Button::Encoder => levels.encoder_button,
            Button::Channel => levels.channel_button,
        }
    }
}
