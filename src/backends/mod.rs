//! Backends for `digipot-showcase`.
//!
//! Implementations of the three boundaries the session talks to:
//! - [`Potentiometer`](crate::device::Potentiometer) parts (`simulated`),
//! - [`RawControls`](crate::input::RawControls) (`virtual_input`),
//! - [`DisplaySink`](crate::display::DisplaySink) (`terminal`).
//!
//! # Feature flags
//! - **`simulated`** — in-memory potentiometers with a call journal (default).
//!
//! Real bus drivers are expected to live in their own crates and implement
//! the same traits.

#[cfg(feature = "simulated")]
#[cfg_attr(docsrs, doc(cfg(feature = "simulated")))]
pub mod simulated;
pub mod terminal;
pub mod virtual_input;
