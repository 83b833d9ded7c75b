//! Digipot showcase — one encoder and two buttons driving several digital
//! potentiometers.
//!
//! Raw control levels are debounced into [`InputEvent`]s, applied to the
//! selected device by the [`Session`] state machine, and mirrored onto a
//! display through [`UpdateEvent`]s.

pub mod backends;
pub mod config;
pub mod device;
pub mod display;
pub mod error;
pub mod event;
pub mod eventbus;
pub mod input;
pub mod logger;
pub mod metadata;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod snapshot;

pub use config::*;
pub use device::*;
pub use error::*;
pub use event::*;
pub use eventbus::*;
pub use metadata::*;
pub use registry::*;
pub use scheduler::*;
pub use session::*;
pub use snapshot::*;
