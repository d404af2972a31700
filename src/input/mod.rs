//! Input handling: event types, click/drag tracking, listener lifecycle,
//! and the input processor that converts raw host events into storefront
//! commands.

/// Platform-agnostic input events.
pub mod event;
/// Bindable key actions.
pub mod keyboard;
/// Attach/detach bookkeeping for event listeners.
pub mod listener;
/// Click-versus-drag tracking.
pub(crate) mod mouse;
/// Converts raw events into storefront commands.
pub mod processor;

pub use event::{InputEvent, MouseButton};
pub use keyboard::KeyAction;
pub use listener::{BindOutcome, ListenerSlot};
pub use processor::InputProcessor;
