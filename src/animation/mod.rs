//! Animation system: selection feedback driven by a per-frame clock.

/// Selection pulse, wobble, and timed reset.
pub mod selection;
/// Cancellable one-shot deadline timer.
pub mod timer;

pub use selection::{PopupChange, SelectionAnimator};
pub use timer::OneShotTimer;
