//! The storefront's complete interactive vocabulary.
//!
//! Every user-facing operation, whether triggered by a key press, a mouse
//! gesture, or the overlay button, is represented as a `StoreCommand`.
//! Hosts construct commands and pass them to
//! [`Storefront::execute`](super::Storefront::execute).

use glam::Vec2;

/// A discrete or parameterized storefront action.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    /// Orbit the camera by a pixel drag delta.
    RotateCamera {
        /// Cursor travel in physical pixels.
        delta: Vec2,
    },
    /// Pan the camera by a pixel drag delta.
    PanCamera {
        /// Cursor travel in physical pixels.
        delta: Vec2,
    },
    /// Dolly the camera (positive = toward the target).
    Zoom {
        /// Scroll amount.
        delta: f32,
    },
    /// Primary-button click that did not turn into a drag.
    Click {
        /// Click position in physical pixels, relative to the surface.
        position: Vec2,
    },
    /// A key went down; the camera rig decides whether it is bound.
    KeyDown {
        /// Logical key string.
        key: String,
    },
    /// Switch between the outside and inside views.
    ToggleView,
}
