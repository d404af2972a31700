use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Camera actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// move_forward = "w"
/// move_left = "ArrowLeft"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Step the eye toward -Z.
    MoveForward,
    /// Step the eye toward +Z.
    MoveBackward,
    /// Step the eye toward -X.
    MoveLeft,
    /// Step the eye toward +X.
    MoveRight,
}

impl KeyAction {
    /// World-space unit direction of this step. Movement is world-axis
    /// aligned and ignores where the camera is looking.
    #[must_use]
    pub fn direction(self) -> Vec3 {
        match self {
            Self::MoveForward => Vec3::NEG_Z,
            Self::MoveBackward => Vec3::Z,
            Self::MoveLeft => Vec3::NEG_X,
            Self::MoveRight => Vec3::X,
        }
    }
}
