//! Converts raw platform events into storefront commands.
//!
//! The `InputProcessor` owns all transient input state (cursor tracking,
//! drag detection, held buttons, modifier keys). It is the only thing that
//! sits between raw host events and
//! [`Storefront::execute`](crate::Storefront::execute).

use super::event::{InputEvent, MouseButton};
use super::mouse::{ClickResult, ClickTracker};
use crate::store::StoreCommand;

/// Converts raw host events into [`StoreCommand`]s.
///
/// Left-drag orbits, right-drag or shift+left-drag pans, the wheel
/// zooms, a still left press-and-release clicks, and every key-down is
/// forwarded for the camera rig to interpret.
#[derive(Debug, Default)]
pub struct InputProcessor {
    /// Cursor tracking and click/drag discrimination.
    state: ClickTracker,
    /// Whether the primary mouse button is currently held.
    left_pressed: bool,
    /// Whether the secondary mouse button is currently held.
    right_pressed: bool,
    /// Whether the shift modifier is currently held.
    shift_pressed: bool,
}

impl InputProcessor {
    /// Create a processor with no buttons held.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cursor position in physical pixels.
    #[must_use]
    pub fn mouse_pos(&self) -> (f32, f32) {
        (self.state.mouse_pos.x, self.state.mouse_pos.y)
    }

    /// Whether the primary mouse button is pressed.
    #[must_use]
    pub fn mouse_pressed(&self) -> bool {
        self.left_pressed
    }

    /// Release every button without producing a click (focus loss).
    pub fn release_mouse_state(&mut self) {
        self.left_pressed = false;
        self.right_pressed = false;
        let _ = self.state.process_mouse_up();
    }

    /// Process a raw input event and return zero or one commands.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<StoreCommand> {
        match event {
            InputEvent::CursorMoved { x, y } => self.handle_cursor_moved(x, y),
            InputEvent::MouseButton { button, pressed } => {
                self.handle_mouse_button(button, pressed)
            }
            InputEvent::Scroll { delta } => Some(StoreCommand::Zoom { delta }),
            InputEvent::ModifiersChanged { shift } => {
                self.shift_pressed = shift;
                None
            }
            InputEvent::KeyDown { key } => Some(StoreCommand::KeyDown { key }),
        }
    }

    /// Cursor moved: compute delta, possibly produce a camera command.
    fn handle_cursor_moved(&mut self, x: f32, y: f32) -> Option<StoreCommand> {
        let delta = self.state.handle_mouse_position(x, y);
        if delta == glam::Vec2::ZERO {
            return None;
        }
        if self.right_pressed || (self.left_pressed && self.shift_pressed) {
            return Some(StoreCommand::PanCamera { delta });
        }
        if self.left_pressed {
            return Some(StoreCommand::RotateCamera { delta });
        }
        None
    }

    /// Button press/release: track held state, produce a click on a still
    /// primary release.
    fn handle_mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
    ) -> Option<StoreCommand> {
        match button {
            MouseButton::Left => {
                self.left_pressed = pressed;
                if pressed {
                    self.state.handle_mouse_down();
                    return None;
                }
                match self.state.process_mouse_up() {
                    ClickResult::Click { position } => {
                        Some(StoreCommand::Click { position })
                    }
                    ClickResult::NoAction => None,
                }
            }
            MouseButton::Right => {
                self.right_pressed = pressed;
                None
            }
            MouseButton::Middle => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;

    fn moved(p: &mut InputProcessor, x: f32, y: f32) -> Option<StoreCommand> {
        p.handle_event(InputEvent::CursorMoved { x, y })
    }

    fn button(
        p: &mut InputProcessor,
        button: MouseButton,
        pressed: bool,
    ) -> Option<StoreCommand> {
        p.handle_event(InputEvent::MouseButton { button, pressed })
    }

    #[test]
    fn still_left_click_produces_click() {
        let mut p = InputProcessor::new();
        let _ = moved(&mut p, 400.0, 300.0);
        assert_eq!(button(&mut p, MouseButton::Left, true), None);
        assert_eq!(
            button(&mut p, MouseButton::Left, false),
            Some(StoreCommand::Click {
                position: Vec2::new(400.0, 300.0)
            })
        );
    }

    #[test]
    fn left_drag_rotates_and_suppresses_click() {
        let mut p = InputProcessor::new();
        let _ = moved(&mut p, 0.0, 0.0);
        let _ = button(&mut p, MouseButton::Left, true);
        assert_eq!(
            moved(&mut p, 20.0, 5.0),
            Some(StoreCommand::RotateCamera {
                delta: Vec2::new(20.0, 5.0)
            })
        );
        assert_eq!(button(&mut p, MouseButton::Left, false), None);
    }

    #[test]
    fn right_drag_and_shift_drag_pan() {
        let mut p = InputProcessor::new();
        let _ = button(&mut p, MouseButton::Right, true);
        assert!(matches!(
            moved(&mut p, 5.0, 0.0),
            Some(StoreCommand::PanCamera { .. })
        ));
        let _ = button(&mut p, MouseButton::Right, false);

        let _ = p.handle_event(InputEvent::ModifiersChanged { shift: true });
        let _ = button(&mut p, MouseButton::Left, true);
        assert!(matches!(
            moved(&mut p, 9.0, 0.0),
            Some(StoreCommand::PanCamera { .. })
        ));
    }

    #[test]
    fn hover_without_buttons_is_silent() {
        let mut p = InputProcessor::new();
        assert_eq!(moved(&mut p, 10.0, 10.0), None);
    }

    #[test]
    fn keys_and_scroll_forward() {
        let mut p = InputProcessor::new();
        assert_eq!(
            p.handle_event(InputEvent::KeyDown { key: "w".into() }),
            Some(StoreCommand::KeyDown { key: "w".into() })
        );
        assert_eq!(
            p.handle_event(InputEvent::Scroll { delta: 1.0 }),
            Some(StoreCommand::Zoom { delta: 1.0 })
        );
    }
}
