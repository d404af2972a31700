use glam::Vec2;

/// Cursor travel (physical pixels) after which a press becomes a drag.
const DRAG_THRESHOLD: f32 = 3.0;

/// Result of processing a primary-button release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum ClickResult {
    /// The press turned into a drag (orbit/pan), or there was no press.
    NoAction,
    /// Press and release without significant travel.
    Click {
        /// Release position in physical pixels.
        position: Vec2,
    },
}

/// Tracks cursor position and press-to-release travel.
#[derive(Debug, Default)]
pub(crate) struct ClickTracker {
    pub(crate) mouse_pos: Vec2,
    down_pos: Option<Vec2>,
    is_dragging: bool,
}

impl ClickTracker {
    /// Record the cursor position and return the delta from the last one.
    pub(crate) fn handle_mouse_position(&mut self, x: f32, y: f32) -> Vec2 {
        let pos = Vec2::new(x, y);
        let delta = pos - self.mouse_pos;
        self.mouse_pos = pos;
        if let Some(down) = self.down_pos {
            if pos.distance(down) > DRAG_THRESHOLD {
                self.is_dragging = true;
            }
        }
        delta
    }

    /// Start tracking a press at the current cursor position.
    pub(crate) fn handle_mouse_down(&mut self) {
        self.down_pos = Some(self.mouse_pos);
        self.is_dragging = false;
    }

    /// Finish a press. Only a press that never became a drag is a click.
    pub(crate) fn process_mouse_up(&mut self) -> ClickResult {
        let was_pressed = self.down_pos.take().is_some();
        let was_dragging = std::mem::take(&mut self.is_dragging);
        if was_pressed && !was_dragging {
            ClickResult::Click {
                position: self.mouse_pos,
            }
        } else {
            ClickResult::NoAction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn still_press_is_a_click() {
        let mut t = ClickTracker::default();
        let _ = t.handle_mouse_position(10.0, 20.0);
        t.handle_mouse_down();
        let _ = t.handle_mouse_position(11.0, 21.0);
        assert_eq!(
            t.process_mouse_up(),
            ClickResult::Click {
                position: Vec2::new(11.0, 21.0)
            }
        );
    }

    #[test]
    fn drag_is_not_a_click() {
        let mut t = ClickTracker::default();
        t.handle_mouse_down();
        let _ = t.handle_mouse_position(40.0, 0.0);
        let _ = t.handle_mouse_position(0.0, 0.0);
        assert_eq!(t.process_mouse_up(), ClickResult::NoAction);
    }

    #[test]
    fn release_without_press_is_ignored() {
        let mut t = ClickTracker::default();
        assert_eq!(t.process_mouse_up(), ClickResult::NoAction);
    }
}
