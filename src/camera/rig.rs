//! Keyboard stepping for the camera.

use crate::camera::controller::CameraController;
use crate::input::{BindOutcome, KeyAction, ListenerSlot};
use crate::options::KeybindingOptions;

/// Dependencies of the keyboard listener: which camera it drives and the
/// step size it applies. A change to either rebinds the listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigBinding {
    /// Identity of the camera being driven.
    pub camera: u64,
    /// World units per keypress.
    pub step: f32,
}

/// Moves the camera eye along world axes on bound key-downs.
///
/// Each key-down (auto-repeat included) moves the eye by exactly one step;
/// the orbit target stays put. Unbound keys are ignored. While unmounted,
/// no key has any effect.
#[derive(Debug)]
pub struct CameraRig {
    bindings: KeybindingOptions,
    listener: ListenerSlot<RigBinding>,
}

impl CameraRig {
    /// An unmounted rig using `bindings`.
    #[must_use]
    pub fn new(bindings: KeybindingOptions) -> Self {
        Self {
            bindings,
            listener: ListenerSlot::new("camera rig"),
        }
    }

    /// Attach the keyboard listener for `binding`.
    pub fn mount(&mut self, binding: RigBinding) -> BindOutcome {
        self.listener.bind(binding)
    }

    /// Detach the keyboard listener.
    pub fn unmount(&mut self) -> bool {
        self.listener.unbind()
    }

    /// Whether the keyboard listener is attached.
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.listener.is_bound()
    }

    /// Replace the key map (takes effect on the next key).
    pub fn set_bindings(&mut self, bindings: KeybindingOptions) {
        self.bindings = bindings;
    }

    /// Handle one key-down. Returns the action applied, if any.
    pub fn handle_key(
        &self,
        key: &str,
        controller: &mut CameraController,
    ) -> Option<KeyAction> {
        let binding = self.listener.key()?;
        let action = self.bindings.lookup(key)?;
        controller.translate_eye(action.direction() * binding.step);
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::options::CameraOptions;

    fn setup() -> (CameraRig, CameraController) {
        let mut rig = CameraRig::new(KeybindingOptions::default());
        let _ = rig.mount(RigBinding {
            camera: 0,
            step: 2.0,
        });
        let controller =
            CameraController::new(&CameraOptions::default(), 800, 600);
        (rig, controller)
    }

    #[test]
    fn five_forward_presses_move_ten_units() {
        let (rig, mut c) = setup();
        for _ in 0..5 {
            assert_eq!(rig.handle_key("w", &mut c), Some(KeyAction::MoveForward));
        }
        assert_eq!(c.camera.eye, Vec3::new(80.0, 30.0, 50.0));
        assert_eq!(c.camera.target, Vec3::ZERO);
    }

    #[test]
    fn each_binding_moves_along_its_axis() {
        let (rig, mut c) = setup();
        let _ = rig.handle_key("s", &mut c);
        let _ = rig.handle_key("a", &mut c);
        let _ = rig.handle_key("a", &mut c);
        let _ = rig.handle_key("d", &mut c);
        assert_eq!(c.camera.eye, Vec3::new(78.0, 30.0, 62.0));
    }

    #[test]
    fn unbound_and_shifted_keys_are_ignored() {
        let (rig, mut c) = setup();
        assert_eq!(rig.handle_key("q", &mut c), None);
        assert_eq!(rig.handle_key("W", &mut c), None);
        assert_eq!(c.camera.eye, Vec3::new(80.0, 30.0, 60.0));
    }

    #[test]
    fn unmounted_rig_ignores_keys() {
        let (mut rig, mut c) = setup();
        assert!(rig.unmount());
        assert_eq!(rig.handle_key("w", &mut c), None);
        assert_eq!(c.camera.eye, Vec3::new(80.0, 30.0, 60.0));
    }

    #[test]
    fn rebinding_with_new_step_applies_it() {
        let (mut rig, mut c) = setup();
        assert_eq!(
            rig.mount(RigBinding {
                camera: 0,
                step: 5.0
            }),
            BindOutcome::Rebound
        );
        let _ = rig.handle_key("d", &mut c);
        assert_eq!(c.camera.eye.x, 85.0);
    }
}
