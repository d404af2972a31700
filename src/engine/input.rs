//! Input and surface-size forwarding for [`StorefrontEngine`].

use super::StorefrontEngine;
use crate::gpu::texture::DepthTexture;
use crate::input::InputEvent;

impl StorefrontEngine {
    /// Process a platform-agnostic input event.
    ///
    /// Pointer drags orbit or pan the camera, scroll zooms, a click either
    /// toggles the view (button) or picks a mesh, and key presses move the
    /// camera through the keyboard rig.
    pub fn handle_input(&mut self, event: InputEvent) {
        self.store.handle_input(event);
    }

    /// Forget held buttons, e.g. when the window loses focus.
    pub fn release_input(&mut self) {
        self.store.release_input();
    }

    /// Toggle between the outside and inside model (host-drawn button).
    pub fn toggle_view(&mut self) {
        self.store.toggle_view();
    }

    /// Resize the surface, depth buffer, and camera aspect. Zero-sized
    /// dimensions (minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f32) {
        if width == 0 || height == 0 {
            return;
        }
        self.context.resize(width, height);
        self.depth = DepthTexture::new(&self.context.device, width, height);
        self.store.resize(width, height, scale_factor);
        log::debug!("resized to {width}x{height} @ {scale_factor}x");
    }
}
