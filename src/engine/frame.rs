//! Per-frame update and render for [`StorefrontEngine`].

use super::StorefrontEngine;
use crate::error::StorefrontError;
use crate::renderer::overlay_pass::overlay_quads;

impl StorefrontEngine {
    /// Advance the storefront clock, fold in finished asset loads, run the
    /// selection animation, and push camera and lighting to the GPU.
    ///
    /// Call once per frame before [`render`](Self::render):
    /// ```ignore
    /// engine.update();
    /// engine.render()?;
    /// ```
    pub fn update(&mut self) {
        self.store.update(self.frame_timing.now_ms());
        self.camera
            .update(&self.context.queue, &self.store.camera().camera);
        self.lighting
            .set_options(&self.context.queue, &self.store.options().lighting);
    }

    /// Whether the frame limiter allows a frame now.
    #[must_use]
    pub fn should_render(&self) -> bool {
        self.frame_timing.should_render()
    }

    /// Draw the scene and overlays to the surface.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped;
    /// a timeout skips the frame.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Viewer`] if the surface is out of memory
    /// or otherwise unusable.
    pub fn render(&mut self) -> Result<(), StorefrontError> {
        let frame = match self.context.get_next_frame() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.context.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timeout, skipping frame");
                return Ok(());
            }
            Err(e) => return Err(StorefrontError::Viewer(e.to_string())),
        };

        let device = &self.context.device;
        let queue = &self.context.queue;
        self.meshes.prepare(device, queue, self.store.scene());
        self.store.scene_mut().mark_rendered();

        let quads = if self.overlay_quads {
            overlay_quads(
                &self.store.overlay(),
                &self.store.overlay_layout(),
                self.store.button_hovered(),
            )
        } else {
            Vec::new()
        };
        self.overlay
            .prepare(device, queue, &quads, self.store.surface_size());

        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let [r, g, b] = self.store.options().lighting.background;
        let mut encoder = self.context.create_encoder();
        {
            let mut pass =
                encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Storefront Pass"),
                    color_attachments: &[Some(
                        wgpu::RenderPassColorAttachment {
                            view: &view,
                            resolve_target: None,
                            depth_slice: None,
                            ops: wgpu::Operations {
                                load: wgpu::LoadOp::Clear(wgpu::Color {
                                    r: f64::from(r),
                                    g: f64::from(g),
                                    b: f64::from(b),
                                    a: 1.0,
                                }),
                                store: wgpu::StoreOp::Store,
                            },
                        },
                    )],
                    depth_stencil_attachment: Some(
                        wgpu::RenderPassDepthStencilAttachment {
                            view: &self.depth.view,
                            depth_ops: Some(wgpu::Operations {
                                load: wgpu::LoadOp::Clear(1.0),
                                store: wgpu::StoreOp::Discard,
                            }),
                            stencil_ops: None,
                        },
                    ),
                    timestamp_writes: None,
                    occlusion_query_set: None,
                });
            self.meshes.draw(&mut pass, &self.camera, &self.lighting);
            self.overlay.draw(&mut pass);
        }
        self.context.submit(encoder);
        frame.present();
        self.frame_timing.end_frame();
        Ok(())
    }
}
