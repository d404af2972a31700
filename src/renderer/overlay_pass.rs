//! Screen-space quads for the toggle button and banner.
//!
//! The native surface has no text rendering; labels reach the user through
//! the window title (or the HTML overlay with the `gui` feature). The quads
//! keep the button clickable and show where the banner sits.

use glam::Vec2;

use crate::error::StorefrontError;
use crate::gpu::dynamic_buffer::DynamicBuffer;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{ShaderComposer, OVERLAY_SHADER};
use crate::renderer::pipeline_util;
use crate::store::overlay::{
    BannerKind, OverlayLayout, OverlayState, Rect, BANNER_COLOR, BUTTON_COLOR,
    BUTTON_HOVER_COLOR, ERROR_COLOR,
};

/// Overlay vertex: clip-space position and sRGB color.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct OverlayVertex {
    /// Clip-space position.
    pub position: [f32; 2],
    /// Fill color.
    pub color: [f32; 4],
}

impl OverlayVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Filled rectangles to draw this frame, back to front.
#[must_use]
pub fn overlay_quads(
    state: &OverlayState,
    layout: &OverlayLayout,
    button_hovered: bool,
) -> Vec<(Rect, [f32; 4])> {
    let mut quads = Vec::with_capacity(2);
    let button = if button_hovered {
        BUTTON_HOVER_COLOR
    } else {
        BUTTON_COLOR
    };
    quads.push((layout.button, button));
    if let Some(banner) = &state.banner {
        let color = match banner.kind {
            BannerKind::Info => BANNER_COLOR,
            BannerKind::Error => ERROR_COLOR,
        };
        quads.push((layout.banner, color));
    }
    quads
}

/// Two triangles per rectangle, pixel space mapped to clip space.
fn tessellate(
    quads: &[(Rect, [f32; 4])],
    surface: Vec2,
    format: wgpu::TextureFormat,
) -> Vec<OverlayVertex> {
    let to_clip = |x: f32, y: f32| {
        [(x / surface.x).mul_add(2.0, -1.0), (y / surface.y).mul_add(-2.0, 1.0)]
    };
    let mut vertices = Vec::with_capacity(quads.len() * 6);
    for (rect, color) in quads {
        let color = pipeline_util::surface_color(*color, format);
        let tl = to_clip(rect.x, rect.y);
        let tr = to_clip(rect.x + rect.width, rect.y);
        let bl = to_clip(rect.x, rect.y + rect.height);
        let br = to_clip(rect.x + rect.width, rect.y + rect.height);
        for position in [tl, bl, tr, tr, bl, br] {
            vertices.push(OverlayVertex { position, color });
        }
    }
    vertices
}

/// Draws overlay quads over the 3D scene.
pub struct OverlayRenderer {
    pipeline: wgpu::RenderPipeline,
    vertices: DynamicBuffer,
    vertex_count: u32,
    format: wgpu::TextureFormat,
}

impl OverlayRenderer {
    /// Build the overlay pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Shader`] if the overlay shader fails to
    /// compose.
    pub fn new(
        context: &RenderContext,
        composer: &mut ShaderComposer,
    ) -> Result<Self, StorefrontError> {
        let device = &context.device;
        let shader = composer.compose(device, "Overlay Shader", OVERLAY_SHADER)?;
        let pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Overlay Pipeline Layout"),
                bind_group_layouts: &[],
                push_constant_ranges: &[],
            });
        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Overlay Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[OverlayVertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &pipeline_util::surface_target(
                        context.format(),
                        Some(wgpu::BlendState::ALPHA_BLENDING),
                    ),
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: Some(pipeline_util::depth_stencil_state(false)),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        Ok(Self {
            pipeline,
            vertices: DynamicBuffer::new(
                device,
                "Overlay Vertices",
                (size_of::<OverlayVertex>() * 12) as u64,
                wgpu::BufferUsages::VERTEX,
            ),
            vertex_count: 0,
            format: context.format(),
        })
    }

    /// Upload this frame's quads.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        quads: &[(Rect, [f32; 4])],
        surface: Vec2,
    ) {
        let vertices = tessellate(quads, surface, self.format);
        self.vertex_count = vertices.len() as u32;
        let _ = self.vertices.write(device, queue, &vertices);
    }

    /// Record the overlay draw.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        if self.vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_vertex_buffer(0, self.vertices.buffer().slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::overlay::Banner;

    fn layout() -> OverlayLayout {
        OverlayLayout::new(Vec2::new(800.0, 600.0), 1.0, Some("Shelf_A selected"))
    }

    #[test]
    fn banner_quad_only_when_banner_present() {
        let mut state = OverlayState {
            button_label: "Enter Market",
            banner: None,
        };
        assert_eq!(overlay_quads(&state, &layout(), false).len(), 1);

        state.banner = Some(Banner {
            text: "Failed to load models/a.glb".into(),
            kind: BannerKind::Error,
        });
        let quads = overlay_quads(&state, &layout(), true);
        assert_eq!(quads.len(), 2);
        assert_eq!(quads[0].1, BUTTON_HOVER_COLOR);
        assert_eq!(quads[1].1, ERROR_COLOR);
    }

    #[test]
    fn full_surface_rect_covers_clip_space() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        };
        let vertices = tessellate(
            &[(rect, [1.0; 4])],
            Vec2::new(800.0, 600.0),
            wgpu::TextureFormat::Rgba8Unorm,
        );
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0].position, [-1.0, 1.0]);
        assert_eq!(vertices[5].position, [1.0, -1.0]);
    }
}
