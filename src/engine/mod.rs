//! GPU engine around a [`Storefront`].
//!
//! The storefront owns every piece of interactive state; the engine owns
//! the wgpu resources that draw it. Hosts (winit window, browser canvas)
//! construct one engine, forward [`InputEvent`](crate::input::InputEvent)s,
//! and call [`update`](StorefrontEngine::update) then
//! [`render`](StorefrontEngine::render) once per frame.

mod frame;
mod input;

use crate::camera::binding::CameraBinding;
use crate::error::StorefrontError;
use crate::gpu::lighting::Lighting;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::gpu::texture::DepthTexture;
use crate::loader::AssetFetcher;
use crate::options::Options;
use crate::renderer::mesh_pass::MeshRenderer;
use crate::renderer::overlay_pass::OverlayRenderer;
use crate::store::Storefront;
use crate::util::frame_timing::FrameTiming;

/// Application name shown in native window titles.
pub const APP_NAME: &str = "Storefront";

/// Surface the storefront listens on; one per engine.
const SURFACE_ID: u64 = 1;

/// Target FPS limit (0 = unlimited, vsync paces the frames).
const TARGET_FPS: u32 = 0;

/// Renders a [`Storefront`] to a window or canvas surface.
pub struct StorefrontEngine {
    context: RenderContext,
    store: Storefront,
    camera: CameraBinding,
    lighting: Lighting,
    depth: DepthTexture,
    meshes: MeshRenderer,
    overlay: OverlayRenderer,
    /// Whether the button and banner are drawn as quads on the surface.
    overlay_quads: bool,
    frame_timing: FrameTiming,
}

impl StorefrontEngine {
    /// Create the GPU context on `target`, build the pipelines, and start
    /// loading the outside model through `fetcher`.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Gpu`] if no GPU context can be created
    /// and [`StorefrontError::Shader`] if a shader fails to compose.
    pub async fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        scale_factor: f32,
        options: Options,
        fetcher: Box<dyn AssetFetcher>,
    ) -> Result<Self, StorefrontError> {
        let context = RenderContext::new(target, size).await?;
        let (width, height) = context.size();

        let mut store = Storefront::new(options, fetcher, width, height);
        store.resize(width, height, scale_factor);
        store.mount_listeners(SURFACE_ID);

        let mut composer = ShaderComposer::new()?;
        let camera = CameraBinding::new(&context.device, &store.camera().camera);
        let lighting = Lighting::new(&context.device, &store.options().lighting);
        let meshes =
            MeshRenderer::new(&context, &mut composer, &camera, &lighting)?;
        let overlay = OverlayRenderer::new(&context, &mut composer)?;
        let depth = DepthTexture::new(&context.device, width, height);

        log::info!("storefront engine ready ({width}x{height} @ {scale_factor}x)");
        Ok(Self {
            context,
            store,
            camera,
            lighting,
            depth,
            meshes,
            overlay,
            overlay_quads: true,
            frame_timing: FrameTiming::new(TARGET_FPS),
        })
    }

    /// The view controller.
    #[must_use]
    pub fn store(&self) -> &Storefront {
        &self.store
    }

    /// Mutable view controller.
    pub fn store_mut(&mut self) -> &mut Storefront {
        &mut self.store
    }

    /// Hand the overlays to the host (DOM or HTML webview): stop drawing
    /// the quads and stop treating clicks on the button rectangle as
    /// toggles.
    pub fn use_host_overlay(&mut self) {
        self.overlay_quads = false;
        self.store.set_overlay_hit_test(false);
    }

    /// Window title mirroring the overlay text.
    #[must_use]
    pub fn title(&self) -> String {
        self.store.overlay().title(APP_NAME)
    }

    /// Milliseconds since the engine started; the clock
    /// [`update`](Self::update) feeds the storefront.
    #[must_use]
    pub fn now_ms(&self) -> f64 {
        self.frame_timing.now_ms()
    }

    /// Smoothed frames per second.
    #[must_use]
    pub fn fps(&self) -> f32 {
        self.frame_timing.fps()
    }

    /// Detach listeners and cancel pending timers. Further input has no
    /// effect.
    pub fn shutdown(&mut self) {
        self.store.unmount();
    }
}
