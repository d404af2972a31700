//! Standalone storefront window backed by winit.
//!
//! Without the `gui` feature the toggle button and banner are drawn as
//! quads on the surface and their text is mirrored to the window title.
//! With `gui`, two wry webviews host real HTML overlays instead.
//!
//! ```no_run
//! # use storefront::Viewer;
//! Viewer::builder().build().run().unwrap();
//! ```

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{ElementState, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::Key,
    window::{Window, WindowId},
};

use crate::{
    engine::{StorefrontEngine, APP_NAME},
    error::StorefrontError,
    loader::ThreadFetcher,
    options::Options,
    InputEvent, MouseButton,
};

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            options: None,
            title: APP_NAME.into(),
        }
    }

    /// Override the default options (model paths, camera, lighting).
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Set the initial window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
            title: self.title,
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A standalone window showing the storefront.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
    title: String,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed.
    ///
    /// # Errors
    ///
    /// Returns [`StorefrontError::Viewer`] if the event loop cannot be
    /// created or exits with an error.
    pub fn run(self) -> Result<(), StorefrontError> {
        let event_loop = EventLoop::new()
            .map_err(|e| StorefrontError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            window: None,
            engine: None,
            options: Some(self.options),
            title: self.title,
            shown_title: String::new(),
            #[cfg(feature = "gui")]
            overlay: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| StorefrontError::Viewer(e.to_string()))
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

struct ViewerApp {
    window: Option<Arc<Window>>,
    engine: Option<StorefrontEngine>,
    options: Option<Options>,
    title: String,
    /// Last title pushed to the window.
    shown_title: String,
    #[cfg(feature = "gui")]
    overlay: Option<crate::gui::webview::HtmlOverlay>,
}

/// Surface size for a window, never zero.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

/// Logical key as the DOM would name it: the typed character for
/// character keys (`"w"`, `"W"`), the key name otherwise (`"ArrowUp"`).
fn key_string(key: &Key) -> Option<String> {
    match key {
        Key::Character(text) => Some(text.to_string()),
        Key::Named(named) => Some(format!("{named:?}")),
        _ => None,
    }
}

impl ViewerApp {
    fn create_engine(
        &mut self,
        window: &Arc<Window>,
    ) -> Result<StorefrontEngine, StorefrontError> {
        let fetcher = ThreadFetcher::new()?;
        let options = self.options.take().unwrap_or_default();
        pollster::block_on(StorefrontEngine::new(
            Arc::clone(window),
            viewport_size(window.inner_size()),
            window.scale_factor() as f32,
            options,
            Box::new(fetcher),
        ))
    }

    /// Mirror the overlay text into the title and HTML overlay.
    fn sync_overlay(&mut self) {
        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };

        #[cfg(feature = "gui")]
        if let Some(overlay) = &mut self.overlay {
            for action in overlay.drain_actions() {
                match action {
                    crate::gui::webview::OverlayAction::ToggleView => {
                        engine.toggle_view();
                    }
                }
            }
            overlay.sync(engine.store());
        }

        let title = engine.title();
        if title != self.shown_title {
            window.set_title(&title);
            self.shown_title = title;
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next());
        let attrs = if let Some(mon) = &monitor {
            let mon_size = mon.size();
            let scale = mon.scale_factor();
            let logical_w = (f64::from(mon_size.width) / scale * 0.75) as u32;
            let logical_h = (f64::from(mon_size.height) / scale * 0.75) as u32;
            Window::default_attributes()
                .with_title(&self.title)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    logical_w, logical_h,
                ))
        } else {
            Window::default_attributes().with_title(&self.title)
        };

        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let mut engine = match self.create_engine(&window) {
            Ok(e) => e,
            Err(e) => {
                log::error!("Failed to initialize engine: {e}");
                event_loop.exit();
                return;
            }
        };

        #[cfg(feature = "gui")]
        match crate::gui::webview::HtmlOverlay::new(window.as_ref(), engine.store())
        {
            Ok(overlay) => {
                engine.use_host_overlay();
                self.overlay = Some(overlay);
            }
            Err(e) => {
                log::error!("Failed to create overlay webviews: {e}");
            }
        }

        window.request_redraw();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            if let Some(engine) = &mut self.engine {
                engine.shutdown();
            }
            event_loop.exit();
            return;
        }

        let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        else {
            return;
        };

        match event {
            WindowEvent::Resized(size) => {
                let (w, h) = viewport_size(size);
                engine.resize(w, h, window.scale_factor() as f32);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let (w, h) = viewport_size(window.inner_size());
                engine.resize(w, h, scale_factor as f32);
            }

            WindowEvent::Focused(false) => engine.release_input(),

            WindowEvent::RedrawRequested => {
                engine.update();
                if engine.should_render() {
                    if let Err(e) = engine.render() {
                        log::error!("render error: {e}");
                    }
                }
                window.request_redraw();
                self.sync_overlay();
            }

            WindowEvent::MouseInput { button, state, .. } => {
                engine.handle_input(InputEvent::MouseButton {
                    button: MouseButton::from(button),
                    pressed: state == ElementState::Pressed,
                });
            }

            WindowEvent::CursorMoved { position, .. } => {
                engine.handle_input(InputEvent::CursorMoved {
                    x: position.x as f32,
                    y: position.y as f32,
                });
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let scroll_delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.01,
                };
                engine.handle_input(InputEvent::Scroll {
                    delta: scroll_delta,
                });
            }

            WindowEvent::ModifiersChanged(modifiers) => {
                engine.handle_input(InputEvent::ModifiersChanged {
                    shift: modifiers.state().shift_key(),
                });
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let Some(key) = key_string(&event.logical_key) {
                    engine.handle_input(InputEvent::KeyDown { key });
                }
            }

            _ => (),
        }
    }
}
