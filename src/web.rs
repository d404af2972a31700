//! Browser host: a canvas-backed storefront with DOM overlays.
//!
//! ```js
//! import init, { startStorefront } from "./storefront.js";
//! await init();
//! const store = await startStorefront(document.querySelector("canvas"));
//! // later: store.free() detaches every listener
//! ```

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::mpsc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Document, Event, EventTarget, HtmlButtonElement, HtmlCanvasElement,
    HtmlElement, KeyboardEvent, MouseEvent, WheelEvent,
};

use crate::engine::StorefrontEngine;
use crate::error::StorefrontError;
use crate::input::{InputEvent, MouseButton};
use crate::loader::{AssetFetcher, LoadResult, ModelTemplate};
use crate::options::Options;
use crate::store::{BannerKind, OverlayState};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ── Asset fetching ───────────────────────────────────────────────────────

/// Loads model assets with `fetch()` relative to the page.
#[derive(Debug, Default)]
pub struct FetchFetcher;

async fn fetch_bytes(path: &str) -> Result<Vec<u8>, StorefrontError> {
    let window = web_sys::window()
        .ok_or_else(|| StorefrontError::asset_load(path, "no window"))?;
    let response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(|e| StorefrontError::asset_load(path, format!("{e:?}")))?;
    let response: web_sys::Response = response
        .dyn_into()
        .map_err(|_| StorefrontError::asset_load(path, "not a Response"))?;
    if !response.ok() {
        return Err(StorefrontError::asset_load(
            path,
            format!("HTTP {}", response.status()),
        ));
    }
    let buffer = response
        .array_buffer()
        .map_err(|e| StorefrontError::asset_load(path, format!("{e:?}")))?;
    let buffer = JsFuture::from(buffer)
        .await
        .map_err(|e| StorefrontError::asset_load(path, format!("{e:?}")))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

impl AssetFetcher for FetchFetcher {
    fn fetch(&self, path: &str, done: mpsc::Sender<LoadResult>) {
        let path = path.to_owned();
        wasm_bindgen_futures::spawn_local(async move {
            let result = match fetch_bytes(&path).await {
                Ok(bytes) => ModelTemplate::from_slice(&path, &bytes),
                Err(e) => Err(e),
            };
            let _ = done.send((path, result));
        });
    }
}

// ── Listener guards ──────────────────────────────────────────────────────

/// A DOM event listener removed again when dropped.
struct EventListener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl EventListener {
    fn new(
        target: &EventTarget,
        kind: &'static str,
        handler: impl FnMut(Event) + 'static,
    ) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(handler);
        target.add_event_listener_with_callback(
            kind,
            callback.as_ref().unchecked_ref(),
        )?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        let _ = self.target.remove_event_listener_with_callback(
            self.kind,
            self.callback.as_ref().unchecked_ref(),
        );
    }
}

// ── DOM overlay ──────────────────────────────────────────────────────────

/// Toggle button and banner as absolutely positioned DOM elements.
struct DomOverlay {
    button: HtmlButtonElement,
    banner: HtmlElement,
    shown: Option<OverlayState>,
}

impl DomOverlay {
    fn new(document: &Document, parent: &HtmlElement) -> Result<Self, JsValue> {
        let button: HtmlButtonElement =
            document.create_element("button")?.dyn_into()?;
        set_styles(
            &button,
            &[
                ("position", "absolute"),
                ("bottom", "64px"),
                ("left", "50%"),
                ("transform", "translateX(-50%)"),
                ("padding", "8px 16px"),
                ("border", "none"),
                ("border-radius", "4px"),
                ("background", "#3b82f6"),
                ("color", "#fff"),
                ("cursor", "pointer"),
            ],
        )?;
        let banner: HtmlElement = document.create_element("div")?.dyn_into()?;
        set_styles(
            &banner,
            &[
                ("position", "absolute"),
                ("top", "64px"),
                ("left", "50%"),
                ("transform", "translateX(-50%)"),
                ("padding", "8px 16px"),
                ("border-radius", "4px"),
                ("color", "#fff"),
                ("display", "none"),
            ],
        )?;
        let _ = parent.append_child(&button)?;
        let _ = parent.append_child(&banner)?;
        Ok(Self {
            button,
            banner,
            shown: None,
        })
    }

    fn sync(&mut self, state: OverlayState) {
        if self.shown.as_ref() == Some(&state) {
            return;
        }
        self.button.set_text_content(Some(state.button_label));
        let style = self.banner.style();
        match &state.banner {
            Some(banner) => {
                self.banner.set_text_content(Some(&banner.text));
                let color = match banner.kind {
                    BannerKind::Info => "#000",
                    BannerKind::Error => "#dc2626",
                };
                let _ = style.set_property("background", color);
                let _ = style.set_property("display", "block");
            }
            None => {
                let _ = style.set_property("display", "none");
            }
        }
        self.shown = Some(state);
    }

    fn remove(&self) {
        self.button.remove();
        self.banner.remove();
    }
}

fn set_styles(element: &HtmlElement, styles: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = element.style();
    for (name, value) in styles {
        style.set_property(name, value)?;
    }
    Ok(())
}

// ── Reset timeout ────────────────────────────────────────────────────────

/// A `setTimeout` mirroring the store's pending reset deadline, so the
/// reset fires on time while the tab is hidden and frames are paused.
struct ResetTimeout {
    callback: Closure<dyn FnMut()>,
    /// Browser timeout id and the deadline it was armed for.
    armed: Option<(i32, f64)>,
}

impl ResetTimeout {
    fn cancel(&mut self) {
        if let (Some((id, _)), Some(window)) = (self.armed.take(), web_sys::window()) {
            window.clear_timeout_with_handle(id);
        }
    }
}

// ── Host ─────────────────────────────────────────────────────────────────

struct Host {
    engine: StorefrontEngine,
    overlay: DomOverlay,
    canvas: HtmlCanvasElement,
    running: bool,
    reset_timeout: Option<ResetTimeout>,
}

impl Host {
    /// Forward an input event, then follow any change of the reset deadline.
    fn input(&mut self, event: InputEvent) {
        self.engine.handle_input(event);
        self.sync_reset_timeout();
    }

    /// Cancel-then-arm the browser timeout when the deadline changed.
    fn sync_reset_timeout(&mut self) {
        let deadline = self.engine.store().reset_deadline();
        let now = self.engine.now_ms();
        let Some(timeout) = &mut self.reset_timeout else {
            return;
        };
        if timeout.armed.map(|(_, at)| at) == deadline {
            return;
        }
        timeout.cancel();
        let (Some(deadline), Some(window)) = (deadline, web_sys::window()) else {
            return;
        };
        let delay = (deadline - now).max(0.0).ceil() as i32;
        match window.set_timeout_with_callback_and_timeout_and_arguments_0(
            timeout.callback.as_ref().unchecked_ref(),
            delay,
        ) {
            Ok(id) => timeout.armed = Some((id, deadline)),
            Err(e) => log::warn!("could not arm reset timeout: {e:?}"),
        }
    }

    fn frame(&mut self) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let width = (f64::from(self.canvas.client_width()) * dpr) as u32;
        let height = (f64::from(self.canvas.client_height()) * dpr) as u32;
        if width > 0
            && height > 0
            && (width != self.canvas.width() || height != self.canvas.height())
        {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.engine.resize(width, height, dpr as f32);
        }

        self.engine.update();
        if let Err(e) = self.engine.render() {
            log::error!("render error: {e}");
        }
        self.overlay.sync(self.engine.store().overlay());
        self.sync_reset_timeout();
    }
}

/// Handle returned to JavaScript. Dropping it (`free()`) detaches every
/// listener, stops the frame loop, and removes the overlay elements.
#[wasm_bindgen]
pub struct WebStorefront {
    host: Rc<RefCell<Host>>,
    _listeners: Vec<EventListener>,
}

impl Drop for WebStorefront {
    fn drop(&mut self) {
        if let Ok(mut host) = self.host.try_borrow_mut() {
            host.running = false;
            host.engine.shutdown();
            if let Some(timeout) = &mut host.reset_timeout {
                timeout.cancel();
            }
            host.overlay.remove();
        }
    }
}

#[wasm_bindgen]
impl WebStorefront {
    /// Toggle between the outside and inside model.
    #[wasm_bindgen(js_name = "toggleView")]
    pub fn toggle_view(&self) {
        let mut host = self.host.borrow_mut();
        host.engine.toggle_view();
        host.sync_reset_timeout();
    }

    /// Current popup text, if any.
    #[must_use]
    pub fn popup(&self) -> Option<String> {
        self.host.borrow().engine.store().popup().map(str::to_owned)
    }
}

/// Pointer position in physical canvas pixels.
fn pointer(event: &MouseEvent) -> InputEvent {
    let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
    InputEvent::CursorMoved {
        x: (f64::from(event.offset_x()) * dpr) as f32,
        y: (f64::from(event.offset_y()) * dpr) as f32,
    }
}

fn attach_listeners(
    host: &Rc<RefCell<Host>>,
    canvas: &HtmlCanvasElement,
    button: &HtmlButtonElement,
) -> Result<Vec<EventListener>, JsValue> {
    let window: EventTarget =
        web_sys::window().ok_or_else(|| js_err("no window"))?.into();
    let canvas: &EventTarget = canvas.as_ref();
    let mut listeners = Vec::new();

    let h = Rc::clone(host);
    listeners.push(EventListener::new(canvas, "mousemove", move |e| {
        if let Some(e) = e.dyn_ref::<MouseEvent>() {
            h.borrow_mut().input(pointer(e));
        }
    })?);

    for (kind, pressed) in [("mousedown", true), ("mouseup", false)] {
        let h = Rc::clone(host);
        listeners.push(EventListener::new(canvas, kind, move |e| {
            let Some(e) = e.dyn_ref::<MouseEvent>() else {
                return;
            };
            let Some(button) = MouseButton::from_dom(e.button()) else {
                return;
            };
            let mut host = h.borrow_mut();
            host.input(pointer(e));
            host.input(InputEvent::ModifiersChanged {
                shift: e.shift_key(),
            });
            host.input(InputEvent::MouseButton { button, pressed });
        })?);
    }

    let h = Rc::clone(host);
    listeners.push(EventListener::new(canvas, "wheel", move |e| {
        if let Some(e) = e.dyn_ref::<WheelEvent>() {
            e.prevent_default();
            // DOM deltaY is positive when scrolling down (zoom out)
            let delta = (-e.delta_y() * 0.01) as f32;
            h.borrow_mut().input(InputEvent::Scroll { delta });
        }
    })?);

    listeners.push(EventListener::new(canvas, "contextmenu", |e| {
        e.prevent_default();
    })?);

    let h = Rc::clone(host);
    listeners.push(EventListener::new(&window, "blur", move |_| {
        h.borrow_mut().engine.release_input();
    })?);

    let h = Rc::clone(host);
    listeners.push(EventListener::new(&window, "keydown", move |e| {
        if let Some(e) = e.dyn_ref::<KeyboardEvent>() {
            h.borrow_mut().input(InputEvent::KeyDown { key: e.key() });
        }
    })?);

    let h = Rc::clone(host);
    listeners.push(EventListener::new(button.as_ref(), "click", move |_| {
        let mut host = h.borrow_mut();
        host.engine.toggle_view();
        host.sync_reset_timeout();
    })?);

    Ok(listeners)
}

/// Give the host its reset timeout: on expiry, run one update so the
/// reset fires even when no frame is drawn.
fn install_reset_timeout(host: &Rc<RefCell<Host>>) {
    let weak = Rc::downgrade(host);
    let callback = Closure::<dyn FnMut()>::new(move || {
        let Some(host) = weak.upgrade() else {
            return;
        };
        // Inside a frame or listener the frame path already handles it.
        let Ok(mut host) = host.try_borrow_mut() else {
            return;
        };
        if let Some(timeout) = &mut host.reset_timeout {
            timeout.armed = None;
        }
        if host.running {
            host.engine.update();
            host.sync_reset_timeout();
        }
    });
    host.borrow_mut().reset_timeout = Some(ResetTimeout {
        callback,
        armed: None,
    });
}

fn start_frame_loop(host: &Rc<RefCell<Host>>) {
    let slot: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
        Rc::new(RefCell::new(None));
    let next = Rc::clone(&slot);
    let weak = Rc::downgrade(host);
    *slot.borrow_mut() = Some(Closure::new(move || {
        let Some(host) = weak.upgrade() else {
            // host dropped: break the closure's self-reference
            let _ = next.borrow_mut().take();
            return;
        };
        let mut host = host.borrow_mut();
        if !host.running {
            let _ = next.borrow_mut().take();
            return;
        }
        host.frame();
        if let (Some(window), Some(callback)) =
            (web_sys::window(), next.borrow().as_ref())
        {
            let _ = window
                .request_animation_frame(callback.as_ref().unchecked_ref());
        }
    }));
    if let (Some(window), Some(callback)) = (web_sys::window(), slot.borrow().as_ref())
    {
        let _ = window.request_animation_frame(callback.as_ref().unchecked_ref());
    }
}

/// Start a storefront on `canvas`, optionally with TOML options.
///
/// # Errors
///
/// Rejects if the GPU context, shaders, or DOM elements cannot be created,
/// or if `options_toml` does not parse.
#[wasm_bindgen(js_name = "startStorefront")]
pub async fn start_storefront(
    canvas: HtmlCanvasElement,
    options_toml: Option<String>,
) -> Result<WebStorefront, JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let options = match options_toml {
        Some(text) => Options::from_toml(&text).map_err(js_err)?,
        None => Options::default(),
    };

    let window = web_sys::window().ok_or_else(|| js_err("no window"))?;
    let document = window.document().ok_or_else(|| js_err("no document"))?;
    let dpr = window.device_pixel_ratio();
    let width = ((f64::from(canvas.client_width()) * dpr) as u32).max(1);
    let height = ((f64::from(canvas.client_height()) * dpr) as u32).max(1);
    canvas.set_width(width);
    canvas.set_height(height);

    let mut engine = StorefrontEngine::new(
        wgpu::SurfaceTarget::Canvas(canvas.clone()),
        (width, height),
        dpr as f32,
        options,
        Box::new(FetchFetcher),
    )
    .await
    .map_err(js_err)?;
    engine.use_host_overlay();

    let parent: HtmlElement = match canvas.parent_element() {
        Some(parent) => parent.dyn_into()?,
        None => document.body().ok_or_else(|| js_err("no body"))?,
    };
    let overlay = DomOverlay::new(&document, &parent)?;
    let button = overlay.button.clone();

    let host = Rc::new(RefCell::new(Host {
        engine,
        overlay,
        canvas: canvas.clone(),
        running: true,
        reset_timeout: None,
    }));
    install_reset_timeout(&host);
    let listeners = attach_listeners(&host, &canvas, &button)?;
    start_frame_loop(&host);

    Ok(WebStorefront {
        host,
        _listeners: listeners,
    })
}
