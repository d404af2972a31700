//! Wry webviews hosting the HTML toggle button and banner.
//!
//! Each overlay element gets its own child webview sized to its
//! [`OverlayLayout`] rectangle, so the 3D surface stays visible everywhere
//! else. Both load the embedded `assets/overlay/` page through a custom
//! `storefront://` protocol; the page reports button clicks over IPC.

use std::borrow::Cow;
use std::sync::mpsc;

use rust_embed::RustEmbed;
use wry::http::{header::CONTENT_TYPE, Response};
use wry::{dpi, Rect, WebView, WebViewBuilder};

use crate::store::{BannerKind, OverlayLayout, OverlayState, Storefront};

/// Embedded overlay page.
#[derive(RustEmbed)]
#[folder = "assets/overlay/"]
struct OverlayAssets;

/// Actions sent from the overlay page to the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayAction {
    /// The toggle button was clicked.
    ToggleView,
}

/// The two overlay webviews and their IPC channel.
pub struct HtmlOverlay {
    button: WebView,
    banner: WebView,
    action_rx: mpsc::Receiver<OverlayAction>,
    /// Last state pushed, to skip redundant script evaluation.
    shown: Option<(OverlayState, OverlayLayout)>,
}

impl HtmlOverlay {
    /// Create both webviews as children of `window` and show the current
    /// overlay state of `store`.
    ///
    /// # Errors
    ///
    /// Returns the wry error if either webview cannot be created.
    pub fn new<W: wry::raw_window_handle::HasWindowHandle>(
        window: &W,
        store: &Storefront,
    ) -> Result<Self, wry::Error> {
        #[cfg(target_os = "linux")]
        if let Err(e) = gtk::init() {
            log::warn!("gtk init failed: {e}");
        }

        let (tx, action_rx) = mpsc::channel();
        let layout = store.overlay_layout();
        let button = build_part(window, "button", layout.button, tx.clone())?;
        let banner = build_part(window, "banner", layout.banner, tx)?;

        let mut overlay = Self {
            button,
            banner,
            action_rx,
            shown: None,
        };
        overlay.sync(store);
        Ok(overlay)
    }

    /// Actions received since the last call.
    #[must_use]
    pub fn drain_actions(&self) -> Vec<OverlayAction> {
        self.action_rx.try_iter().collect()
    }

    /// Push label, banner text, and placement when they change.
    pub fn sync(&mut self, store: &Storefront) {
        #[cfg(target_os = "linux")]
        while gtk::events_pending() {
            let _ = gtk::main_iteration_do(false);
        }

        let state = store.overlay();
        let layout = store.overlay_layout();
        if self
            .shown
            .as_ref()
            .is_some_and(|(s, l)| *s == state && *l == layout)
        {
            return;
        }

        let _ = self.button.set_bounds(bounds(layout.button));
        let _ = self.banner.set_bounds(bounds(layout.banner));
        let _ = self.banner.set_visible(state.banner.is_some());

        let script =
            format!("window.__storefront_push({})", overlay_payload(&state));
        let _ = self.button.evaluate_script(&script);
        let _ = self.banner.evaluate_script(&script);
        self.shown = Some((state, layout));
    }
}

fn build_part<W: wry::raw_window_handle::HasWindowHandle>(
    window: &W,
    part: &str,
    rect: crate::store::Rect,
    tx: mpsc::Sender<OverlayAction>,
) -> Result<WebView, wry::Error> {
    WebViewBuilder::new()
        .with_bounds(bounds(rect))
        .with_transparent(true)
        .with_custom_protocol("storefront".into(), |_id, request| {
            let path = request.uri().path();
            let path = if path == "/" { "index.html" } else { &path[1..] };
            serve(path)
        })
        .with_url(format!("storefront://localhost/index.html?part={part}"))
        .with_ipc_handler(move |req| {
            if let Ok(msg) =
                serde_json::from_str::<serde_json::Value>(req.body())
            {
                if let Some(action) = parse_action(&msg) {
                    let _ = tx.send(action);
                }
            }
        })
        .build_as_child(window)
}

fn serve(path: &str) -> Response<Cow<'static, [u8]>> {
    match OverlayAssets::get(path) {
        Some(asset) => {
            let mime = mime_guess::from_path(path)
                .first_or_octet_stream()
                .to_string();
            Response::builder()
                .header(CONTENT_TYPE, mime)
                .body(Cow::from(asset.data.to_vec()))
                .unwrap_or_else(|_| Response::new(Cow::from(Vec::new())))
        }
        None => Response::builder()
            .status(404)
            .body(Cow::from(Vec::new()))
            .unwrap_or_else(|_| Response::new(Cow::from(Vec::new()))),
    }
}

/// Webview bounds for an overlay rectangle.
fn bounds(rect: crate::store::Rect) -> Rect {
    Rect {
        position: dpi::Position::Physical(dpi::PhysicalPosition::new(
            rect.x.round() as i32,
            rect.y.round() as i32,
        )),
        size: dpi::Size::Physical(dpi::PhysicalSize::new(
            rect.width.round().max(1.0) as u32,
            rect.height.round().max(1.0) as u32,
        )),
    }
}

/// JSON handed to `window.__storefront_push`.
fn overlay_payload(state: &OverlayState) -> serde_json::Value {
    let (banner, kind) = match &state.banner {
        Some(b) => (
            Some(b.text.as_str()),
            match b.kind {
                BannerKind::Info => "info",
                BannerKind::Error => "error",
            },
        ),
        None => (None, "info"),
    };
    serde_json::json!({
        "label": state.button_label,
        "banner": banner,
        "kind": kind,
    })
}

/// Parse an IPC message from the overlay page.
fn parse_action(msg: &serde_json::Value) -> Option<OverlayAction> {
    match msg.get("action")?.as_str()? {
        "toggle_view" => Some(OverlayAction::ToggleView),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Banner;

    #[test]
    fn parses_toggle_and_ignores_unknown() {
        let toggle = serde_json::json!({ "action": "toggle_view" });
        assert_eq!(parse_action(&toggle), Some(OverlayAction::ToggleView));
        let other = serde_json::json!({ "action": "load_file" });
        assert_eq!(parse_action(&other), None);
        assert_eq!(parse_action(&serde_json::json!({})), None);
    }

    #[test]
    fn payload_carries_label_and_banner() {
        let state = OverlayState {
            button_label: "Exit Market",
            banner: Some(Banner {
                text: "Failed to load a.glb".into(),
                kind: BannerKind::Error,
            }),
        };
        let payload = overlay_payload(&state);
        assert_eq!(payload["label"], "Exit Market");
        assert_eq!(payload["banner"], "Failed to load a.glb");
        assert_eq!(payload["kind"], "error");
    }

    #[test]
    fn overlay_page_is_embedded() {
        assert!(OverlayAssets::get("index.html").is_some());
    }
}
