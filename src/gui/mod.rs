//! Native-side GUI layer: wry webviews hosting the HTML overlays.
//!
//! The webviews are children of the winit window and report button clicks
//! through a minimal JSON IPC bridge.

/// Overlay webview creation, IPC handler, and state push helpers.
pub mod webview;
