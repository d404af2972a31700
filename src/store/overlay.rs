//! Immediate-mode description of the two overlays (toggle button and
//! banner) and their on-screen layout.
//!
//! Every host renders the same [`OverlayState`]: the browser as DOM
//! elements, the native viewer as GPU quads or an HTML webview.

use glam::Vec2;

/// Distance of the button from the bottom edge and of the banner from the
/// top edge, in logical pixels.
const EDGE_OFFSET: f32 = 64.0;
/// Button size in logical pixels.
const BUTTON_SIZE: Vec2 = Vec2::new(160.0, 40.0);
/// Banner height in logical pixels; its width follows the text.
const BANNER_HEIGHT: f32 = 40.0;
/// Approximate advance of one banner glyph plus horizontal padding.
const BANNER_CHAR_WIDTH: f32 = 9.0;
const BANNER_PADDING: f32 = 32.0;

/// Button fill (Tailwind blue-500).
pub const BUTTON_COLOR: [f32; 4] = [0.231, 0.510, 0.965, 1.0];
/// Button fill while hovered (Tailwind blue-600).
pub const BUTTON_HOVER_COLOR: [f32; 4] = [0.145, 0.388, 0.922, 1.0];
/// Info banner fill.
pub const BANNER_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
/// Error banner fill (Tailwind red-600).
pub const ERROR_COLOR: [f32; 4] = [0.863, 0.149, 0.149, 1.0];

/// Axis-aligned rectangle in physical pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Whether `point` lies inside (edges inclusive).
    #[must_use]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Banner flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    /// Selection popup.
    Info,
    /// Model load failure.
    Error,
}

/// A visible banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// Text to show.
    pub text: String,
    /// Styling.
    pub kind: BannerKind,
}

/// What the overlays should show this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayState {
    /// Toggle button label.
    pub button_label: &'static str,
    /// Banner, absent when there is nothing to say.
    pub banner: Option<Banner>,
}

impl OverlayState {
    /// Text mirrored to a native window title.
    #[must_use]
    pub fn title(&self, app: &str) -> String {
        match &self.banner {
            Some(banner) => format!("{app} | {} | {}", self.button_label, banner.text),
            None => format!("{app} | {}", self.button_label),
        }
    }
}

/// Placement of the overlays on a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    /// Toggle button, horizontally centred near the bottom.
    pub button: Rect,
    /// Banner, horizontally centred near the top.
    pub banner: Rect,
}

impl OverlayLayout {
    /// Lay out for a `size` surface at `scale` physical pixels per logical
    /// pixel, sizing the banner for `banner_text`.
    #[must_use]
    pub fn new(size: Vec2, scale: f32, banner_text: Option<&str>) -> Self {
        let button = BUTTON_SIZE * scale;
        let banner_width = banner_text.map_or(0.0, |text| {
            (text.chars().count() as f32).mul_add(BANNER_CHAR_WIDTH, BANNER_PADDING)
                * scale
        });
        Self {
            button: Rect {
                x: (size.x - button.x) * 0.5,
                y: EDGE_OFFSET.mul_add(-scale, size.y) - button.y,
                width: button.x,
                height: button.y,
            },
            banner: Rect {
                x: (size.x - banner_width) * 0.5,
                y: EDGE_OFFSET * scale,
                width: banner_width,
                height: BANNER_HEIGHT * scale,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_is_centred_above_bottom_edge() {
        let layout = OverlayLayout::new(Vec2::new(800.0, 600.0), 1.0, None);
        assert_eq!(layout.button.x, 320.0);
        assert_eq!(layout.button.y, 600.0 - 64.0 - 40.0);
        assert!(layout.button.contains(Vec2::new(400.0, 516.0)));
        assert!(!layout.button.contains(Vec2::new(400.0, 300.0)));
    }

    #[test]
    fn banner_grows_with_text_and_scale() {
        let short = OverlayLayout::new(Vec2::new(800.0, 600.0), 1.0, Some("A selected"));
        let long = OverlayLayout::new(
            Vec2::new(800.0, 600.0),
            1.0,
            Some("Shelf_Long_Name selected"),
        );
        assert!(long.banner.width > short.banner.width);
        assert_eq!(short.banner.y, 64.0);

        let hidpi = OverlayLayout::new(Vec2::new(1600.0, 1200.0), 2.0, None);
        assert_eq!(hidpi.button.width, 320.0);
        assert_eq!(hidpi.banner.width, 0.0);
    }

    #[test]
    fn title_mirrors_label_and_banner() {
        let state = OverlayState {
            button_label: "Enter Market",
            banner: Some(Banner {
                text: "Shelf_A selected".into(),
                kind: BannerKind::Info,
            }),
        };
        assert_eq!(state.title("Storefront"), "Storefront | Enter Market | Shelf_A selected");
    }
}
