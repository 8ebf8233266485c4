use std::path::Path;

use bt_core::{ConfigError, Error, Point};
use serde::{Deserialize, Serialize};

/// Pixels moved per scroll unit at zoom 1.
const SCROLL_UNIT_PX: f32 = 50.0;

/// Persisted state of the image viewer: the two reference points and the
/// zoom/scroll position.
///
/// Stored as
/// `{"AnnotatedImage": {"points": [{x, y}, ...]}, "ZoomableImage": {"zoom", "scroll_x", "scroll_y"}}`.
/// Missing sections fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerSettings {
    #[serde(rename = "AnnotatedImage")]
    pub annotation: AnnotationSettings,
    #[serde(rename = "ZoomableImage")]
    pub view: ViewSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationSettings {
    pub points: Vec<Point>,
}

impl Default for AnnotationSettings {
    fn default() -> Self {
        Self {
            points: vec![Point::new(50.0, 50.0), Point::new(70.0, 50.0)],
        }
    }
}

/// Zoom factor and scroll offsets; offsets are fractions of the image size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub zoom: u32,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            zoom: 1,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

/// Canvas and image extents in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub canvas_w: usize,
    pub canvas_h: usize,
    pub image_w: usize,
    pub image_h: usize,
}

impl ViewSettings {
    fn zoom_f(&self) -> f32 {
        self.zoom.max(1) as f32
    }

    /// Visible fraction of the image width and height.
    pub fn visible_fraction(&self, vp: &Viewport) -> (f32, f32) {
        let z = self.zoom_f();
        (
            vp.canvas_w as f32 / vp.image_w.max(1) as f32 / z,
            vp.canvas_h as f32 / vp.image_h.max(1) as f32 / z,
        )
    }

    /// Keep each offset in `[0, 1 - visible_fraction]`.
    ///
    /// The lower bound is applied first, so a canvas larger than the image
    /// ends up with a negative offset.
    pub fn clamp_scroll(&mut self, vp: &Viewport) {
        let (fw, fh) = self.visible_fraction(vp);
        self.scroll_x = self.scroll_x.max(0.0).min(1.0 - fw);
        self.scroll_y = self.scroll_y.max(0.0).min(1.0 - fh);
    }

    /// Scroll by whole visible pages, then clamp.
    pub fn scroll_pages(&mut self, dx: i32, dy: i32, vp: &Viewport) {
        let (fw, fh) = self.visible_fraction(vp);
        self.scroll_x += dx as f32 * fw;
        self.scroll_y += dy as f32 * fh;
        self.clamp_scroll(vp);
    }

    /// Scroll by fixed pixel steps (smaller when zoomed in), then clamp.
    pub fn scroll_units(&mut self, dx: f32, dy: f32, vp: &Viewport) {
        let z = self.zoom_f();
        self.scroll_x += dx * SCROLL_UNIT_PX / z / vp.image_w.max(1) as f32;
        self.scroll_y += dy * SCROLL_UNIT_PX / z / vp.image_h.max(1) as f32;
        self.clamp_scroll(vp);
    }

    /// Source rectangle `(x, y, w, h)` in image pixels shown on the canvas.
    pub fn source_rect(&self, vp: &Viewport) -> (usize, usize, usize, usize) {
        let zoom = self.zoom.max(1) as usize;
        let x = (self.scroll_x * vp.image_w as f32).max(0.0) as usize;
        let y = (self.scroll_y * vp.image_h as f32).max(0.0) as usize;
        (x, y, vp.canvas_w / zoom, vp.canvas_h / zoom)
    }
}

impl ViewerSettings {
    pub fn from_json_str(s: &str) -> Result<Self, Error> {
        serde_json::from_str(s).map_err(|e| ConfigError::Document(e.to_string()).into())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Document(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        let text = self
            .to_json_string()
            .map_err(|e| ConfigError::Document(format!("{}: {e}", path.display())))?;
        std::fs::write(path, text)
            .map_err(|e| ConfigError::Document(format!("{}: {e}", path.display())).into())
    }

    /// Reference points in image coordinates.
    pub fn endpoints(&self) -> &[Point] {
        &self.annotation.points
    }

    pub fn set_endpoints(&mut self, p0: Point, p1: Point) {
        self.annotation.points = vec![p0, p1];
    }
}
