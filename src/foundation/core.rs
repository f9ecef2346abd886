use std::fmt;

pub use kurbo::{Affine, BezPath, Point, Rect, Size, Vec2};

/// Identifier of a graph element (node or edge) as reported by the host.
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pan/zoom triple applied by tracking layers.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewTransform {
    pub tx: f64,
    pub ty: f64,
    pub zoom: f64,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        tx: 0.0,
        ty: 0.0,
        zoom: 1.0,
    };

    /// Model-to-screen affine: translate in un-zoomed units, then zoom.
    pub fn to_affine(self) -> Affine {
        Affine::translate(Vec2::new(self.tx, self.ty)) * Affine::scale(self.zoom)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Transform state of the host viewport: CSS pixel size, pan offset and zoom.
///
/// This is the single source of truth every layer synchronizes against. It is written only
/// by the layer stack in response to host viewport/resize notifications.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub pan: Vec2,
    pub zoom: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    pub fn transform(self) -> ViewTransform {
        ViewTransform {
            tx: self.pan.x,
            ty: self.pan.y,
            zoom: self.zoom,
        }
    }

    /// Device-pixel affine for a backing store at `pixel_ratio`.
    ///
    /// Order: pixel-ratio scale, then pan translate, then zoom scale.
    pub fn device_affine(self, pixel_ratio: f64) -> Affine {
        Affine::scale(pixel_ratio) * self.transform().to_affine()
    }

    /// Visible region in model coordinates.
    pub fn visible_bounds(self) -> Rect {
        let zoom = if self.zoom.abs() > f64::EPSILON {
            self.zoom
        } else {
            1.0
        };
        Rect::new(
            -self.pan.x / zoom,
            -self.pan.y / zoom,
            (self.width - self.pan.x) / zoom,
            (self.height - self.pan.y) / zoom,
        )
    }

    pub fn model_to_screen(self, p: Point) -> Point {
        self.transform().to_affine() * p
    }

    pub fn contains_point(self, p: Point) -> bool {
        let b = self.visible_bounds();
        p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
    }

    /// Whether `r` (model coordinates) overlaps the visible region.
    pub fn intersects(self, r: Rect) -> bool {
        let b = self.visible_bounds();
        r.x0 <= b.x1 && r.x1 >= b.x0 && r.y0 <= b.y1 && r.y1 >= b.y0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);
    pub const BLACK: Self = Self::new(0, 0, 0, 255);
    pub const WHITE: Self = Self::new(255, 255, 255, 255);
    pub const RED: Self = Self::new(255, 0, 0, 255);
    pub const GREEN: Self = Self::new(0, 255, 0, 255);
    pub const BLUE: Self = Self::new(0, 0, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiplied RGBA8 bytes (r,g,b multiplied by a).
    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
