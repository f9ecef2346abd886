use kurbo::PathEl;

use crate::{
    foundation::core::{Affine, BezPath, Point, Rect, Rgba8, Vec2},
    foundation::error::{LayersError, LayersResult},
    platform::bitmap::{Bitmap, clear_pixmap},
};

/// 2D drawing context handed to raster layer callbacks.
///
/// Callbacks draw in model coordinates; the layer's device transform (pixel ratio, pan, zoom)
/// is applied underneath the local transform set through this context.
pub struct DrawContext<'a> {
    ctx: &'a mut vello_cpu::RenderContext,
    base: Affine,
    local: Affine,
    saved: Vec<Affine>,
    visible: Rect,
    color: Rgba8,
}

impl<'a> DrawContext<'a> {
    pub(crate) fn new(ctx: &'a mut vello_cpu::RenderContext, base: Affine, visible: Rect) -> Self {
        Self {
            ctx,
            base,
            local: Affine::IDENTITY,
            saved: Vec::new(),
            visible,
            color: Rgba8::BLACK,
        }
    }

    /// Region of model space currently mapped onto the surface.
    pub fn visible_bounds(&self) -> Rect {
        self.visible
    }

    pub fn is_visible(&self, r: Rect) -> bool {
        let b = self.visible;
        r.x0 <= b.x1 && r.x1 >= b.x0 && r.y0 <= b.y1 && r.y1 >= b.y0
    }

    pub fn is_point_visible(&self, p: Point) -> bool {
        let b = self.visible;
        p.x >= b.x0 && p.x <= b.x1 && p.y >= b.y0 && p.y <= b.y1
    }

    /// Local transform relative to the layer's device transform.
    pub fn transform(&self) -> Affine {
        self.local
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.local = transform;
    }

    pub fn device_transform(&self) -> Affine {
        self.base * self.local
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.local *= Affine::translate(offset);
    }

    pub fn scale(&mut self, factor: f64) {
        self.local *= Affine::scale(factor);
    }

    pub fn save(&mut self) {
        self.saved.push(self.local);
    }

    pub fn restore(&mut self) {
        if let Some(t) = self.saved.pop() {
            self.local = t;
        }
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    pub fn fill_rect(&mut self, rect: Rect) {
        self.apply_state();
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    pub fn fill_path(&mut self, path: &BezPath) {
        self.apply_state();
        self.ctx.fill_path(&bezpath_to_cpu(path));
    }

    pub fn stroke_path(&mut self, path: &BezPath, width: f64) {
        self.apply_state();
        self.ctx.set_stroke(vello_cpu::kurbo::Stroke::new(width));
        self.ctx.stroke_path(&bezpath_to_cpu(path));
    }

    fn apply_state(&mut self) {
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_transform(affine_to_cpu(self.base * self.local));
        self.ctx.set_paint(color_to_cpu(self.color));
    }
}

/// Offscreen raster target sized in device pixels.
pub(crate) struct Canvas2d {
    pixmap: vello_cpu::Pixmap,
}

impl Canvas2d {
    pub(crate) fn new(width: u16, height: u16) -> Self {
        Self {
            pixmap: vello_cpu::Pixmap::new(width, height),
        }
    }

    pub(crate) fn width(&self) -> u16 {
        self.pixmap.width()
    }

    pub(crate) fn height(&self) -> u16 {
        self.pixmap.height()
    }

    pub(crate) fn clear(&mut self) {
        clear_pixmap(&mut self.pixmap);
    }

    /// Clear, then run `paint` against a fresh context and rasterize the result.
    pub(crate) fn paint<F>(&mut self, base: Affine, visible: Rect, paint: F)
    where
        F: FnOnce(&mut DrawContext<'_>),
    {
        self.clear();
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return;
        }
        let mut ctx = vello_cpu::RenderContext::new(w, h);
        {
            let mut draw = DrawContext::new(&mut ctx, base, visible);
            paint(&mut draw);
        }
        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
    }

    pub(crate) fn to_bitmap(&self) -> Bitmap {
        Bitmap::from_pixmap(&self.pixmap)
    }
}

pub(crate) fn checked_dims(width: u32, height: u32) -> LayersResult<(u16, u16)> {
    let w: u16 = width
        .try_into()
        .map_err(|_| LayersError::validation("surface width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| LayersError::validation("surface height exceeds u16"))?;
    Ok((w, h))
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/platform/draw.rs"]
mod tests;
