use crate::{
    export::options::ExportOptions,
    foundation::core::{Affine, Rect, Vec2, Viewport},
    foundation::error::{LayersError, LayersResult},
};

/// Output geometry of one export call, shared read-only by every layer rendered into it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderHint {
    pub scale: f64,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    pub full: bool,
    /// Model-space region captured when `full` is set.
    pub bounds: Rect,
}

impl RenderHint {
    /// Resolve output size and scale.
    ///
    /// The base size is the viewport (or the graph bounds for `full`). An explicit `scale`
    /// wins; otherwise `max_width`/`max_height` shrink or grow the base to fit; otherwise 1.
    pub fn resolve(viewport: Viewport, full_bounds: Rect, opts: &ExportOptions) -> LayersResult<Self> {
        let (base_w, base_h) = if opts.full {
            (full_bounds.width(), full_bounds.height())
        } else {
            (viewport.width, viewport.height)
        };

        let scale = match (opts.scale, opts.max_width, opts.max_height) {
            (Some(s), _, _) => s,
            (None, None, None) => 1.0,
            (None, mw, mh) => {
                let rw = mw.filter(|_| base_w > 0.0).map(|w| w / base_w);
                let rh = mh.filter(|_| base_h > 0.0).map(|h| h / base_h);
                match (rw, rh) {
                    (Some(a), Some(b)) => a.min(b),
                    (Some(a), None) | (None, Some(a)) => a,
                    (None, None) => 1.0,
                }
            }
        };
        if !scale.is_finite() || scale <= 0.0 {
            return Err(LayersError::validation(format!(
                "export scale must be finite and > 0, got {scale}"
            )));
        }

        let width = (base_w * scale).ceil();
        let height = (base_h * scale).ceil();
        if !(width >= 1.0 && height >= 1.0) {
            return Err(LayersError::validation(format!(
                "export size is empty ({width}x{height})"
            )));
        }
        if width > f64::from(u16::MAX) || height > f64::from(u16::MAX) {
            return Err(LayersError::validation(format!(
                "export size {width}x{height} exceeds the raster limit"
            )));
        }

        Ok(Self {
            scale,
            width: width as u32,
            height: height as u32,
            full: opts.full,
            bounds: full_bounds,
        })
    }

    /// Model-to-output affine for layers that track the viewport.
    pub fn model_transform(&self, viewport: Viewport) -> Affine {
        if self.full {
            Affine::scale(self.scale) * Affine::translate(Vec2::new(-self.bounds.x0, -self.bounds.y0))
        } else {
            Affine::scale(self.scale) * viewport.transform().to_affine()
        }
    }

    /// Frame-to-output affine for static layers.
    pub fn frame_transform(&self) -> Affine {
        Affine::scale(self.scale)
    }

    /// Model-space region covered by the output.
    pub fn visible_bounds(&self, viewport: Viewport) -> Rect {
        if self.full {
            self.bounds
        } else {
            viewport.visible_bounds()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/hint.rs"]
mod tests;
