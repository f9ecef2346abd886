//! Bounds culling for per-element rendering.

use crate::foundation::{
    core::{Point, Rect},
    math::sample_fractions,
};

/// Whether any part of `bounds` overlaps `visible`. Touching edges count as visible.
pub fn rect_visible(visible: Rect, bounds: Rect) -> bool {
    bounds.x0 <= visible.x1 && bounds.x1 >= visible.x0 && bounds.y0 <= visible.y1 && bounds.y1 >= visible.y0
}

pub fn point_visible(visible: Rect, p: Point) -> bool {
    p.x >= visible.x0 && p.x <= visible.x1 && p.y >= visible.y0 && p.y <= visible.y1
}

/// Whether an edge from `source` to `target` should be drawn.
///
/// The straight segment between the endpoints is probed at `samples` evenly spaced points;
/// the edge is culled only when none of them lies in `visible`. A single sample probes the
/// midpoint. Two samples reduce to the endpoint check.
pub fn edge_visible(visible: Rect, source: Point, target: Point, samples: usize) -> bool {
    sample_fractions(samples).any(|t| point_visible(visible, source.lerp(target, t)))
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/visibility.rs"]
mod tests;
