use std::rc::Rc;

use crate::{
    elements::{
        Collection, ElementRender, RenderParts, Tracked, finish, options::EdgeLayerOptions,
    },
    foundation::core::{BezPath, ElementId},
    foundation::error::{LayersError, LayersResult},
    layers::layer::Layer,
    platform::draw::DrawContext,
    reconcile::visibility::edge_visible,
};

/// Draw every tracked edge on a canvas layer.
///
/// `render` receives the host's path for the edge, or a straight segment between its
/// endpoints when the host has none. With bounds checking on, an edge is skipped only when
/// no sampled point along it is visible.
pub fn render_per_edge(
    layer: &Layer,
    mut render: impl FnMut(&mut DrawContext<'_>, &ElementId, &BezPath) + 'static,
    opts: EdgeLayerOptions,
) -> LayersResult<ElementRender> {
    if !layer.kind().is_canvas() {
        return Err(LayersError::validation(format!(
            "per-edge drawing needs a canvas layer, not '{}'",
            layer.kind()
        )));
    }
    let stack = layer.attached_stack()?;
    let samples = opts.samples.unwrap_or(stack.config().edge_samples);
    if samples == 0 {
        return Err(LayersError::validation("edge samples must be >= 1"));
    }
    let host = stack.host();
    let tracked = Rc::new(Tracked::new(host.as_ref(), Collection::Edges, &opts.element));

    let weak_host = Rc::downgrade(&host);
    let pass = tracked.clone();
    let check_bounds = opts.element.check_bounds;
    let callback = layer.on_draw(move |ctx: &mut DrawContext<'_>| {
        let Some(host) = weak_host.upgrade() else {
            return;
        };
        let visible = ctx.visible_bounds();
        for id in pass.current(host.as_ref(), Collection::Edges) {
            let Some((source, target)) = host.endpoints(&id) else {
                continue;
            };
            if check_bounds && !edge_visible(visible, source, target, samples) {
                continue;
            }
            let path = host.edge_path(&id).unwrap_or_else(|| {
                let mut p = BezPath::new();
                p.move_to(source);
                p.line_to(target);
                p
            });
            ctx.save();
            render(ctx, &id, &path);
            ctx.restore();
        }
    })?;

    Ok(finish(
        RenderParts {
            layer: layer.clone(),
            host,
            collection: Collection::Edges,
            tracked,
            callback,
            binder: None,
        },
        &opts.element,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/elements/edges.rs"]
mod tests;
