use std::{cell::RefCell, rc::Rc};

use crate::{
    elements::{
        Collection, ElementRender, RenderParts, Tracked, finish, options::NodeLayerOptions,
    },
    foundation::core::{ElementId, Rect, Vec2},
    foundation::error::{LayersError, LayersResult},
    layers::layer::Layer,
    platform::{dom::Element, draw::DrawContext},
    reconcile::{apply::NodeBinder, plan::ReconcileMode, visibility::rect_visible},
};

/// Draw every tracked node on a canvas layer.
///
/// `render` runs once per node with the context translated to the node's bounding-box
/// origin, so it draws in node-local model coordinates.
pub fn render_per_node(
    layer: &Layer,
    mut render: impl FnMut(&mut DrawContext<'_>, &ElementId, Rect) + 'static,
    opts: NodeLayerOptions,
) -> LayersResult<ElementRender> {
    if !layer.kind().is_canvas() {
        return Err(LayersError::validation(format!(
            "per-node drawing needs a canvas layer, not '{}'",
            layer.kind()
        )));
    }
    let host = layer.attached_stack()?.host();
    let tracked = Rc::new(Tracked::new(host.as_ref(), Collection::Nodes, &opts.element));

    let weak_host = Rc::downgrade(&host);
    let pass = tracked.clone();
    let check_bounds = opts.element.check_bounds;
    let bb_opts = opts.bounding_box;
    let callback = layer.on_draw(move |ctx: &mut DrawContext<'_>| {
        let Some(host) = weak_host.upgrade() else {
            return;
        };
        let visible = ctx.visible_bounds();
        for id in pass.current(host.as_ref(), Collection::Nodes) {
            let Some(bb) = host.bounding_box(&id, bb_opts) else {
                continue;
            };
            if check_bounds && !rect_visible(visible, bb) {
                continue;
            }
            ctx.save();
            ctx.translate(Vec2::new(bb.x0, bb.y0));
            render(ctx, &id, bb);
            ctx.restore();
        }
    })?;

    Ok(finish(
        RenderParts {
            layer: layer.clone(),
            host,
            collection: Collection::Nodes,
            tracked,
            callback,
            binder: None,
        },
        &opts.element,
    ))
}

/// Keep one child element per tracked node under an SVG or HTML layer.
///
/// New children are `g` groups on SVG layers and absolutely positioned `div`s on HTML
/// layers; `init` runs once on each. Before every `render` call the child is translated to
/// the node's bounding-box origin. Nodes outside the visible region get no child.
pub fn render_per_node_dom(
    layer: &Layer,
    mut init: impl FnMut(&Element, &ElementId, Rect) + 'static,
    mut render: impl FnMut(&Element, &ElementId, Rect) + 'static,
    opts: NodeLayerOptions,
) -> LayersResult<ElementRender> {
    let kind = layer.kind();
    if !kind.is_dom() {
        return Err(LayersError::validation(format!(
            "per-node elements need an svg or html layer, not '{kind}'"
        )));
    }
    let stack = layer.attached_stack()?;
    let host = stack.host();
    let tracked = Rc::new(Tracked::new(host.as_ref(), Collection::Nodes, &opts.element));
    let mode = if opts.unique_elements {
        ReconcileMode::Keyed
    } else {
        ReconcileMode::Positional
    };
    let binder = Rc::new(RefCell::new(NodeBinder::new(mode)));

    let weak_host = Rc::downgrade(&host);
    let pass = tracked.clone();
    let pass_binder = binder.clone();
    let check_bounds = opts.element.check_bounds;
    let bb_opts = opts.bounding_box;
    let svg = kind.is_svg();
    let callback = layer.on_update(move |root: &Element| {
        let Some(host) = weak_host.upgrade() else {
            return;
        };
        let visible = host.viewport().visible_bounds();
        let items: Vec<(ElementId, Rect)> = pass
            .current(host.as_ref(), Collection::Nodes)
            .into_iter()
            .filter_map(|id| host.bounding_box(&id, bb_opts).map(|bb| (id, bb)))
            .filter(|(_, bb)| !check_bounds || rect_visible(visible, *bb))
            .collect();

        pass_binder.borrow_mut().sync(
            root,
            &items,
            |id, bb| {
                let el = if svg {
                    Element::svg("g")
                } else {
                    let div = Element::html("div");
                    div.set_style("position", "absolute");
                    div
                };
                init(&el, id, *bb);
                el
            },
            |el, id, bb, _| {
                if svg {
                    el.set_attribute("transform", format!("translate({},{})", bb.x0, bb.y0));
                } else {
                    el.set_style("transform", format!("translate({}px,{}px)", bb.x0, bb.y0));
                }
                render(el, id, *bb);
            },
        );
    })?;

    Ok(finish(
        RenderParts {
            layer: layer.clone(),
            host,
            collection: Collection::Nodes,
            tracked,
            callback,
            binder: Some(binder),
        },
        &opts.element,
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/elements/nodes.rs"]
mod tests;
