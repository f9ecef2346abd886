use std::cell::RefCell;

use super::*;
use crate::{
    foundation::{
        config::LayersConfig,
        core::{Point, Rgba8},
    },
    host::memory::{EdgeSpec, MemoryHost, NodeSpec},
    layers::{
        kind::{LayerKind, LayerOptions},
        stack::LayerStack,
    },
};

fn setup() -> (Rc<MemoryHost>, LayerStack) {
    let host = MemoryHost::new(100.0, 100.0);
    for (id, x, y) in [
        ("a", 10.0, 50.0),
        ("b", 90.0, 50.0),
        ("c", 500.0, 500.0),
        ("d", -200.0, 50.0),
        ("e", 300.0, 50.0),
    ] {
        host.add_node(NodeSpec::new(id, Point::new(x, y)));
    }
    host.add_edge(EdgeSpec::new("ab", "a", "b"));
    host.add_edge(EdgeSpec::new("ce", "c", "e"));
    host.add_edge(EdgeSpec::new("de", "d", "e"));
    let stack = LayerStack::with_config(host.clone(), LayersConfig::default()).unwrap();
    (host, stack)
}

fn drawn_with(stack: &LayerStack, opts: EdgeLayerOptions) -> Vec<String> {
    let layer = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = seen.clone();
    let r = render_per_edge(
        &layer,
        move |_, id, _| log.borrow_mut().push(id.to_string()),
        opts,
    )
    .unwrap();
    r.remove();
    layer.remove();
    seen.take()
}

fn all_edges() -> EdgeLayerOptions {
    EdgeLayerOptions::default().with_element(
        crate::elements::options::ElementLayerOptions::default()
            .with_selector(crate::host::Selector::All),
    )
}

#[test]
fn crossing_edge_is_kept_by_midpoint_sample() {
    let (_host, stack) = setup();
    assert_eq!(drawn_with(&stack, all_edges()), vec!["ab", "de"]);
    assert_eq!(drawn_with(&stack, all_edges().with_samples(2)), vec!["ab"]);
}

#[test]
fn zero_samples_are_rejected() {
    let (_host, stack) = setup();
    let layer = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let err = render_per_edge(&layer, |_, _, _| {}, all_edges().with_samples(0)).unwrap_err();
    assert!(matches!(err, LayersError::Validation(_)));
}

#[test]
fn edges_receive_host_path_and_draw() {
    let (_host, stack) = setup();
    let layer = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let _r = render_per_edge(
        &layer,
        |ctx, id, path| {
            if id.as_str() == "ab" {
                assert_eq!(path.elements().len(), 2);
                ctx.set_color(Rgba8::BLUE);
                ctx.stroke_path(path, 4.0);
            }
        },
        all_edges(),
    )
    .unwrap();
    let px = layer.pixels().unwrap();
    assert_eq!(px.pixel(50, 50), Some([0, 0, 255, 255]));
    assert_eq!(px.pixel(50, 20), Some([0, 0, 0, 0]));
}

#[test]
fn moving_an_endpoint_schedules_one_redraw() {
    let (host, stack) = setup();
    let layer = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let _r = render_per_edge(&layer, |_, _, _| {}, all_edges()).unwrap();
    assert!(!layer.has_pending_update());
    host.move_node(&"a".into(), Point::new(12.0, 50.0));
    host.move_node(&"b".into(), Point::new(88.0, 50.0));
    assert!(layer.has_pending_update());
    host.render();
    assert!(!layer.has_pending_update());
}

#[test]
fn non_canvas_layer_is_rejected() {
    let (_host, stack) = setup();
    let html = stack.append(LayerKind::Html, LayerOptions::default()).unwrap();
    assert!(render_per_edge(&html, |_, _, _| {}, EdgeLayerOptions::default()).is_err());
}
