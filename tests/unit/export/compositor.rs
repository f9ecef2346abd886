use std::rc::Rc;

use super::*;
use crate::{
    foundation::{
        config::LayersConfig,
        core::{Point, Rect, Rgba8, Size},
    },
    host::{
        Host,
        memory::{MemoryHost, NodeSpec},
    },
    layers::kind::LayerOptions,
};

fn stack() -> (Rc<MemoryHost>, LayerStack) {
    let host = MemoryHost::new(40.0, 40.0);
    host.add_node(NodeSpec::new("n", Point::new(20.0, 20.0)).with_size(Size::new(10.0, 10.0)));
    let stack = LayerStack::with_config(host.clone(), LayersConfig::default()).unwrap();
    (host, stack)
}

#[test]
fn fresh_stack_has_canonical_host_order() {
    let (_host, stack) = stack();
    assert!(check_host_order(&stack.layers()).is_ok());
    let p = partition(&stack.layers());
    assert!(p.before.is_empty() && p.after.is_empty());
}

#[test]
fn layer_between_host_layers_breaks_order() {
    let (_host, stack) = stack();
    let drag = stack.drag_layer().unwrap();
    drag.insert_before(LayerKind::Canvas, LayerOptions::default())
        .unwrap();
    let err = check_host_order(&stack.layers()).unwrap_err();
    assert!(matches!(err, LayersError::UnsupportedOrder(_)));
    assert!(err.to_string().contains("canvas"));
}

#[test]
fn partition_splits_at_first_host_layer_and_skips_hidden() {
    let (_host, stack) = stack();
    let node = stack.node_layer().unwrap();
    let a = node.insert_before(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let b = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let hidden = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    hidden.hide();
    let p = partition(&stack.layers());
    assert_eq!(p.before, vec![a]);
    assert_eq!(p.after, vec![b]);
}

#[test]
fn canvas_after_host_paints_over_it() {
    let (_host, stack) = stack();
    let top = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    top.on_draw(|ctx| {
        ctx.set_color(Rgba8::BLUE);
        ctx.fill_rect(Rect::new(0.0, 0.0, 18.0, 40.0));
    })
    .unwrap();
    let out = stack.to_raster(&ExportOptions::png()).unwrap();
    assert_eq!((out.width, out.height), (40, 40));
    // node body spans 15..25; left part is covered
    assert_eq!(out.pixel(16, 20), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(22, 20), Some([153, 153, 153, 255]));
    assert_eq!(out.pixel(30, 5), Some([0, 0, 0, 0]));
}

fn paint(layer: &Layer, color: Rgba8, rect: Rect) {
    layer
        .on_draw(move |ctx| {
            ctx.set_color(color);
            ctx.fill_rect(rect);
        })
        .unwrap();
}

#[test]
fn upper_layer_wins_below_the_host_block() {
    let (_host, stack) = stack();
    let node = stack.node_layer().unwrap();
    let lower = node.insert_before(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let upper = node.insert_before(LayerKind::Canvas, LayerOptions::default()).unwrap();
    assert_eq!(partition(&stack.layers()).before, vec![lower.clone(), upper.clone()]);
    paint(&lower, Rgba8::GREEN, Rect::new(0.0, 0.0, 40.0, 40.0));
    paint(&upper, Rgba8::BLUE, Rect::new(0.0, 0.0, 10.0, 40.0));

    let out = stack.to_raster(&ExportOptions::png()).unwrap();
    assert_eq!(out.pixel(5, 5), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(30, 5), Some([0, 255, 0, 255]));
    // the host still sits on top of both
    assert_eq!(out.pixel(20, 20), Some([153, 153, 153, 255]));
}

#[test]
fn upper_layer_wins_above_the_host_block() {
    let (_host, stack) = stack();
    let lower = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    let upper = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    paint(&lower, Rgba8::RED, Rect::new(0.0, 0.0, 40.0, 40.0));
    paint(&upper, Rgba8::BLUE, Rect::new(0.0, 0.0, 10.0, 40.0));

    let out = stack.to_raster(&ExportOptions::png()).unwrap();
    assert_eq!(out.pixel(5, 5), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(30, 5), Some([255, 0, 0, 255]));
    assert_eq!(out.pixel(20, 20), Some([255, 0, 0, 255]));
}

#[test]
fn background_goes_behind_everything() {
    let (_host, stack) = stack();
    let top = stack.append(LayerKind::Canvas, LayerOptions::default()).unwrap();
    top.on_draw(|ctx| {
        ctx.set_color(Rgba8::BLUE);
        ctx.fill_rect(Rect::new(0.0, 0.0, 5.0, 5.0));
    })
    .unwrap();
    let out = stack
        .to_raster(&ExportOptions::png().with_bg(Rgba8::WHITE))
        .unwrap();
    assert_eq!(out.pixel(2, 2), Some([0, 0, 255, 255]));
    assert_eq!(out.pixel(35, 35), Some([255, 255, 255, 255]));
}

#[test]
fn empty_dom_layer_is_not_unsupported() {
    let (host, stack) = stack();
    stack.append(LayerKind::Svg, LayerOptions::default()).unwrap();
    let ours = stack.to_raster(&ExportOptions::png()).unwrap();
    let native = host.export_native(&ExportOptions::png()).unwrap();
    assert_eq!(ours, native);
}

#[test]
fn static_dom_layer_is_unsupported_even_when_empty() {
    let (host, stack) = stack();
    for kind in [LayerKind::SvgStatic, LayerKind::HtmlStatic] {
        let layer = stack.append(kind, LayerOptions::default()).unwrap();
        assert!(!layer.supports_render(), "{kind}");
        let err = stack.to_raster(&ExportOptions::png()).unwrap_err();
        assert!(matches!(err, LayersError::UnsupportedLayer(_)), "{kind}");

        let ours = stack
            .to_raster(&ExportOptions::png().ignoring_unsupported_layers())
            .unwrap();
        assert_eq!(ours, host.export_native(&ExportOptions::png()).unwrap());
        stack.remove(&layer);
    }
}

#[test]
fn encoded_export_variants() {
    let (_host, stack) = stack();
    let png = stack.png(&ExportOptions::default()).unwrap();
    assert!(png.as_str().unwrap().starts_with("data:image/png;base64,"));
    let jpg = stack.jpg(&ExportOptions::default()).unwrap();
    assert!(jpg.as_str().unwrap().starts_with("data:image/jpeg;base64,"));

    let fut = stack.export_blob_async(&ExportOptions::png()).unwrap();
    let blob = pollster::block_on(fut).unwrap();
    assert!(matches!(blob, ExportOutput::Blob { mime: "image/png", .. }));
}
