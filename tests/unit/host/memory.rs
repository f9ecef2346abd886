use std::cell::Cell;

use super::*;

fn sample() -> Rc<MemoryHost> {
    let host = MemoryHost::new(100.0, 100.0);
    host.add_node(NodeSpec::new("a", Point::new(10.0, 10.0)).with_class("hub"));
    host.add_node(
        NodeSpec::new("b", Point::new(60.0, 60.0))
            .with_size(Size::new(20.0, 10.0))
            .with_label(Size::new(40.0, 8.0)),
    );
    host.add_edge(EdgeSpec::new("ab", "a", "b").with_width(2.0));
    host
}

#[test]
fn surface_holds_host_canvases_in_canonical_order() {
    let host = sample();
    let s = host.surface().unwrap();
    let kids = s.container.children();
    assert_eq!(kids.len(), 3);
    assert!(kids[0].ptr_eq(&s.node));
    assert!(kids[1].ptr_eq(&s.drag));
    assert!(kids[2].ptr_eq(&s.select_box));
    assert!(MemoryHost::headless(10.0, 10.0).surface().is_none());
}

#[test]
fn selectors_filter_elements() {
    let host = sample();
    assert_eq!(host.nodes(&Selector::All).len(), 2);
    assert_eq!(
        host.nodes(&Selector::Class("hub".into())),
        vec![ElementId::from("a")]
    );
    host.set_node_visible(&ElementId::from("b"), false);
    assert_eq!(host.nodes(&Selector::Visible), vec![ElementId::from("a")]);
    assert!(host.edges(&Selector::Visible).is_empty());
    assert_eq!(host.edges(&Selector::All).len(), 1);
    assert_eq!(
        host.nodes(&Selector::Ids(vec!["b".into()])),
        vec![ElementId::from("b")]
    );
}

#[test]
fn bounding_box_flags_control_labels_and_overlays() {
    let host = sample();
    let b = ElementId::from("b");
    let no_labels = BoundingBoxOptions {
        include_labels: false,
        include_overlays: false,
    };
    assert_eq!(
        host.bounding_box(&b, no_labels),
        Some(Rect::new(50.0, 55.0, 70.0, 65.0))
    );
    assert_eq!(
        host.bounding_box(&b, BoundingBoxOptions::default()),
        Some(Rect::new(40.0, 55.0, 80.0, 73.0))
    );
    assert_eq!(
        host.bounding_box(&ElementId::from("ab"), no_labels),
        Some(Rect::new(9.0, 9.0, 61.0, 61.0))
    );
    assert_eq!(
        host.endpoints(&ElementId::from("ab")),
        Some((Point::new(10.0, 10.0), Point::new(60.0, 60.0)))
    );
    assert!(host.endpoints(&ElementId::from("a")).is_none());
}

#[test]
fn removing_a_node_drops_incident_edges_and_notifies() {
    let host = sample();
    let removed = Rc::new(RefCell::new(Vec::new()));
    let r = removed.clone();
    let _sub = host.subscribe(
        EventKind::Remove,
        Rc::new(move |ev: &HostEvent| {
            if let HostEvent::Remove(ids) = ev {
                r.borrow_mut().extend(ids.iter().cloned());
            }
        }),
    );
    assert!(host.remove_element(&ElementId::from("a")));
    assert_eq!(
        *removed.borrow(),
        vec![ElementId::from("a"), ElementId::from("ab")]
    );
    assert!(!host.contains(&ElementId::from("ab")));
    assert!(!host.remove_element(&ElementId::from("a")));
}

#[test]
fn destroy_emits_once_and_silences_render() {
    let host = sample();
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    let _d = host.subscribe(EventKind::Destroy, Rc::new(move |_: &HostEvent| c.set(c.get() + 1)));
    let renders = Rc::new(Cell::new(0));
    let r = renders.clone();
    let _r = host.subscribe(EventKind::Render, Rc::new(move |_: &HostEvent| r.set(r.get() + 1)));
    host.destroy();
    host.destroy();
    host.render();
    assert_eq!(count.get(), 1);
    assert_eq!(renders.get(), 0);
    assert!(host.is_destroyed());
}

#[test]
fn native_export_draws_nodes_under_viewport() {
    let host = MemoryHost::new(40.0, 40.0);
    host.add_node(
        NodeSpec::new("n", Point::new(10.0, 10.0))
            .with_size(Size::new(10.0, 10.0))
            .with_color(Rgba8::RED),
    );
    let bmp = host.export_native(&ExportOptions::default()).unwrap();
    assert_eq!((bmp.width, bmp.height), (40, 40));
    assert_eq!(bmp.pixel(10, 10), Some([255, 0, 0, 255]));
    assert_eq!(bmp.pixel(30, 30), Some([0, 0, 0, 0]));

    host.set_viewport(Vec2::new(20.0, 0.0), 1.0);
    let bmp = host
        .export_native(&ExportOptions::default().with_bg(Rgba8::WHITE))
        .unwrap();
    assert_eq!(bmp.pixel(30, 10), Some([255, 0, 0, 255]));
    assert_eq!(bmp.pixel(5, 30), Some([255, 255, 255, 255]));
}

#[test]
fn full_bounds_covers_visible_elements() {
    let host = sample();
    assert_eq!(host.full_bounds(), Rect::new(-5.0, -5.0, 80.0, 73.0));
    assert_eq!(MemoryHost::new(1.0, 1.0).full_bounds(), Rect::ZERO);
}

#[test]
fn loads_graph_from_json() {
    let host = MemoryHost::from_json(
        r#"{
            "width": 50, "height": 40, "zoom": 2,
            "nodes": [{"id": "x", "position": {"x": 1, "y": 2}}],
            "edges": []
        }"#,
    )
    .unwrap();
    let vp = host.viewport();
    assert_eq!((vp.width, vp.height, vp.zoom), (50.0, 40.0, 2.0));
    assert_eq!(host.position(&ElementId::from("x")), Some(Point::new(1.0, 2.0)));
    assert!(MemoryHost::from_json("{").is_err());
}
