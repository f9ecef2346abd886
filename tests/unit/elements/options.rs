use super::*;

#[test]
fn auto_resolves_by_query_mode() {
    assert_eq!(UpdateOn::Auto.resolve(true), UpdateOn::Render);
    assert_eq!(UpdateOn::Auto.resolve(false), UpdateOn::Position);
    assert_eq!(UpdateOn::None.resolve(true), UpdateOn::None);
}

#[test]
fn node_defaults_exclude_labels_and_overlays() {
    let o = NodeLayerOptions::default();
    assert!(!o.bounding_box.include_labels);
    assert!(!o.bounding_box.include_overlays);
    assert!(o.element.check_bounds);
    assert_eq!(o.element.selector, Selector::Visible);
}

#[test]
fn flattened_json_fills_defaults() {
    let o: NodeLayerOptions =
        serde_json::from_str(r#"{"query_each_time": true, "unique_elements": true}"#).unwrap();
    assert!(o.element.query_each_time);
    assert!(o.unique_elements);
    assert!(o.element.check_bounds);

    let e: EdgeLayerOptions =
        serde_json::from_str(r#"{"update_on": "none", "samples": 5}"#).unwrap();
    assert_eq!(e.element.update_on, UpdateOn::None);
    assert_eq!(e.samples, Some(5));
}
