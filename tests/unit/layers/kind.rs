use super::*;

#[test]
fn names_round_trip_through_from_str() {
    for kind in LayerKind::CUSTOM.iter().chain(LayerKind::HOST.iter()) {
        assert_eq!(kind.as_str().parse::<LayerKind>().unwrap(), *kind);
    }
    assert!("webgl".parse::<LayerKind>().is_err());
}

#[test]
fn classification() {
    assert!(LayerKind::SelectBox.is_host());
    assert!(!LayerKind::Canvas.is_host());
    assert!(LayerKind::HtmlStatic.is_static() && LayerKind::HtmlStatic.is_dom());
    assert!(LayerKind::CanvasStatic.is_canvas() && !LayerKind::CanvasStatic.is_dom());
    assert!(!LayerKind::Svg.is_static());
}

#[test]
fn serde_uses_kebab_names() {
    let s = serde_json::to_string(&LayerKind::SvgStatic).unwrap();
    assert_eq!(s, "\"svg-static\"");
    let opts: LayerOptions = serde_json::from_str(r#"{"stop_clicks": true}"#).unwrap();
    assert!(opts.stop_clicks);
    assert_eq!(opts.pixel_ratio, None);
    assert!(!opts.update_on_render);
}
