use super::*;

#[test]
fn json_fills_missing_fields_with_defaults() {
    let cfg = LayersConfig::from_json(r#"{"pixel_ratio": 2.0}"#).unwrap();
    assert_eq!(cfg.pixel_ratio, 2.0);
    assert_eq!(cfg.edge_samples, LayersConfig::default().edge_samples);
}

#[test]
fn json_rejects_invalid_values() {
    let err = LayersConfig::from_json(r#"{"pixel_ratio": 0.0}"#).unwrap_err();
    assert!(matches!(err, LayersError::Configuration(_)));

    let err = LayersConfig::from_json(r#"{"edge_samples": 0}"#).unwrap_err();
    assert!(matches!(err, LayersError::Configuration(_)));
}

#[test]
fn malformed_json_is_a_serde_error() {
    let err = LayersConfig::from_json("{").unwrap_err();
    assert!(matches!(err, LayersError::Serde(_)));
}

#[test]
fn defaults_validate() {
    LayersConfig::default().validate().unwrap();
    LayersConfig::from_env().validate().unwrap();
}
