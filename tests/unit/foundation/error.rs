use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        LayersError::configuration("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        LayersError::unsupported_layer("x")
            .to_string()
            .contains("unsupported layer:")
    );
    assert!(
        LayersError::unsupported_order("x")
            .to_string()
            .contains("unsupported order:")
    );
    assert!(
        LayersError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(LayersError::encode("x").to_string().contains("encode error:"));
    assert!(
        LayersError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = LayersError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
