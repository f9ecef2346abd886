/// Convenience result type used across the crate.
pub type LayersResult<T> = Result<T, LayersError>;

/// Top-level error taxonomy used by layer stack and export APIs.
#[derive(thiserror::Error, Debug)]
pub enum LayersError {
    /// Construction-time misconfiguration (headless host, invalid config values, destroyed stack).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Export requested while a layer that cannot rasterize is present.
    #[error("unsupported layer: {0}")]
    UnsupportedLayer(String),

    /// Export requested while the host layers are not one contiguous, canonical block.
    #[error("unsupported order: {0}")]
    UnsupportedOrder(String),

    /// Invalid caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while encoding an exported bitmap.
    #[error("encode error: {0}")]
    Encode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayersError {
    /// Build a [`LayersError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`LayersError::UnsupportedLayer`] value.
    pub fn unsupported_layer(msg: impl Into<String>) -> Self {
        Self::UnsupportedLayer(msg.into())
    }

    /// Build a [`LayersError::UnsupportedOrder`] value.
    pub fn unsupported_order(msg: impl Into<String>) -> Self {
        Self::UnsupportedOrder(msg.into())
    }

    /// Build a [`LayersError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayersError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`LayersError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
