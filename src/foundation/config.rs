use crate::foundation::error::{LayersError, LayersResult};

/// Environment variable overriding [`LayersConfig::pixel_ratio`].
pub const PIXEL_RATIO_ENV: &str = "GRAPH_LAYERS_PIXEL_RATIO";
/// Environment variable overriding [`LayersConfig::edge_samples`].
pub const EDGE_SAMPLES_ENV: &str = "GRAPH_LAYERS_EDGE_SAMPLES";

/// Stack-wide defaults.
///
/// Layer options and element helper options fall back to these values when they leave a
/// setting unspecified.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    /// Device pixel ratio used to size raster backing stores.
    pub pixel_ratio: f64,
    /// Number of points sampled along an edge when checking whether it is on screen.
    pub edge_samples: usize,
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            pixel_ratio: 1.0,
            edge_samples: 3,
        }
    }
}

impl LayersConfig {
    /// Defaults with environment overrides applied. Unparsable or non-positive values are ignored.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(ratio) = std::env::var(PIXEL_RATIO_ENV)
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r > 0.0)
        {
            cfg.pixel_ratio = ratio;
        }
        if let Some(samples) = std::env::var(EDGE_SAMPLES_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
        {
            cfg.edge_samples = samples;
        }
        cfg
    }

    pub fn from_json(s: &str) -> LayersResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| LayersError::serde(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> LayersResult<()> {
        if !self.pixel_ratio.is_finite() || self.pixel_ratio <= 0.0 {
            return Err(LayersError::configuration(
                "pixel_ratio must be finite and > 0",
            ));
        }
        if self.edge_samples == 0 {
            return Err(LayersError::configuration("edge_samples must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
