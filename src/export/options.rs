use crate::foundation::core::Rgba8;

/// How an encoded export is handed back to the caller.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// `data:<mime>;base64,...`
    #[default]
    Base64Uri,
    /// Bare base64 payload.
    Base64,
    /// Raw encoded bytes.
    Blob,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Png,
    Jpeg,
}

impl ExportFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }
}

/// Options shared by native host export and composited export.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub output: OutputMode,
    pub format: ExportFormat,
    /// Background painted behind everything. `None` keeps transparency.
    pub bg: Option<Rgba8>,
    /// Export the whole graph instead of the current viewport.
    pub full: bool,
    pub scale: Option<f64>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    /// JPEG quality in `(0, 1]`.
    pub quality: f64,
    pub ignore_unsupported_layers: bool,
    pub ignore_unsupported_order: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output: OutputMode::Base64Uri,
            format: ExportFormat::Png,
            bg: None,
            full: false,
            scale: None,
            max_width: None,
            max_height: None,
            quality: 0.92,
            ignore_unsupported_layers: false,
            ignore_unsupported_order: false,
        }
    }
}

impl ExportOptions {
    pub fn png() -> Self {
        Self::default()
    }

    pub fn jpeg() -> Self {
        Self {
            format: ExportFormat::Jpeg,
            ..Self::default()
        }
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_bg(mut self, bg: Rgba8) -> Self {
        self.bg = Some(bg);
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    pub fn with_full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    pub fn ignoring_unsupported_layers(mut self) -> Self {
        self.ignore_unsupported_layers = true;
        self
    }

    pub fn ignoring_unsupported_order(mut self) -> Self {
        self.ignore_unsupported_order = true;
        self
    }
}
