use std::{fmt, str::FromStr};

use crate::foundation::error::LayersError;

/// Variant tag of a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayerKind {
    Canvas,
    CanvasStatic,
    Svg,
    SvgStatic,
    Html,
    HtmlStatic,
    /// Host node canvas.
    Node,
    /// Host drag canvas.
    Drag,
    /// Host select-box canvas.
    SelectBox,
}

impl LayerKind {
    /// Host layers in canonical paint order.
    pub const HOST: [LayerKind; 3] = [LayerKind::Node, LayerKind::Drag, LayerKind::SelectBox];

    pub const CUSTOM: [LayerKind; 6] = [
        LayerKind::Canvas,
        LayerKind::CanvasStatic,
        LayerKind::Svg,
        LayerKind::SvgStatic,
        LayerKind::Html,
        LayerKind::HtmlStatic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Canvas => "canvas",
            Self::CanvasStatic => "canvas-static",
            Self::Svg => "svg",
            Self::SvgStatic => "svg-static",
            Self::Html => "html",
            Self::HtmlStatic => "html-static",
            Self::Node => "node",
            Self::Drag => "drag",
            Self::SelectBox => "select-box",
        }
    }

    pub fn is_host(self) -> bool {
        matches!(self, Self::Node | Self::Drag | Self::SelectBox)
    }

    /// Static layers stay anchored to the viewport frame and ignore pan/zoom.
    pub fn is_static(self) -> bool {
        matches!(self, Self::CanvasStatic | Self::SvgStatic | Self::HtmlStatic)
    }

    pub fn is_canvas(self) -> bool {
        matches!(self, Self::Canvas | Self::CanvasStatic)
    }

    pub fn is_svg(self) -> bool {
        matches!(self, Self::Svg | Self::SvgStatic)
    }

    pub fn is_html(self) -> bool {
        matches!(self, Self::Html | Self::HtmlStatic)
    }

    pub fn is_dom(self) -> bool {
        self.is_svg() || self.is_html()
    }
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayerKind {
    type Err = LayersError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::CUSTOM
            .iter()
            .chain(Self::HOST.iter())
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| LayersError::validation(format!("unknown layer kind '{s}'")))
    }
}

/// Per-layer construction options.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    /// Stop click, mouse-down, pointer-down and touch-start events at the layer.
    pub stop_clicks: bool,
    /// Backing-store density for canvas layers. Falls back to the stack configuration.
    pub pixel_ratio: Option<f64>,
    pub update_on_render: bool,
    /// DOM layers only: rerun update callbacks on every pan/zoom change.
    pub update_on_transform: bool,
}

impl LayerOptions {
    pub fn stop_clicks() -> Self {
        Self {
            stop_clicks: true,
            ..Self::default()
        }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = Some(ratio);
        self
    }

    pub fn with_update_on_render(mut self, enabled: bool) -> Self {
        self.update_on_render = enabled;
        self
    }

    pub fn with_update_on_transform(mut self, enabled: bool) -> Self {
        self.update_on_transform = enabled;
        self
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layers/kind.rs"]
mod tests;
