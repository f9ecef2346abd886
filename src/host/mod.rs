//! Boundary with the graph-rendering host.
//!
//! The layer stack only ever talks to a host through [`Host`]: lifecycle and render
//! notifications, element geometry queries, and the host's own raster export.

pub(crate) mod events;
pub(crate) mod memory;

use crate::{
    export::options::ExportOptions,
    foundation::core::{BezPath, ElementId, Point, Rect, Viewport},
    foundation::error::LayersResult,
    host::events::{EventHandler, EventKind, Subscription},
    platform::{bitmap::Bitmap, dom::Element},
};

/// Identity of a host instance, used to key the layer registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId(pub u64);

/// Platform elements the host renders into.
///
/// `container` holds the three host canvases in canonical order: node, drag, select-box.
#[derive(Clone, Debug)]
pub struct HostSurface {
    pub container: Element,
    pub node: Element,
    pub drag: Element,
    pub select_box: Element,
}

/// Which elements a geometry query should return.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Selector {
    All,
    #[default]
    Visible,
    Class(String),
    Ids(Vec<ElementId>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BoundingBoxOptions {
    pub include_labels: bool,
    pub include_overlays: bool,
}

impl Default for BoundingBoxOptions {
    fn default() -> Self {
        Self {
            include_labels: true,
            include_overlays: false,
        }
    }
}

pub trait Host {
    fn id(&self) -> HostId;

    /// Elements to attach layers to. `None` for a headless host.
    fn surface(&self) -> Option<HostSurface>;

    fn viewport(&self) -> Viewport;

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription;

    fn nodes(&self, selector: &Selector) -> Vec<ElementId>;

    fn edges(&self, selector: &Selector) -> Vec<ElementId>;

    fn contains(&self, id: &ElementId) -> bool;

    /// Model-space bounding box of a node or edge.
    fn bounding_box(&self, id: &ElementId, opts: BoundingBoxOptions) -> Option<Rect>;

    fn position(&self, id: &ElementId) -> Option<Point>;

    /// Source and target points of an edge.
    fn endpoints(&self, id: &ElementId) -> Option<(Point, Point)>;

    /// Source and target node ids of an edge.
    fn edge_ends(&self, id: &ElementId) -> Option<(ElementId, ElementId)>;

    /// Rendered path of an edge, when the host exposes one.
    fn edge_path(&self, _id: &ElementId) -> Option<BezPath> {
        None
    }

    /// Bounding box of every visible element, including labels.
    fn full_bounds(&self) -> Rect;

    /// The host's own raster export of its node/drag/select-box content.
    fn export_native(&self, opts: &ExportOptions) -> LayersResult<Bitmap>;
}
