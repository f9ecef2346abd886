//! Layered compositing surfaces kept in sync with a graph viewport.
//!
//! A [`LayerStack`] attaches to a [`Host`] (the engine drawing the graph) and lets embedders
//! put their own layers before, between, or after the host's node, drag and select-box
//! layers:
//!
//! - canvas layers draw through a [`DrawContext`] in model coordinates
//! - svg and html layers expose an [`Element`] that callbacks mutate directly
//! - static variants stay anchored to the viewport frame
//!
//! Per-element helpers ([`render_per_node`], [`render_per_node_dom`], [`render_per_edge`])
//! keep one drawing or one platform node per graph element, and [`LayerStack::to_raster`]
//! composites everything into a single bitmap.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod elements;
pub(crate) mod export;
pub(crate) mod host;
pub(crate) mod layers;
pub(crate) mod platform;
pub(crate) mod reconcile;

pub use crate::foundation::config::LayersConfig;
pub use crate::foundation::core::{
    Affine, BezPath, ElementId, Point, Rect, Rgba8, Size, Vec2, ViewTransform, Viewport,
};
pub use crate::foundation::error::{LayersError, LayersResult};

pub use crate::elements::options::{
    EdgeLayerOptions, ElementLayerOptions, NodeLayerOptions, UpdateOn,
};
pub use crate::elements::{ElementRender, render_per_edge, render_per_node, render_per_node_dom};
pub use crate::export::composite::{BlendOp, PremulRgba8, blend};
pub use crate::export::encode::{ExportOutput, encode_image, encode_output};
pub use crate::export::hint::RenderHint;
pub use crate::export::options::{ExportFormat, ExportOptions, OutputMode};
pub use crate::host::events::{EventBus, EventHandler, EventKind, HostEvent, Subscription};
pub use crate::host::memory::{EdgeSpec, GraphSpec, MemoryHost, NodeSpec};
pub use crate::host::{BoundingBoxOptions, Host, HostId, HostSurface, Selector};
pub use crate::layers::callbacks::CallbackId;
pub use crate::layers::kind::{LayerKind, LayerOptions};
pub use crate::layers::layer::{Layer, LayerId};
pub use crate::layers::registry::{LayersRegistry, default_registry, layers};
pub use crate::layers::stack::{InsertPosition, LayerStack, MoveTarget};
pub use crate::platform::bitmap::Bitmap;
pub use crate::platform::dom::{DomEvent, DomEventKind, Element, Namespace, NodeId};
pub use crate::platform::draw::DrawContext;
pub use crate::reconcile::apply::NodeBinder;
pub use crate::reconcile::plan::{
    Binding, NodeKey, ReconcileMode, ReconcileOp, ReconcileStats, Reconciliation, Slot,
    reconcile,
};
