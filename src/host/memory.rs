use std::{
    cell::RefCell,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    export::{composite::apply_background, hint::RenderHint, options::ExportOptions},
    foundation::core::{BezPath, ElementId, Point, Rect, Rgba8, Size, Vec2, Viewport},
    foundation::error::{LayersError, LayersResult},
    host::{
        BoundingBoxOptions, Host, HostId, HostSurface, Selector,
        events::{EventBus, EventHandler, EventKind, HostEvent, Subscription},
    },
    platform::{
        bitmap::Bitmap,
        dom::Element,
        draw::{Canvas2d, checked_dims},
    },
};

static NEXT_HOST_ID: AtomicU64 = AtomicU64::new(1);

fn default_node_size() -> Size {
    Size::new(30.0, 30.0)
}

fn default_visible() -> bool {
    true
}

fn default_edge_width() -> f64 {
    1.0
}

fn default_zoom() -> f64 {
    1.0
}

fn default_node_color() -> Rgba8 {
    Rgba8::new(153, 153, 153, 255)
}

fn default_edge_color() -> Rgba8 {
    Rgba8::new(204, 204, 204, 255)
}

/// A node of the in-memory graph. `position` is the center.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeSpec {
    pub id: ElementId,
    pub position: Point,
    #[serde(default = "default_node_size")]
    pub size: Size,
    #[serde(default = "default_node_color")]
    pub color: Rgba8,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Label box rendered centered below the node body.
    #[serde(default)]
    pub label: Option<Size>,
    #[serde(default)]
    pub overlay_padding: f64,
}

impl NodeSpec {
    pub fn new(id: impl Into<ElementId>, position: Point) -> Self {
        Self {
            id: id.into(),
            position,
            size: default_node_size(),
            color: default_node_color(),
            classes: Vec::new(),
            visible: true,
            label: None,
            overlay_padding: 0.0,
        }
    }

    pub fn with_size(mut self, size: Size) -> Self {
        self.size = size;
        self
    }

    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_label(mut self, label: Size) -> Self {
        self.label = Some(label);
        self
    }

    pub fn with_overlay_padding(mut self, padding: f64) -> Self {
        self.overlay_padding = padding;
        self
    }

    fn body(&self) -> Rect {
        Rect::from_center_size(self.position, self.size)
    }

    fn bounding_box(&self, opts: BoundingBoxOptions) -> Rect {
        let mut bb = self.body();
        if opts.include_overlays && self.overlay_padding > 0.0 {
            bb = bb.inflate(self.overlay_padding, self.overlay_padding);
        }
        if opts.include_labels
            && let Some(label) = self.label
        {
            let body = self.body();
            let label = Rect::new(
                self.position.x - label.width / 2.0,
                body.y1,
                self.position.x + label.width / 2.0,
                body.y1 + label.height,
            );
            bb = bb.union(label);
        }
        bb
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EdgeSpec {
    pub id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default = "default_edge_color")]
    pub color: Rgba8,
    #[serde(default = "default_edge_width")]
    pub width: f64,
    #[serde(default)]
    pub classes: Vec<String>,
}

impl EdgeSpec {
    pub fn new(
        id: impl Into<ElementId>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            color: default_edge_color(),
            width: default_edge_width(),
            classes: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: Rgba8) -> Self {
        self.color = color;
        self
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }
}

/// JSON description accepted by [`MemoryHost::from_json`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GraphSpec {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub pan: Vec2,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

#[derive(Default)]
struct Graph {
    viewport: Viewport,
    nodes: Vec<NodeSpec>,
    edges: Vec<EdgeSpec>,
    destroyed: bool,
}

impl Graph {
    fn node(&self, id: &ElementId) -> Option<&NodeSpec> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    fn edge(&self, id: &ElementId) -> Option<&EdgeSpec> {
        self.edges.iter().find(|e| &e.id == id)
    }

    fn edge_visible(&self, e: &EdgeSpec) -> bool {
        let vis = |id: &ElementId| self.node(id).is_some_and(|n| n.visible);
        vis(&e.source) && vis(&e.target)
    }

    fn endpoints(&self, e: &EdgeSpec) -> Option<(Point, Point)> {
        Some((self.node(&e.source)?.position, self.node(&e.target)?.position))
    }

    fn edge_bounding_box(&self, e: &EdgeSpec) -> Option<Rect> {
        let (s, t) = self.endpoints(e)?;
        let half = e.width / 2.0;
        Some(Rect::from_points(s, t).inflate(half, half))
    }
}

/// In-memory graph host.
///
/// Holds nodes and edges with fixed geometry, a viewport, the three host canvases, and an
/// event bus. Mutators emit the same notifications a live renderer would, except that
/// render ticks are explicit through [`MemoryHost::render`].
pub struct MemoryHost {
    id: HostId,
    surface: Option<HostSurface>,
    bus: EventBus,
    graph: RefCell<Graph>,
}

impl MemoryHost {
    pub fn new(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self::build(width, height, Some(Self::make_surface(width, height))))
    }

    /// A host with no attachable surface.
    pub fn headless(width: f64, height: f64) -> Rc<Self> {
        Rc::new(Self::build(width, height, None))
    }

    pub fn from_json(s: &str) -> LayersResult<Rc<Self>> {
        let spec: GraphSpec =
            serde_json::from_str(s).map_err(|e| LayersError::serde(e.to_string()))?;
        let host = Self::new(spec.width, spec.height);
        {
            let mut g = host.graph.borrow_mut();
            g.viewport.pan = spec.pan;
            g.viewport.zoom = spec.zoom;
            g.nodes = spec.nodes;
            g.edges = spec.edges;
        }
        Ok(host)
    }

    fn build(width: f64, height: f64, surface: Option<HostSurface>) -> Self {
        Self {
            id: HostId(NEXT_HOST_ID.fetch_add(1, Ordering::Relaxed)),
            surface,
            bus: EventBus::new(),
            graph: RefCell::new(Graph {
                viewport: Viewport::new(width, height),
                ..Graph::default()
            }),
        }
    }

    fn make_surface(width: f64, height: f64) -> HostSurface {
        let container = Element::html("div");
        container.set_style("position", "relative");
        container.set_style("width", format!("{width}px"));
        container.set_style("height", format!("{height}px"));

        let canvas = |name: &str| {
            let c = Element::html("canvas");
            c.set_data("id", name);
            container.append_child(&c);
            c
        };
        let node = canvas("layer2-node");
        let drag = canvas("layer1-drag");
        let select_box = canvas("layer0-selectbox");
        HostSurface {
            container,
            node,
            drag,
            select_box,
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn add_node(&self, node: NodeSpec) {
        let id = node.id.clone();
        self.graph.borrow_mut().nodes.push(node);
        self.bus.emit(&HostEvent::Add(vec![id]));
    }

    pub fn add_edge(&self, edge: EdgeSpec) {
        let id = edge.id.clone();
        self.graph.borrow_mut().edges.push(edge);
        self.bus.emit(&HostEvent::Add(vec![id]));
    }

    /// Remove a node (with its incident edges) or an edge.
    pub fn remove_element(&self, id: &ElementId) -> bool {
        let removed: Vec<ElementId> = {
            let mut g = self.graph.borrow_mut();
            let mut removed = Vec::new();
            if let Some(idx) = g.nodes.iter().position(|n| &n.id == id) {
                g.nodes.remove(idx);
                removed.push(id.clone());
                g.edges.retain(|e| {
                    let incident = &e.source == id || &e.target == id;
                    if incident {
                        removed.push(e.id.clone());
                    }
                    !incident
                });
            } else if let Some(idx) = g.edges.iter().position(|e| &e.id == id) {
                g.edges.remove(idx);
                removed.push(id.clone());
            }
            removed
        };
        if removed.is_empty() {
            return false;
        }
        self.bus.emit(&HostEvent::Remove(removed));
        true
    }

    pub fn move_node(&self, id: &ElementId, position: Point) {
        let moved = {
            let mut g = self.graph.borrow_mut();
            match g.nodes.iter_mut().find(|n| &n.id == id) {
                Some(n) => {
                    n.position = position;
                    true
                }
                None => false,
            }
        };
        if moved {
            self.bus.emit(&HostEvent::Position(vec![id.clone()]));
        }
    }

    pub fn set_node_visible(&self, id: &ElementId, visible: bool) {
        if let Some(n) = self.graph.borrow_mut().nodes.iter_mut().find(|n| &n.id == id) {
            n.visible = visible;
        }
    }

    pub fn set_viewport(&self, pan: Vec2, zoom: f64) {
        {
            let mut g = self.graph.borrow_mut();
            g.viewport.pan = pan;
            g.viewport.zoom = zoom;
        }
        self.bus.emit(&HostEvent::Viewport { pan, zoom });
    }

    pub fn resize(&self, width: f64, height: f64) {
        {
            let mut g = self.graph.borrow_mut();
            g.viewport.width = width;
            g.viewport.height = height;
        }
        if let Some(s) = &self.surface {
            s.container.set_style("width", format!("{width}px"));
            s.container.set_style("height", format!("{height}px"));
        }
        self.bus.emit(&HostEvent::Resize { width, height });
    }

    /// Emit one render tick.
    pub fn render(&self) {
        if self.graph.borrow().destroyed {
            return;
        }
        self.bus.emit(&HostEvent::Render);
    }

    pub fn destroy(&self) {
        {
            let mut g = self.graph.borrow_mut();
            if g.destroyed {
                return;
            }
            g.destroyed = true;
        }
        self.bus.emit(&HostEvent::Destroy);
    }

    pub fn is_destroyed(&self) -> bool {
        self.graph.borrow().destroyed
    }

    fn select<'a, T>(
        items: impl Iterator<Item = &'a T>,
        selector: &Selector,
        id: impl Fn(&T) -> &ElementId,
        classes: impl Fn(&T) -> &[String],
        visible: impl Fn(&T) -> bool,
    ) -> Vec<ElementId>
    where
        T: 'a,
    {
        items
            .filter(|item| match selector {
                Selector::All => true,
                Selector::Visible => visible(item),
                Selector::Class(c) => classes(item).iter().any(|x| x == c),
                Selector::Ids(ids) => ids.contains(id(item)),
            })
            .map(|item| id(item).clone())
            .collect()
    }
}

impl Host for MemoryHost {
    fn id(&self) -> HostId {
        self.id
    }

    fn surface(&self) -> Option<HostSurface> {
        self.surface.clone()
    }

    fn viewport(&self) -> Viewport {
        self.graph.borrow().viewport
    }

    fn subscribe(&self, kind: EventKind, handler: EventHandler) -> Subscription {
        self.bus.subscribe(kind, move |ev: &HostEvent| handler(ev))
    }

    fn nodes(&self, selector: &Selector) -> Vec<ElementId> {
        let g = self.graph.borrow();
        Self::select(
            g.nodes.iter(),
            selector,
            |n| &n.id,
            |n| n.classes.as_slice(),
            |n| n.visible,
        )
    }

    fn edges(&self, selector: &Selector) -> Vec<ElementId> {
        let g = self.graph.borrow();
        Self::select(
            g.edges.iter(),
            selector,
            |e| &e.id,
            |e| e.classes.as_slice(),
            |e| g.edge_visible(e),
        )
    }

    fn contains(&self, id: &ElementId) -> bool {
        let g = self.graph.borrow();
        g.node(id).is_some() || g.edge(id).is_some()
    }

    fn bounding_box(&self, id: &ElementId, opts: BoundingBoxOptions) -> Option<Rect> {
        let g = self.graph.borrow();
        if let Some(n) = g.node(id) {
            return Some(n.bounding_box(opts));
        }
        g.edge(id).and_then(|e| g.edge_bounding_box(e))
    }

    fn position(&self, id: &ElementId) -> Option<Point> {
        self.graph.borrow().node(id).map(|n| n.position)
    }

    fn endpoints(&self, id: &ElementId) -> Option<(Point, Point)> {
        let g = self.graph.borrow();
        g.edge(id).and_then(|e| g.endpoints(e))
    }

    fn edge_ends(&self, id: &ElementId) -> Option<(ElementId, ElementId)> {
        self.graph
            .borrow()
            .edge(id)
            .map(|e| (e.source.clone(), e.target.clone()))
    }

    fn edge_path(&self, id: &ElementId) -> Option<BezPath> {
        let (s, t) = self.endpoints(id)?;
        let mut path = BezPath::new();
        path.move_to(s);
        path.line_to(t);
        Some(path)
    }

    fn full_bounds(&self) -> Rect {
        let g = self.graph.borrow();
        let opts = BoundingBoxOptions::default();
        let nodes = g
            .nodes
            .iter()
            .filter(|n| n.visible)
            .map(|n| n.bounding_box(opts));
        let edges = g
            .edges
            .iter()
            .filter(|e| g.edge_visible(e))
            .filter_map(|e| g.edge_bounding_box(e));
        nodes
            .chain(edges)
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }

    #[tracing::instrument(skip(self, opts), fields(host = self.id.0))]
    fn export_native(&self, opts: &ExportOptions) -> LayersResult<Bitmap> {
        let viewport = self.viewport();
        let hint = RenderHint::resolve(viewport, self.full_bounds(), opts)?;
        let (w, h) = checked_dims(hint.width, hint.height)?;
        let mut canvas = Canvas2d::new(w, h);

        let g = self.graph.borrow();
        canvas.paint(
            hint.model_transform(viewport),
            hint.visible_bounds(viewport),
            |ctx| {
                for e in g.edges.iter().filter(|e| g.edge_visible(e)) {
                    let Some((s, t)) = g.endpoints(e) else {
                        continue;
                    };
                    let mut path = BezPath::new();
                    path.move_to(s);
                    path.line_to(t);
                    ctx.set_color(e.color);
                    ctx.stroke_path(&path, e.width);
                }
                for n in g.nodes.iter().filter(|n| n.visible) {
                    ctx.set_color(n.color);
                    ctx.fill_rect(n.body());
                }
            },
        );

        let mut bitmap = canvas.to_bitmap();
        if let Some(bg) = opts.bg {
            apply_background(&mut bitmap, bg);
        }
        tracing::debug!(width = bitmap.width, height = bitmap.height, "native export");
        Ok(bitmap)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/memory.rs"]
mod tests;
