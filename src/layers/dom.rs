use crate::{
    foundation::core::{Size, ViewTransform},
    layers::{callbacks::CallbackList, kind::LayerKind, surface::Surface},
    platform::dom::Element,
};

/// Update callback of a DOM layer. Receives the layer's content node and mutates it.
pub type DomUpdateFn = Box<dyn FnMut(&Element)>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flavor {
    Svg,
    Html,
}

/// Vector (SVG) or HTML layer: a root element plus the content node callbacks mutate.
pub(crate) struct DomSurface {
    flavor: Flavor,
    root: Element,
    node: Element,
    tracking: bool,
    transform: ViewTransform,
    pub(crate) update_on_transform: bool,
    pub(crate) callbacks: CallbackList<DomUpdateFn>,
}

impl DomSurface {
    pub(crate) fn new(kind: LayerKind) -> Self {
        let flavor = if kind.is_svg() {
            Flavor::Svg
        } else {
            Flavor::Html
        };
        let (root, node) = match (flavor, kind.is_static()) {
            (Flavor::Svg, _) => {
                let root = Element::svg("svg");
                let g = Element::svg("g");
                root.append_child(&g);
                (root, g)
            }
            (Flavor::Html, false) => {
                let root = Element::html("div");
                let inner = Element::html("div");
                inner.set_style("position", "absolute");
                inner.set_style("left", "0px");
                inner.set_style("top", "0px");
                root.append_child(&inner);
                (root, inner)
            }
            (Flavor::Html, true) => {
                let root = Element::html("div");
                (root.clone(), root)
            }
        };
        Self {
            flavor,
            root,
            node,
            tracking: !kind.is_static(),
            transform: ViewTransform::IDENTITY,
            update_on_transform: false,
            callbacks: CallbackList::default(),
        }
    }

    pub(crate) fn applied_transform(&self) -> Option<ViewTransform> {
        self.tracking.then_some(self.transform)
    }
}

impl Surface for DomSurface {
    fn root(&self) -> &Element {
        &self.root
    }

    fn node(&self) -> &Element {
        &self.node
    }

    fn resize(&mut self, _size: Size) {}

    fn set_viewport(&mut self, transform: ViewTransform) -> bool {
        if !self.tracking {
            return false;
        }
        let changed = self.transform != transform;
        self.transform = transform;
        let ViewTransform { tx, ty, zoom } = transform;
        match self.flavor {
            Flavor::Svg => self
                .node
                .set_attribute("transform", format!("translate({tx},{ty})scale({zoom})")),
            Flavor::Html => self
                .node
                .set_style("transform", format!("translate({tx}px,{ty}px)scale({zoom})")),
        }
        self.update_on_transform && changed
    }

    /// Only an empty tracking layer can be flattened into a raster export. Static DOM
    /// layers never can.
    fn supports_render(&self) -> bool {
        self.tracking && self.node.child_element_count() == 0
    }
}
