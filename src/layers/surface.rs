use crate::{
    foundation::core::{Size, ViewTransform},
    layers::{canvas::CanvasSurface, dom::DomSurface},
    platform::dom::{DomEvent, DomEventKind, Element},
};

/// Capability interface shared by every layer variant.
pub(crate) trait Surface {
    /// Element attached to the stack container.
    fn root(&self) -> &Element;

    /// Element callbacks draw into or mutate.
    fn node(&self) -> &Element;

    fn resize(&mut self, size: Size);

    /// Store the viewport transform. Returns whether the layer wants a redraw.
    fn set_viewport(&mut self, transform: ViewTransform) -> bool;

    fn supports_render(&self) -> bool;

    fn remove(&mut self) {
        self.root().remove();
    }
}

/// One of the three canvases the host renders into. The host owns its content.
pub(crate) struct HostCanvas {
    element: Element,
}

impl HostCanvas {
    pub(crate) fn new(element: Element) -> Self {
        Self { element }
    }
}

impl Surface for HostCanvas {
    fn root(&self) -> &Element {
        &self.element
    }

    fn node(&self) -> &Element {
        &self.element
    }

    fn resize(&mut self, _size: Size) {}

    fn set_viewport(&mut self, _transform: ViewTransform) -> bool {
        false
    }

    /// Rendered as one block through the host's native export.
    fn supports_render(&self) -> bool {
        true
    }

    /// Host canvases belong to the host and stay in place.
    fn remove(&mut self) {}
}

pub(crate) enum LayerBody {
    Canvas(CanvasSurface),
    Dom(DomSurface),
    Host(HostCanvas),
}

impl LayerBody {
    pub(crate) fn surface(&self) -> &dyn Surface {
        match self {
            Self::Canvas(s) => s,
            Self::Dom(s) => s,
            Self::Host(s) => s,
        }
    }

    pub(crate) fn surface_mut(&mut self) -> &mut dyn Surface {
        match self {
            Self::Canvas(s) => s,
            Self::Dom(s) => s,
            Self::Host(s) => s,
        }
    }
}

pub(crate) fn apply_layer_style(el: &Element) {
    for (property, value) in [
        ("position", "absolute"),
        ("left", "0"),
        ("top", "0"),
        ("user-select", "none"),
        ("outline-style", "none"),
        ("width", "100%"),
        ("height", "100%"),
    ] {
        el.set_style(property, value);
    }
}

/// Keep pointer presses on `el` from reaching the host below.
pub(crate) fn stop_clicks(el: &Element) {
    for kind in [
        DomEventKind::Click,
        DomEventKind::MouseDown,
        DomEventKind::PointerDown,
        DomEventKind::TouchStart,
    ] {
        el.add_event_listener(kind, |e: &mut DomEvent| e.stop_propagation());
    }
}
