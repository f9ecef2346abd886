//! Minimal retained element tree standing in for the browser DOM.
//!
//! Elements are reference-counted handles: cloning an [`Element`] clones the handle, not the
//! node. Identity is stable for the lifetime of the node and is compared with
//! [`Element::ptr_eq`] or [`Element::node_id`].

use std::{
    cell::RefCell,
    collections::BTreeMap,
    rc::{Rc, Weak},
    sync::atomic::{AtomicU64, Ordering},
};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Namespace of an element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Namespace {
    Html,
    Svg,
}

/// Process-unique node identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u64);

/// Pointer-ish events that can be dispatched through the tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DomEventKind {
    Click,
    MouseDown,
    MouseUp,
    PointerDown,
    PointerUp,
    TouchStart,
    TouchEnd,
}

/// Event travelling from its target up through the ancestors.
#[derive(Clone, Debug)]
pub struct DomEvent {
    pub kind: DomEventKind,
    pub target: Element,
    propagation_stopped: bool,
}

impl DomEvent {
    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped
    }
}

/// Listener callback attached to an element.
pub type DomListener = Rc<dyn Fn(&mut DomEvent)>;

struct ElementData {
    id: NodeId,
    namespace: Namespace,
    tag: String,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    dataset: BTreeMap<String, String>,
    children: Vec<Element>,
    parent: Weak<RefCell<ElementData>>,
    listeners: Vec<(DomEventKind, DomListener)>,
}

/// Handle to a node in the element tree.
#[derive(Clone)]
pub struct Element(Rc<RefCell<ElementData>>);

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let d = self.0.borrow();
        f.debug_struct("Element")
            .field("id", &d.id)
            .field("tag", &d.tag)
            .field("children", &d.children.len())
            .finish()
    }
}

impl Element {
    /// Create a detached HTML element.
    pub fn html(tag: &str) -> Self {
        Self::create(Namespace::Html, tag)
    }

    /// Create a detached SVG element.
    pub fn svg(tag: &str) -> Self {
        Self::create(Namespace::Svg, tag)
    }

    pub fn create(namespace: Namespace, tag: &str) -> Self {
        Self(Rc::new(RefCell::new(ElementData {
            id: NodeId(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)),
            namespace,
            tag: tag.to_owned(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            dataset: BTreeMap::new(),
            children: Vec::new(),
            parent: Weak::new(),
            listeners: Vec::new(),
        })))
    }

    pub fn node_id(&self) -> NodeId {
        self.0.borrow().id
    }

    pub fn ptr_eq(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn namespace(&self) -> Namespace {
        self.0.borrow().namespace
    }

    pub fn tag(&self) -> String {
        self.0.borrow().tag.clone()
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .attributes
            .insert(name.to_owned(), value.into());
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.0.borrow().attributes.get(name).cloned()
    }

    /// Set an inline style property. An empty value clears the property.
    pub fn set_style(&self, property: &str, value: impl Into<String>) {
        let value = value.into();
        let mut d = self.0.borrow_mut();
        if value.is_empty() {
            d.style.remove(property);
        } else {
            d.style.insert(property.to_owned(), value);
        }
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.0.borrow().style.get(property).cloned()
    }

    pub fn set_data(&self, key: &str, value: impl Into<String>) {
        self.0
            .borrow_mut()
            .dataset
            .insert(key.to_owned(), value.into());
    }

    pub fn data(&self, key: &str) -> Option<String> {
        self.0.borrow().dataset.get(key).cloned()
    }

    pub fn parent(&self) -> Option<Element> {
        self.0.borrow().parent.upgrade().map(Element)
    }

    pub fn children(&self) -> Vec<Element> {
        self.0.borrow().children.clone()
    }

    pub fn child_element_count(&self) -> usize {
        self.0.borrow().children.len()
    }

    pub fn index_in_parent(&self) -> Option<usize> {
        let parent = self.parent()?;
        let d = parent.0.borrow();
        d.children.iter().position(|c| c.ptr_eq(self))
    }

    pub fn is_attached(&self) -> bool {
        self.parent().is_some()
    }

    /// Append `child` as last child, moving it if it is already attached somewhere.
    pub fn append_child(&self, child: &Element) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        self.0.borrow_mut().children.push(child.clone());
    }

    /// Insert `child` so that it ends up at `index` (clamped) among this element's children.
    pub fn insert_child(&self, index: usize, child: &Element) {
        child.remove();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);
        let mut d = self.0.borrow_mut();
        let index = index.min(d.children.len());
        d.children.insert(index, child.clone());
    }

    /// Insert `child` immediately before `reference`; appends when `reference` is not a child.
    pub fn insert_before(&self, child: &Element, reference: &Element) {
        if child.ptr_eq(reference) {
            return;
        }
        child.remove();
        match reference
            .parent()
            .filter(|p| p.ptr_eq(self))
            .and_then(|_| reference.index_in_parent())
        {
            Some(idx) => self.insert_child(idx, child),
            None => self.append_child(child),
        }
    }

    /// Detach from the parent. No-op when already detached.
    pub fn remove(&self) {
        let Some(parent) = self.parent() else {
            return;
        };
        parent.0.borrow_mut().children.retain(|c| !c.ptr_eq(self));
        self.0.borrow_mut().parent = Weak::new();
    }

    pub fn add_event_listener(&self, kind: DomEventKind, listener: impl Fn(&mut DomEvent) + 'static) {
        let listener: DomListener = Rc::new(listener);
        self.0.borrow_mut().listeners.push((kind, listener));
    }

    pub fn listener_count(&self, kind: DomEventKind) -> usize {
        self.0
            .borrow()
            .listeners
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    /// Dispatch an event at this element and bubble it to the root unless stopped.
    pub fn dispatch_event(&self, kind: DomEventKind) -> DomEvent {
        let mut event = DomEvent {
            kind,
            target: self.clone(),
            propagation_stopped: false,
        };
        let mut current = Some(self.clone());
        while let Some(el) = current {
            let listeners: Vec<DomListener> = el
                .0
                .borrow()
                .listeners
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, l)| l.clone())
                .collect();
            for l in listeners {
                l(&mut event);
            }
            if event.propagation_stopped {
                break;
            }
            current = el.parent();
        }
        event
    }
}

#[cfg(test)]
#[path = "../../tests/unit/platform/dom.rs"]
mod tests;
