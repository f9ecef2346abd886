//! Per-element rendering on top of custom layers.
//!
//! The helpers here draw something for every node or edge of the host graph, keep that in
//! step with the host's element collection, and schedule redraws from host notifications.

pub(crate) mod edges;
pub(crate) mod nodes;
pub(crate) mod options;

pub use edges::render_per_edge;
pub use nodes::{render_per_node, render_per_node_dom};

use std::{
    cell::RefCell,
    collections::HashSet,
    rc::{Rc, Weak},
};

use crate::{
    elements::options::{ElementLayerOptions, UpdateOn},
    foundation::core::ElementId,
    host::{
        Host, Selector,
        events::{EventKind, HostEvent, Subscription},
    },
    layers::{
        callbacks::CallbackId,
        layer::{Layer, WeakLayer},
    },
    reconcile::apply::NodeBinder,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Collection {
    Nodes,
    Edges,
}

/// The elements a helper renders: a selector evaluated per pass, or a set fixed up front.
pub(crate) enum Tracked {
    Query(Selector),
    Fixed {
        ids: Vec<ElementId>,
        members: HashSet<ElementId>,
        /// Elements whose movement affects the rendering without being rendered themselves.
        watched: HashSet<ElementId>,
    },
}

impl Tracked {
    pub(crate) fn new(host: &dyn Host, collection: Collection, opts: &ElementLayerOptions) -> Self {
        if opts.query_each_time {
            return Self::Query(opts.selector.clone());
        }
        let ids = query(host, collection, &opts.selector);
        let members: HashSet<ElementId> = ids.iter().cloned().collect();
        let watched = match collection {
            Collection::Nodes => HashSet::new(),
            Collection::Edges => ids
                .iter()
                .filter_map(|id| host.edge_ends(id))
                .flat_map(|(s, t)| [s, t])
                .collect(),
        };
        Self::Fixed {
            ids,
            members,
            watched,
        }
    }

    pub(crate) fn current(&self, host: &dyn Host, collection: Collection) -> Vec<ElementId> {
        match self {
            Self::Query(selector) => query(host, collection, selector),
            Self::Fixed { ids, .. } => ids.iter().filter(|id| host.contains(id)).cloned().collect(),
        }
    }

    fn is_relevant(&self, event: &HostEvent) -> bool {
        let ids = match event {
            HostEvent::Add(ids) | HostEvent::Remove(ids) | HostEvent::Position(ids) => ids,
            _ => return false,
        };
        match self {
            Self::Query(_) => true,
            Self::Fixed {
                members, watched, ..
            } => ids.iter().any(|id| {
                members.contains(id)
                    || (matches!(event, HostEvent::Position(_)) && watched.contains(id))
            }),
        }
    }
}

fn query(host: &dyn Host, collection: Collection, selector: &Selector) -> Vec<ElementId> {
    match collection {
        Collection::Nodes => host.nodes(selector),
        Collection::Edges => host.edges(selector),
    }
}

/// Handle returned by the per-element helpers.
#[must_use = "call ElementRender::remove to stop rendering and release host subscriptions"]
pub struct ElementRender {
    layer: Layer,
    host: Weak<dyn Host>,
    collection: Collection,
    tracked: Rc<Tracked>,
    callback: CallbackId,
    binder: Option<Rc<RefCell<NodeBinder>>>,
}

impl std::fmt::Debug for ElementRender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRender")
            .field("layer", &self.layer)
            .field("collection", &self.collection)
            .field("callback", &self.callback)
            .finish()
    }
}

impl ElementRender {
    pub fn layer(&self) -> &Layer {
        &self.layer
    }

    /// Elements the helper currently renders, before bounds culling.
    pub fn elements(&self) -> Vec<ElementId> {
        match self.host.upgrade() {
            Some(host) => self.tracked.current(host.as_ref(), self.collection),
            None => Vec::new(),
        }
    }

    pub fn callback(&self) -> CallbackId {
        self.callback
    }

    /// Platform node bound to `id` on a DOM layer.
    pub fn element_node(&self, id: &ElementId) -> Option<crate::platform::dom::Element> {
        let binder = self.binder.as_ref()?;
        binder.borrow().element_for(id).cloned()
    }

    /// Stop rendering: drops the layer callback, the host subscriptions, and any platform
    /// nodes created for elements.
    pub fn remove(self) {
        self.layer.release_subscriptions(self.callback);
        self.layer.remove_callback(self.callback);
        if let Some(binder) = self.binder {
            binder.borrow_mut().clear();
        }
        self.layer.request_update();
    }
}

pub(crate) struct RenderParts {
    pub(crate) layer: Layer,
    pub(crate) host: Rc<dyn Host>,
    pub(crate) collection: Collection,
    pub(crate) tracked: Rc<Tracked>,
    pub(crate) callback: CallbackId,
    pub(crate) binder: Option<Rc<RefCell<NodeBinder>>>,
}

/// Wire up automatic refresh per `update_on` and assemble the handle.
pub(crate) fn finish(parts: RenderParts, opts: &ElementLayerOptions) -> ElementRender {
    let kinds: &[EventKind] = match opts.update_on.resolve(opts.query_each_time) {
        UpdateOn::Render => {
            parts.layer.set_update_on_render(true);
            &[]
        }
        UpdateOn::Position => &[EventKind::Add, EventKind::Remove, EventKind::Position],
        UpdateOn::None | UpdateOn::Auto => &[EventKind::Add, EventKind::Remove],
    };

    let subscriptions: Vec<Subscription> = kinds
        .iter()
        .map(|&kind| {
            let layer: WeakLayer = parts.layer.downgrade();
            let tracked = Rc::downgrade(&parts.tracked);
            parts.host.subscribe(
                kind,
                Rc::new(move |ev: &HostEvent| {
                    let (Some(layer), Some(tracked)) = (layer.upgrade(), tracked.upgrade()) else {
                        return;
                    };
                    if !layer.is_removed() && tracked.is_relevant(ev) {
                        layer.request_update();
                    }
                }),
            )
        })
        .collect();
    parts.layer.hold_subscriptions(parts.callback, subscriptions);

    ElementRender {
        layer: parts.layer,
        host: Rc::downgrade(&parts.host),
        collection: parts.collection,
        tracked: parts.tracked,
        callback: parts.callback,
        binder: parts.binder,
    }
}
