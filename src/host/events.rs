use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use crate::foundation::core::{ElementId, Vec2};

/// Notification emitted by a host.
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    /// Pan or zoom changed.
    Viewport { pan: Vec2, zoom: f64 },
    /// The host container changed size (CSS pixels).
    Resize { width: f64, height: f64 },
    /// A render tick. Always follows the viewport mutation that caused it.
    Render,
    /// The host is going away; everything attached to it must be torn down.
    Destroy,
    Add(Vec<ElementId>),
    Remove(Vec<ElementId>),
    Position(Vec<ElementId>),
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Viewport { .. } => EventKind::Viewport,
            Self::Resize { .. } => EventKind::Resize,
            Self::Render => EventKind::Render,
            Self::Destroy => EventKind::Destroy,
            Self::Add(_) => EventKind::Add,
            Self::Remove(_) => EventKind::Remove,
            Self::Position(_) => EventKind::Position,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Viewport,
    Resize,
    Render,
    Destroy,
    Add,
    Remove,
    Position,
}

pub type EventHandler = Rc<dyn Fn(&HostEvent)>;

/// Unsubscribe handle returned by every subscribe call.
///
/// Dropping a subscription does not unsubscribe; call [`Subscription::unsubscribe`].
#[must_use = "dropping a Subscription leaves the handler registered"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    handlers: Vec<(u64, EventKind, EventHandler)>,
}

/// Synchronous fan-out of host events to subscribed handlers.
///
/// Emission iterates a snapshot of the handler list, so handlers may subscribe or
/// unsubscribe while an event is being delivered. A handler removed mid-delivery is not
/// called afterwards.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Rc<RefCell<BusInner>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, kind: EventKind, handler: impl Fn(&HostEvent) + 'static) -> Subscription {
        let handler: EventHandler = Rc::new(handler);
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_id += 1;
            let id = inner.next_id;
            inner.handlers.push((id, kind, handler));
            id
        };
        let weak: Weak<RefCell<BusInner>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().handlers.retain(|(h, _, _)| *h != id);
            }
        })
    }

    pub fn emit(&self, event: &HostEvent) {
        let kind = event.kind();
        let snapshot: Vec<(u64, EventHandler)> = self
            .inner
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .map(|(id, _, h)| (*id, h.clone()))
            .collect();
        for (id, handler) in snapshot {
            let live = self
                .inner
                .borrow()
                .handlers
                .iter()
                .any(|(h, _, _)| *h == id);
            if live {
                handler(event);
            }
        }
    }

    pub fn handler_count(&self) -> usize {
        self.inner.borrow().handlers.len()
    }

    pub fn handler_count_for(&self, kind: EventKind) -> usize {
        self.inner
            .borrow()
            .handlers
            .iter()
            .filter(|(_, k, _)| *k == kind)
            .count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/events.rs"]
mod tests;
