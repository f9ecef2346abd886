use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::{
    foundation::error::LayersResult,
    host::{
        Host, HostId,
        events::{EventKind, HostEvent, Subscription},
    },
    layers::stack::LayerStack,
};

struct RegistryEntry {
    stack: LayerStack,
    on_destroy: Subscription,
}

/// One [`LayerStack`] per host instance.
///
/// Entries are dropped (and their stacks destroyed) when the host emits its destroy
/// notification or when [`LayersRegistry::destroy`] is called.
#[derive(Clone, Default)]
pub struct LayersRegistry {
    entries: Rc<RefCell<HashMap<HostId, RegistryEntry>>>,
}

impl LayersRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stack attached to `host`, created on first use.
    pub fn get_or_create(&self, host: Rc<dyn Host>) -> LayersResult<LayerStack> {
        let id = host.id();
        if let Some(stack) = self.get(id) {
            return Ok(stack);
        }
        let stack = LayerStack::new(host.clone())?;
        let weak = Rc::downgrade(&self.entries);
        let on_destroy = host.subscribe(
            EventKind::Destroy,
            Rc::new(move |_: &HostEvent| {
                if let Some(entries) = weak.upgrade() {
                    let entry = entries.borrow_mut().remove(&id);
                    if let Some(entry) = entry {
                        entry.on_destroy.unsubscribe();
                        entry.stack.destroy();
                    }
                }
            }),
        );
        self.entries.borrow_mut().insert(
            id,
            RegistryEntry {
                stack: stack.clone(),
                on_destroy,
            },
        );
        tracing::debug!(host = id.0, "registered layer stack");
        Ok(stack)
    }

    pub fn get(&self, host: HostId) -> Option<LayerStack> {
        self.entries.borrow().get(&host).map(|e| e.stack.clone())
    }

    /// Destroy and forget the stack of `host`. Returns whether one existed.
    pub fn destroy(&self, host: HostId) -> bool {
        let entry = self.entries.borrow_mut().remove(&host);
        match entry {
            Some(entry) => {
                entry.on_destroy.unsubscribe();
                entry.stack.destroy();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

thread_local! {
    static DEFAULT_REGISTRY: LayersRegistry = LayersRegistry::new();
}

/// The stack for `host` from this thread's default registry.
pub fn layers(host: Rc<dyn Host>) -> LayersResult<LayerStack> {
    DEFAULT_REGISTRY.with(|r| r.get_or_create(host))
}

/// This thread's default registry.
pub fn default_registry() -> LayersRegistry {
    DEFAULT_REGISTRY.with(LayersRegistry::clone)
}

#[cfg(test)]
#[path = "../../tests/unit/layers/registry.rs"]
mod tests;
