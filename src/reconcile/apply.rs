use std::collections::HashMap;

use crate::{
    foundation::core::ElementId,
    platform::dom::Element,
    reconcile::plan::{Binding, NodeKey, ReconcileMode, ReconcileOp, ReconcileStats, reconcile},
};

/// Keeps the children of a root element in step with a list of graph elements.
///
/// The binder owns every child it creates under the root; other children present under the
/// root are left alone but may be shifted by insertions.
#[derive(Debug, Default)]
pub struct NodeBinder {
    mode: ReconcileMode,
    binding: Binding,
    nodes: HashMap<NodeKey, Element>,
}

impl NodeBinder {
    pub fn new(mode: ReconcileMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> ReconcileMode {
        self.mode
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The node currently showing `id`.
    pub fn element_for(&self, id: &ElementId) -> Option<&Element> {
        let key = self.binding.node_for(id)?;
        self.nodes.get(&key)
    }

    /// Bound nodes in child order.
    pub fn elements(&self) -> Vec<Element> {
        self.binding
            .slots()
            .iter()
            .filter_map(|s| self.nodes.get(&s.node).cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.binding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.binding.is_empty()
    }

    /// Detach every bound node and forget the binding.
    pub fn clear(&mut self) {
        for el in self.nodes.values() {
            el.remove();
        }
        self.nodes.clear();
        self.binding = Binding::new();
    }

    /// Reconcile the children of `root` against `items`.
    ///
    /// `create` builds a fresh node for an element; `update` then runs for every visited
    /// element, new or reused, with the node and its position in the pass.
    #[tracing::instrument(level = "debug", skip_all, fields(items = items.len(), mode = ?self.mode))]
    pub fn sync<T>(
        &mut self,
        root: &Element,
        items: &[(ElementId, T)],
        mut create: impl FnMut(&ElementId, &T) -> Element,
        mut update: impl FnMut(&Element, &ElementId, &T, usize),
    ) -> ReconcileStats {
        // Nodes detached behind our back cannot be reused in place.
        if self.nodes.values().any(|el| !is_child_of(el, root)) {
            tracing::debug!("bound nodes detached externally; rebuilding");
            self.clear();
        }

        let ids: Vec<ElementId> = items.iter().map(|(id, _)| id.clone()).collect();
        let by_id: HashMap<&ElementId, &T> = items.iter().rev().map(|(id, v)| (id, v)).collect();
        let plan = reconcile(&self.binding, &ids, self.mode);
        let stats = plan.stats();
        let base = self.base_index(root);

        let mut positional = items.iter();
        for op in &plan.ops {
            match op {
                ReconcileOp::Create { node, key, index } => {
                    let value = self.value_for(key, &by_id, &mut positional);
                    let Some(value) = value else { continue };
                    let el = create(key, value);
                    if self.mode == ReconcileMode::Keyed {
                        el.set_data("id", key.as_str());
                    }
                    root.insert_child(base + index, &el);
                    update(&el, key, value, *index);
                    self.nodes.insert(*node, el);
                }
                ReconcileOp::Update { node, key, index } => {
                    let value = self.value_for(key, &by_id, &mut positional);
                    if let (Some(el), Some(value)) = (self.nodes.get(node), value) {
                        update(el, key, value, *index);
                    }
                }
                ReconcileOp::Move { node, to, .. } => {
                    if let Some(el) = self.nodes.get(node) {
                        root.insert_child(base + to, el);
                    }
                }
                ReconcileOp::Remove { node } => {
                    if let Some(el) = self.nodes.remove(node) {
                        el.remove();
                    }
                }
            }
        }

        self.binding = plan.binding;
        tracing::debug!(
            created = stats.created,
            moved = stats.moved,
            removed = stats.removed,
            "reconciled"
        );
        stats
    }

    fn value_for<'a, T>(
        &self,
        key: &ElementId,
        by_id: &HashMap<&ElementId, &'a T>,
        positional: &mut std::slice::Iter<'a, (ElementId, T)>,
    ) -> Option<&'a T> {
        match self.mode {
            // Positional passes visit every item in order, duplicates included.
            ReconcileMode::Positional => positional.next().map(|(_, v)| v),
            ReconcileMode::Keyed => by_id.get(key).copied(),
        }
    }

    /// Index under `root` of the first bound node, or the end when nothing is bound.
    fn base_index(&self, root: &Element) -> usize {
        self.binding
            .slots()
            .first()
            .and_then(|s| self.nodes.get(&s.node))
            .and_then(Element::index_in_parent)
            .unwrap_or_else(|| root.child_element_count())
    }
}

fn is_child_of(el: &Element, root: &Element) -> bool {
    el.parent().is_some_and(|p| p.ptr_eq(root))
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/apply.rs"]
mod tests;
