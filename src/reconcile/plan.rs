//! Pure reconciliation: previous binding plus current ids in, new binding plus operations out.
//!
//! Operations are expressed against a child list that starts out as the previous binding's
//! slots. Applying them in order (insert at `index`, move to `to`, remove) yields a child
//! list matching the new binding exactly.

use std::collections::{HashMap, HashSet};

use crate::foundation::core::ElementId;

/// Identity of a bound platform node, stable across passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeKey(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Slot {
    pub node: NodeKey,
    /// Element bound in keyed mode. Positional slots record the last element they showed.
    pub key: Option<ElementId>,
}

/// Ordered node slots, as they sit under the root after the last pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Binding {
    slots: Vec<Slot>,
    /// First slot bound to each element.
    index: HashMap<ElementId, NodeKey>,
    next_node: u64,
}

impl Binding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn node_for(&self, id: &ElementId) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    fn reindex(&mut self) {
        self.index.clear();
        for slot in &self.slots {
            if let Some(key) = &slot.key {
                self.index.entry(key.clone()).or_insert(slot.node);
            }
        }
    }

    fn alloc(&mut self) -> NodeKey {
        self.next_node += 1;
        NodeKey(self.next_node)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReconcileMode {
    /// Reuse nodes by position. Cheap, but per-node state follows the slot, not the element.
    #[default]
    Positional,
    /// One node per element id; nodes follow their element through reorderings.
    Keyed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOp {
    Create {
        node: NodeKey,
        key: ElementId,
        index: usize,
    },
    Update {
        node: NodeKey,
        key: ElementId,
        index: usize,
    },
    Move {
        node: NodeKey,
        key: ElementId,
        to: usize,
    },
    Remove {
        node: NodeKey,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub created: usize,
    pub updated: usize,
    pub moved: usize,
    pub removed: usize,
}

impl ReconcileStats {
    /// Whether the pass changed the node structure at all.
    pub fn is_structural_noop(&self) -> bool {
        self.created == 0 && self.moved == 0 && self.removed == 0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reconciliation {
    pub binding: Binding,
    pub ops: Vec<ReconcileOp>,
}

impl Reconciliation {
    pub fn stats(&self) -> ReconcileStats {
        let mut stats = ReconcileStats::default();
        for op in &self.ops {
            match op {
                ReconcileOp::Create { .. } => stats.created += 1,
                ReconcileOp::Update { .. } => stats.updated += 1,
                ReconcileOp::Move { .. } => stats.moved += 1,
                ReconcileOp::Remove { .. } => stats.removed += 1,
            }
        }
        stats
    }
}

/// Ids in the order a pass visits them: all of them positionally, first occurrences when keyed.
pub(crate) fn visit_order(ids: &[ElementId], mode: ReconcileMode) -> Vec<usize> {
    match mode {
        ReconcileMode::Positional => (0..ids.len()).collect(),
        ReconcileMode::Keyed => {
            let mut seen = HashSet::with_capacity(ids.len());
            (0..ids.len()).filter(|&i| seen.insert(&ids[i])).collect()
        }
    }
}

pub fn reconcile(prev: &Binding, ids: &[ElementId], mode: ReconcileMode) -> Reconciliation {
    let mut binding = prev.clone();
    let mut ops = Vec::new();
    let order = visit_order(ids, mode);

    match mode {
        ReconcileMode::Positional => {
            for (index, &i) in order.iter().enumerate() {
                let key = ids[i].clone();
                if let Some(slot) = binding.slots.get_mut(index) {
                    slot.key = Some(key.clone());
                    ops.push(ReconcileOp::Update {
                        node: slot.node,
                        key,
                        index,
                    });
                } else {
                    let node = binding.alloc();
                    binding.slots.push(Slot {
                        node,
                        key: Some(key.clone()),
                    });
                    ops.push(ReconcileOp::Create { node, key, index });
                }
            }
        }
        ReconcileMode::Keyed => {
            // Walk the old order with a cursor: the first untaken old slot is the node that
            // currently sits at `index`, so anything else has to move there.
            let old = std::mem::take(&mut binding.slots);
            let mut by_key: HashMap<&ElementId, usize> = HashMap::with_capacity(old.len());
            for (at, slot) in old.iter().enumerate() {
                if let Some(key) = &slot.key {
                    by_key.entry(key).or_insert(at);
                }
            }
            let mut taken = vec![false; old.len()];
            let mut cursor = 0;
            let mut slots = Vec::with_capacity(order.len());

            for (index, &i) in order.iter().enumerate() {
                let key = &ids[i];
                while cursor < old.len() && taken[cursor] {
                    cursor += 1;
                }
                match by_key.get(key).copied().filter(|&at| !taken[at]) {
                    Some(at) => {
                        taken[at] = true;
                        let node = old[at].node;
                        if at != cursor {
                            ops.push(ReconcileOp::Move {
                                node,
                                key: key.clone(),
                                to: index,
                            });
                        }
                        ops.push(ReconcileOp::Update {
                            node,
                            key: key.clone(),
                            index,
                        });
                        slots.push(Slot {
                            node,
                            key: Some(key.clone()),
                        });
                    }
                    None => {
                        let node = binding.alloc();
                        ops.push(ReconcileOp::Create {
                            node,
                            key: key.clone(),
                            index,
                        });
                        slots.push(Slot {
                            node,
                            key: Some(key.clone()),
                        });
                    }
                }
            }

            for (slot, &kept) in old.iter().zip(&taken) {
                if !kept {
                    ops.push(ReconcileOp::Remove { node: slot.node });
                }
            }
            binding.slots = slots;
        }
    }

    for stale in binding.slots.split_off(order.len()) {
        ops.push(ReconcileOp::Remove { node: stale.node });
    }
    binding.reindex();

    Reconciliation { binding, ops }
}

#[cfg(test)]
#[path = "../../tests/unit/reconcile/plan.rs"]
mod tests;
