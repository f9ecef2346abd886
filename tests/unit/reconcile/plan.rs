use super::*;

fn ids(list: &[&str]) -> Vec<ElementId> {
    list.iter().map(|s| ElementId::new(*s)).collect()
}

fn keys(binding: &Binding) -> Vec<String> {
    binding
        .slots()
        .iter()
        .map(|s| s.key.as_ref().map(|k| k.to_string()).unwrap_or_default())
        .collect()
}

/// Replays ops on the previous node order, the way the element applier does.
fn replay(prev: &Binding, ops: &[ReconcileOp]) -> Vec<NodeKey> {
    let mut nodes: Vec<NodeKey> = prev.slots().iter().map(|s| s.node).collect();
    for op in ops {
        match op {
            ReconcileOp::Create { node, index, .. } => nodes.insert(*index, *node),
            ReconcileOp::Move { node, to, .. } => {
                let at = nodes.iter().position(|n| n == node).expect("moved node present");
                nodes.remove(at);
                nodes.insert(*to, *node);
            }
            ReconcileOp::Remove { node } => nodes.retain(|n| n != node),
            ReconcileOp::Update { .. } => {}
        }
    }
    nodes
}

#[test]
fn positional_creates_then_reuses_slots() {
    let first = reconcile(&Binding::new(), &ids(&["a", "b"]), ReconcileMode::Positional);
    assert_eq!(
        first.stats(),
        ReconcileStats {
            created: 2,
            ..Default::default()
        }
    );

    let second = reconcile(&first.binding, &ids(&["b", "a", "c"]), ReconcileMode::Positional);
    let stats = second.stats();
    assert_eq!(stats.created, 1);
    assert_eq!(stats.updated, 2);
    assert_eq!(stats.moved, 0);
    assert_eq!(second.binding.slots()[0].node, first.binding.slots()[0].node);
    assert_eq!(keys(&second.binding), vec!["b", "a", "c"]);
}

#[test]
fn positional_removes_leftovers() {
    let first = reconcile(&Binding::new(), &ids(&["a", "b", "c"]), ReconcileMode::Positional);
    let second = reconcile(&first.binding, &ids(&["x"]), ReconcileMode::Positional);
    assert_eq!(second.stats().removed, 2);
    assert_eq!(second.binding.len(), 1);
    assert_eq!(replay(&first.binding, &second.ops), vec![first.binding.slots()[0].node]);
}

#[test]
fn keyed_identity_survives_permutation() {
    let first = reconcile(&Binding::new(), &ids(&["a", "b", "c"]), ReconcileMode::Keyed);
    let a = first.binding.node_for(&"a".into()).unwrap();
    let c = first.binding.node_for(&"c".into()).unwrap();

    let second = reconcile(&first.binding, &ids(&["c", "a"]), ReconcileMode::Keyed);
    assert_eq!(second.binding.node_for(&"a".into()), Some(a));
    assert_eq!(second.binding.node_for(&"c".into()), Some(c));
    assert_eq!(second.stats().created, 0);
    assert_eq!(second.stats().removed, 1);
    assert_eq!(keys(&second.binding), vec!["c", "a"]);

    let replayed = replay(&first.binding, &second.ops);
    let expected: Vec<NodeKey> = second.binding.slots().iter().map(|s| s.node).collect();
    assert_eq!(replayed, expected);
}

#[test]
fn keyed_is_idempotent() {
    let first = reconcile(&Binding::new(), &ids(&["a", "b", "c"]), ReconcileMode::Keyed);
    let again = reconcile(&first.binding, &ids(&["a", "b", "c"]), ReconcileMode::Keyed);
    assert_eq!(again.binding, first.binding);
    assert!(again.stats().is_structural_noop());
    assert_eq!(again.stats().updated, 3);
}

#[test]
fn keyed_dedupes_first_occurrence() {
    let r = reconcile(&Binding::new(), &ids(&["a", "b", "a"]), ReconcileMode::Keyed);
    assert_eq!(keys(&r.binding), vec!["a", "b"]);
    assert_eq!(r.stats().created, 2);
}

#[test]
fn positional_does_not_dedupe() {
    let r = reconcile(&Binding::new(), &ids(&["a", "a"]), ReconcileMode::Positional);
    assert_eq!(r.binding.len(), 2);
}

#[test]
fn keyed_new_ids_get_fresh_nodes() {
    let first = reconcile(&Binding::new(), &ids(&["a"]), ReconcileMode::Keyed);
    let second = reconcile(&first.binding, &ids(&["b", "a"]), ReconcileMode::Keyed);
    let a0 = first.binding.node_for(&"a".into()).unwrap();
    let b = second.binding.node_for(&"b".into()).unwrap();
    assert_ne!(a0, b);
    assert_eq!(second.binding.node_for(&"a".into()), Some(a0));
    let replayed = replay(&first.binding, &second.ops);
    assert_eq!(replayed, vec![b, a0]);
}

#[test]
fn keyed_large_reversal_looks_up_by_id() {
    let forward: Vec<ElementId> = (0..5000).map(|i| ElementId::new(format!("n{i}"))).collect();
    let first = reconcile(&Binding::new(), &forward, ReconcileMode::Keyed);
    let nodes: Vec<NodeKey> = forward
        .iter()
        .map(|id| first.binding.node_for(id).unwrap())
        .collect();

    let reversed: Vec<ElementId> = forward.iter().rev().cloned().collect();
    let second = reconcile(&first.binding, &reversed, ReconcileMode::Keyed);
    let stats = second.stats();
    assert_eq!(stats.created, 0);
    assert_eq!(stats.removed, 0);
    assert_eq!(stats.moved, 4999);
    for (id, node) in forward.iter().zip(&nodes) {
        assert_eq!(second.binding.node_for(id), Some(*node));
    }
    let order: Vec<NodeKey> = second.binding.slots().iter().map(|s| s.node).collect();
    assert_eq!(order, nodes.into_iter().rev().collect::<Vec<_>>());
}

#[test]
fn node_for_tracks_the_first_positional_slot() {
    let first = reconcile(&Binding::new(), &ids(&["a", "b", "a"]), ReconcileMode::Positional);
    let slot0 = first.binding.slots()[0].node;
    assert_eq!(first.binding.node_for(&"a".into()), Some(slot0));

    let second = reconcile(&first.binding, &ids(&["c"]), ReconcileMode::Positional);
    assert_eq!(second.binding.node_for(&"c".into()), Some(slot0));
    assert_eq!(second.binding.node_for(&"a".into()), None);
    assert_eq!(second.binding.node_for(&"b".into()), None);
}

#[test]
fn empty_input_removes_everything() {
    let first = reconcile(&Binding::new(), &ids(&["a", "b"]), ReconcileMode::Keyed);
    let second = reconcile(&first.binding, &[], ReconcileMode::Keyed);
    assert!(second.binding.is_empty());
    assert_eq!(second.stats().removed, 2);
}

#[test]
fn mode_uses_kebab_case_names() {
    let m: ReconcileMode = serde_json::from_str("\"keyed\"").unwrap();
    assert_eq!(m, ReconcileMode::Keyed);
    assert_eq!(ReconcileMode::default(), ReconcileMode::Positional);
}
