use super::*;

#[test]
fn push_and_remove() {
    let mut list: CallbackList<u32> = CallbackList::default();
    let a = list.push(1);
    let b = list.push(2);
    assert_ne!(a, b);
    assert_eq!(list.len(), 2);
    assert!(list.remove(a));
    assert!(!list.remove(a));
    assert_eq!(list.len(), 1);
}

#[test]
fn mutation_during_run_is_merged_after() {
    let mut list: CallbackList<&'static str> = CallbackList::default();
    let a = list.push("a");
    let b = list.push("b");

    let taken = list.take_for_run();
    assert!(list.is_running());
    let c = list.push("c");
    assert!(list.remove(b));
    assert!(list.is_cancelled(b));
    assert!(!list.is_cancelled(a));
    assert_eq!(list.len(), 2);
    list.finish_run(taken);

    assert!(!list.is_running());
    let order: Vec<CallbackId> = list.take_for_run().iter().map(|(id, _)| *id).collect();
    assert_eq!(order, vec![a, c]);
}

#[test]
fn clear_during_run_cancels_running_entries() {
    let mut list: CallbackList<u8> = CallbackList::default();
    list.push(1);
    let taken = list.take_for_run();
    list.clear();
    list.finish_run(taken);
    assert_eq!(list.len(), 0);
}
