use std::cell::Cell;

use super::*;

#[test]
fn delivers_only_matching_kind() {
    let bus = EventBus::new();
    let hits = Rc::new(Cell::new(0));
    let h = hits.clone();
    let sub = bus.subscribe(EventKind::Render, move |_: &HostEvent| h.set(h.get() + 1));

    bus.emit(&HostEvent::Render);
    bus.emit(&HostEvent::Destroy);
    assert_eq!(hits.get(), 1);

    sub.unsubscribe();
    bus.emit(&HostEvent::Render);
    assert_eq!(hits.get(), 1);
    assert_eq!(bus.handler_count(), 0);
}

#[test]
fn handler_removed_during_emit_is_skipped() {
    let bus = EventBus::new();
    let second_calls = Rc::new(Cell::new(0));
    let pending: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

    let p = pending.clone();
    let _first = bus.subscribe(
        EventKind::Render,
        move |_: &HostEvent| {
            if let Some(s) = p.borrow_mut().take() {
                s.unsubscribe();
            }
        },
    );
    let c = second_calls.clone();
    let second = bus.subscribe(EventKind::Render, move |_: &HostEvent| c.set(c.get() + 1));
    *pending.borrow_mut() = Some(second);

    bus.emit(&HostEvent::Render);
    assert_eq!(second_calls.get(), 0);
    assert_eq!(bus.handler_count_for(EventKind::Render), 1);
}

#[test]
fn subscription_outliving_bus_is_harmless() {
    let sub = {
        let bus = EventBus::new();
        bus.subscribe(EventKind::Destroy, |_: &HostEvent| {})
    };
    sub.unsubscribe();
}

#[test]
fn event_kinds_match_variants() {
    let ids = vec![ElementId::from("a")];
    assert_eq!(HostEvent::Add(ids.clone()).kind(), EventKind::Add);
    assert_eq!(HostEvent::Remove(ids.clone()).kind(), EventKind::Remove);
    assert_eq!(HostEvent::Position(ids).kind(), EventKind::Position);
    assert_eq!(
        HostEvent::Viewport {
            pan: Vec2::ZERO,
            zoom: 1.0
        }
        .kind(),
        EventKind::Viewport
    );
}
