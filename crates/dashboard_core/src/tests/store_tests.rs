use super::*;
use crate::actions;
use shared::{
    domain::{PositionId, RegionId},
    protocol::ActionKind,
};
use std::{cell::RefCell, rc::Rc};

fn p(id: &str) -> PositionId {
    PositionId::from(id)
}

fn recorder(log: &Rc<RefCell<Vec<String>>>, tag: &'static str) -> impl StoreListener {
    let log = Rc::clone(log);
    move |state: &State| -> Vec<Action> {
        let action = state.last_action().map(Action::type_name).unwrap_or("-");
        log.borrow_mut().push(format!("{tag}:{action}"));
        Vec::new()
    }
}

#[test]
fn dispatch_replaces_state_and_notifies_in_subscription_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut store = Store::new();
    store.subscribe(recorder(&log, "a"));
    store.subscribe(recorder(&log, "b"));

    store.dispatch(actions::viewport_changed(0.0, 100.0));

    assert_eq!(store.get_state().view.viewport.max, 100.0);
    assert_eq!(
        *log.borrow(),
        vec!["a:VIEWPORT_CHANGED".to_string(), "b:VIEWPORT_CHANGED".to_string()]
    );
}

#[test]
fn snapshots_are_not_live() {
    let mut store = Store::new();
    let before = store.get_state();
    store.dispatch(actions::tap(10.0, p("P1"), "chart"));

    assert_eq!(before.interaction.tap.timestamp, None);
    assert_eq!(store.get_state().interaction.tap.timestamp, Some(10.0));
}

#[test]
fn unsubscribe_stops_notifications() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut store = Store::new();
    let subscription = store.subscribe(recorder(&log, "a"));

    store.dispatch(actions::tap_cleared());
    assert!(store.unsubscribe(subscription));
    assert!(!store.unsubscribe(subscription));
    store.dispatch(actions::tap_cleared());

    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn follow_ups_run_after_the_current_round() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut store = Store::new();
    store.subscribe(|state: &State| match state.last_action().map(|a| &a.kind) {
        Some(ActionKind::ViewportChanged { .. }) => vec![actions::step_size_calculated(250.0)],
        _ => Vec::new(),
    });
    store.subscribe(recorder(&log, "late"));

    store.dispatch(actions::viewport_changed(0.0, 10.0));

    assert_eq!(
        *log.borrow(),
        vec![
            "late:VIEWPORT_CHANGED".to_string(),
            "late:STEP_SIZE_CALCULATED".to_string()
        ]
    );
    assert_eq!(
        store.get_state().interaction.keyboard.step_size_ms,
        Some(250.0)
    );
}

#[test]
fn run_dispatches_planned_actions_in_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut store = Store::new();
    store.dispatch(actions::region_add(p("P1"), 1_000.0, 2_000.0));
    store.subscribe(recorder(&log, "s"));

    let dispatched = store.run(&Intent::HandleTap {
        timestamp: 1_500.0,
        position_id: p("P1"),
        chart_name: "P1_overview".to_string(),
        modifiers: Default::default(),
    });

    assert_eq!(dispatched, 2);
    assert_eq!(
        *log.borrow(),
        vec!["s:REGION_SELECTED".to_string(), "s:TAP".to_string()]
    );
    let state = store.get_state();
    assert_eq!(state.regions.selected_id, Some(RegionId(1)));
    assert_eq!(state.interaction.tap.timestamp, Some(1_500.0));
}

#[test]
fn declined_intent_dispatches_nothing() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut store = Store::new();
    store.subscribe(recorder(&log, "s"));

    let dispatched = store.run(&Intent::CreateRegion {
        position_id: p("P1"),
        start: 1_000.0,
        end: 1_050.0,
    });

    assert_eq!(dispatched, 0);
    assert!(log.borrow().is_empty());
}
