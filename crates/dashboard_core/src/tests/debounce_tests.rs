use super::*;
use shared::protocol::ActionKind;
use tokio::time::{advance, sleep};

fn range(action: &Action) -> (f64, f64) {
    match action.kind {
        ActionKind::ViewportChanged { min, max } => (min, max),
        ref other => panic!("unexpected action {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn only_last_range_in_window_is_sent() {
    let (mut debouncer, mut actions) = ViewportDebouncer::channel(DEFAULT_VIEWPORT_DEBOUNCE);

    debouncer.schedule(0.0, 10.0);
    advance(Duration::from_millis(100)).await;
    debouncer.schedule(0.0, 20.0);
    advance(Duration::from_millis(100)).await;
    debouncer.schedule(5.0, 30.0);
    assert!(debouncer.is_pending());

    let action = actions.recv().await.expect("settled range");
    assert_eq!(range(&action), (5.0, 30.0));

    sleep(Duration::from_secs(1)).await;
    assert!(actions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn separated_calls_each_dispatch() {
    let (mut debouncer, mut actions) = ViewportDebouncer::channel(Duration::from_millis(50));

    debouncer.schedule(0.0, 1.0);
    let first = actions.recv().await.expect("first");
    debouncer.schedule(0.0, 2.0);
    let second = actions.recv().await.expect("second");

    assert_eq!(range(&first), (0.0, 1.0));
    assert_eq!(range(&second), (0.0, 2.0));
}

#[tokio::test(start_paused = true)]
async fn cancel_drops_pending_range() {
    let (mut debouncer, mut actions) = ViewportDebouncer::channel(DEFAULT_VIEWPORT_DEBOUNCE);

    debouncer.schedule(0.0, 10.0);
    debouncer.cancel();
    assert!(!debouncer.is_pending());
    sleep(DEFAULT_VIEWPORT_DEBOUNCE * 2).await;

    assert!(actions.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn dropping_debouncer_aborts_pending_range() {
    let (mut debouncer, mut actions) = ViewportDebouncer::channel(DEFAULT_VIEWPORT_DEBOUNCE);
    debouncer.schedule(0.0, 10.0);
    drop(debouncer);

    assert!(actions.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn closed_receiver_settles_quietly() {
    let (mut debouncer, actions) = ViewportDebouncer::channel(Duration::from_millis(50));
    drop(actions);

    debouncer.schedule(0.0, 1.0);
    sleep(Duration::from_millis(100)).await;
    assert!(!debouncer.is_pending());
}
