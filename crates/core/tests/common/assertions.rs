//! Event assertion helpers for integration tests.

use of_protocol::ipc::Event;
use of_protocol::run_models::RunOutcome;
use tokio::sync::mpsc;

/// Drain every event already queued on `rx`.
#[allow(dead_code)]
pub fn drain(rx: &mut mpsc::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// The outcome carried by the last `RunFinished` event.
#[allow(dead_code)]
pub fn finished_outcome(events: &[Event]) -> Option<RunOutcome> {
    events.iter().rev().find_map(|event| match event {
        Event::RunFinished { outcome, .. } => Some(outcome.clone()),
        _ => None,
    })
}

/// Assert that a run's events start with `RunStarted` and end with `RunFinished`.
#[allow(dead_code)]
pub fn assert_run_bracketed(events: &[Event]) {
    assert!(
        matches!(events.first(), Some(Event::RunStarted { .. })),
        "First event should be RunStarted, got: {:?}",
        events.first()
    );
    assert!(
        matches!(events.last(), Some(Event::RunFinished { .. })),
        "Last event should be RunFinished, got: {:?}",
        events.last()
    );
}

/// Wait for the next event, failing the test after a second.
#[allow(dead_code)]
pub async fn next_event(rx: &mut mpsc::Receiver<Event>) -> Event {
    tokio::time::timeout(std::time::Duration::from_secs(1), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event channel closed")
}
