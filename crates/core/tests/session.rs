//! Integration tests for the session task.
//!
//! These tests drive a Session through its op channel and verify:
//! - Dashboard loading and method activation
//! - Method fallback
//! - Refusals and cancellation while a run is in flight
//! - Shutdown

mod common;

use std::sync::Arc;

use common::assertions::*;
use common::fixtures::*;
use httpmock::prelude::*;
use of_core::api::DashboardClient;
use of_core::config::models::{AppConfig, ServerConfig};
use of_core::session::{Session, METHOD_LOCKED, RUN_IN_PROGRESS};
use of_core::stream::ScriptedEventSource;
use of_protocol::ipc::{Event, Op};
use of_protocol::run_models::{RunFailure, RunOutcome};
use of_protocol::topology::RuntimeStage;
use tokio::sync::mpsc;

async fn dashboard_server() -> MockServer {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/dashboard");
            then.status(200).json_body(dashboard_json());
        })
        .await;
    server
}

fn start_session(
    server: &MockServer,
    source: ScriptedEventSource,
) -> (
    mpsc::UnboundedSender<Op>,
    mpsc::Receiver<Event>,
    tokio::task::JoinHandle<()>,
) {
    let config = AppConfig {
        server: ServerConfig {
            base_url: server.base_url(),
            ..ServerConfig::default()
        },
        ..AppConfig::default()
    };
    let (op_tx, op_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(256);
    let client = DashboardClient::new(config.server.clone());
    let session = Session::new(&config, client, Arc::new(source), event_tx);
    let handle = tokio::spawn(session.run(op_rx));
    (op_tx, event_rx, handle)
}

#[tokio::test]
async fn test_load_dashboard_activates_default_method() {
    let server = dashboard_server().await;
    let (op_tx, mut event_rx, handle) = start_session(&server, ScriptedEventSource::default());

    op_tx.send(Op::LoadDashboard).expect("session alive");

    assert!(matches!(
        next_event(&mut event_rx).await,
        Event::DashboardLoaded { .. }
    ));
    match next_event(&mut event_rx).await {
        Event::MethodSelected { method_id, state } => {
            assert_eq!(method_id, "method1");
            assert_eq!(state.get(RuntimeStage::Compare).title, "3) Context Compare");
        }
        other => panic!("Expected MethodSelected, got: {:?}", other),
    }

    op_tx.send(Op::Shutdown).expect("session alive");
    handle.await.expect("session task panicked");
}

#[tokio::test]
async fn test_select_unknown_method_falls_back_to_first() {
    let server = dashboard_server().await;
    let (op_tx, mut event_rx, handle) = start_session(&server, ScriptedEventSource::default());

    op_tx.send(Op::LoadDashboard).expect("session alive");
    next_event(&mut event_rx).await;
    next_event(&mut event_rx).await;

    op_tx
        .send(Op::SelectMethod {
            method_id: "method2".to_string(),
        })
        .expect("session alive");
    match next_event(&mut event_rx).await {
        Event::MethodSelected { method_id, state } => {
            assert_eq!(method_id, "method2");
            assert_eq!(state.get(RuntimeStage::Lookup).detail, "Load rules");
        }
        other => panic!("Expected MethodSelected, got: {:?}", other),
    }

    op_tx
        .send(Op::SelectMethod {
            method_id: "method9".to_string(),
        })
        .expect("session alive");
    assert!(matches!(
        next_event(&mut event_rx).await,
        Event::MethodSelected { method_id, .. } if method_id == "method1"
    ));

    drop(op_tx);
    handle.await.expect("session task panicked");
}

#[tokio::test]
async fn test_ops_during_run_are_refused_and_cancel_aborts() {
    let server = dashboard_server().await;
    let source = ScriptedEventSource::from_lines([stage_line("received", "running")]).held_open();
    let (op_tx, mut event_rx, handle) = start_session(&server, source);

    op_tx
        .send(Op::RunUntil {
            target: RuntimeStage::Lookup,
            question: "banana milk?".to_string(),
        })
        .expect("session alive");
    assert!(matches!(
        next_event(&mut event_rx).await,
        Event::RunStarted { target: RuntimeStage::Lookup, .. }
    ));

    op_tx
        .send(Op::RunUntil {
            target: RuntimeStage::Compare,
            question: "again".to_string(),
        })
        .expect("session alive");
    op_tx
        .send(Op::SelectMethod {
            method_id: "method2".to_string(),
        })
        .expect("session alive");
    op_tx.send(Op::CancelRun).expect("session alive");

    let mut ignored = Vec::new();
    let outcome = loop {
        match next_event(&mut event_rx).await {
            Event::RunIgnored { reason } => ignored.push(reason),
            Event::RunFinished { outcome, .. } => break outcome,
            _ => {}
        }
    };

    assert_eq!(ignored, vec![RUN_IN_PROGRESS.to_string(), METHOD_LOCKED.to_string()]);
    assert_eq!(
        outcome,
        RunOutcome::Failed {
            reason: RunFailure::Aborted
        }
    );

    op_tx.send(Op::Shutdown).expect("session alive");
    handle.await.expect("session task panicked");
}

#[tokio::test]
async fn test_shutdown_during_run_stops_session() {
    let server = dashboard_server().await;
    let source = ScriptedEventSource::from_lines([stage_line("received", "running")]).held_open();
    let (op_tx, mut event_rx, handle) = start_session(&server, source);

    op_tx
        .send(Op::RunUntil {
            target: RuntimeStage::Generate,
            question: "banana milk?".to_string(),
        })
        .expect("session alive");
    next_event(&mut event_rx).await;
    op_tx.send(Op::Shutdown).expect("session alive");

    tokio::time::timeout(std::time::Duration::from_secs(1), handle)
        .await
        .expect("session did not stop")
        .expect("session task panicked");

    let events = drain(&mut event_rx);
    assert_eq!(
        finished_outcome(&events),
        Some(RunOutcome::Failed {
            reason: RunFailure::Aborted
        })
    );
}
