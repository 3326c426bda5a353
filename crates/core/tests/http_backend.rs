//! HTTP contract tests against a mock backend.
//!
//! These tests verify:
//! - The chat request body and the NDJSON response handling
//! - Non-success statuses on the stream endpoint
//! - The dashboard and health endpoints

mod common;

use std::sync::Arc;

use common::assertions::*;
use common::fixtures::*;
use httpmock::prelude::*;
use of_core::api::{ApiError, DashboardClient};
use of_core::config::models::ServerConfig;
use of_core::run::{RunController, RunRequest};
use of_core::stages::build_stage_template;
use of_core::stream::HttpEventSource;
use of_protocol::run_models::{RunFailure, RunOutcome, StageStatus};
use of_protocol::topology::RuntimeStage;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

fn server_config(server: &MockServer) -> ServerConfig {
    ServerConfig {
        base_url: server.base_url(),
        ..ServerConfig::default()
    }
}

fn request(target: RuntimeStage) -> RunRequest {
    RunRequest {
        target,
        question: " What is the price of banana milk? ".to_string(),
        method_id: "method1".to_string(),
        topology: Some(sample_dag()),
    }
}

#[tokio::test]
async fn test_stream_endpoint_full_run() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat/stream").json_body(json!({
                "question": "What is the price of banana milk?",
                "method_id": "method1"
            }));
            then.status(200)
                .header("content-type", "application/x-ndjson")
                .body(ndjson(&full_run_lines()));
        })
        .await;

    let (tx, mut rx) = mpsc::channel(256);
    let source = HttpEventSource::new(&server_config(&server));
    let controller = RunController::new(Arc::new(source), tx);
    let mut state = build_stage_template(None);

    let outcome = controller
        .run(request(RuntimeStage::Generate), &mut state, CancellationToken::new())
        .await;

    mock.assert_async().await;
    assert_eq!(
        outcome,
        Some(RunOutcome::Completed {
            answer: Some("Banana milk costs 1,500 KRW.".to_string())
        })
    );
    assert_eq!(state.status_of(RuntimeStage::Generate), StageStatus::Done);
    assert_run_bracketed(&drain(&mut rx));
}

#[tokio::test]
async fn test_stream_endpoint_partial_run() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat/stream");
            then.status(200).body(ndjson(&full_run_lines()));
        })
        .await;

    let (tx, _rx) = mpsc::channel(256);
    let source = HttpEventSource::new(&server_config(&server));
    let controller = RunController::new(Arc::new(source), tx);
    let mut state = build_stage_template(None);

    let outcome = controller
        .run(request(RuntimeStage::Compare), &mut state, CancellationToken::new())
        .await;

    assert_eq!(
        outcome,
        Some(RunOutcome::StoppedAt {
            stage: RuntimeStage::Compare
        })
    );
    assert_eq!(state.status_of(RuntimeStage::Generate), StageStatus::Prep);
}

#[tokio::test]
async fn test_stream_endpoint_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/api/chat/stream");
            then.status(500).body("internal error");
        })
        .await;

    let (tx, _rx) = mpsc::channel(256);
    let source = HttpEventSource::new(&server_config(&server));
    let controller = RunController::new(Arc::new(source), tx);
    let mut state = build_stage_template(None);

    let outcome = controller
        .run(request(RuntimeStage::Lookup), &mut state, CancellationToken::new())
        .await
        .expect("run accepted");

    assert!(matches!(
        outcome.failure(),
        Some(RunFailure::Transport { message }) if message.contains("500")
    ));
    assert!(!controller.is_running());
}

#[tokio::test]
async fn test_fetch_dashboard() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/dashboard");
            then.status(200).json_body(dashboard_json());
        })
        .await;

    let client = DashboardClient::new(server_config(&server));
    let dashboard = client.fetch_dashboard().await.expect("dashboard fetched");

    mock.assert_async().await;
    assert_eq!(dashboard.ontology_utilization.len(), 2);
    let dag = dashboard
        .method("method1")
        .and_then(|m| m.dag.as_ref())
        .expect("method1 has a dag");
    assert_eq!(dag.nodes.len(), 5);
}

#[tokio::test]
async fn test_fetch_dashboard_error_status() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/dashboard");
            then.status(404);
        })
        .await;

    let client = DashboardClient::new(server_config(&server));
    let result = client.fetch_dashboard().await;

    assert!(matches!(result, Err(ApiError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/health");
            then.status(200).json_body(json!({ "status": "ok" }));
        })
        .await;

    let client = DashboardClient::new(server_config(&server));
    let health = client.health().await.expect("health fetched");

    assert_eq!(health.get("status").map(String::as_str), Some("ok"));
}
