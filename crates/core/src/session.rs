//! Session driver.
//!
//! The Session is the core task behind a user interface. It owns the
//! dashboard document, the selected method and the run state, and turns the
//! [`Op`]s it receives into dashboard fetches, method switches and runs.
//! While a run is in flight it keeps reading ops so the run can be cancelled.

use std::sync::Arc;

use of_protocol::dashboard_models::DashboardPayload;
use of_protocol::ipc::{Event, Op};
use of_protocol::run_models::RunState;
use of_protocol::topology::{MethodDag, RuntimeStage};
use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::DashboardClient;
use crate::config::models::AppConfig;
use crate::run::{RunController, RunRequest};
use crate::stages::build_stage_template;
use crate::stream::{EventSource, HttpEventSource};

/// Reason reported when a second run is requested.
pub const RUN_IN_PROGRESS: &str = "A run is already in progress.";

/// Reason reported when the method is changed during a run.
pub const METHOD_LOCKED: &str = "The method cannot be changed while a run is in progress.";

/// Reason reported when the dashboard is refreshed during a run.
pub const REFRESH_LOCKED: &str = "The dashboard cannot be reloaded while a run is in progress.";

/// Core state behind one operator session.
pub struct Session {
    client: DashboardClient,
    controller: RunController,
    events_tx: Sender<Event>,
    dashboard: Option<DashboardPayload>,
    method_id: String,
    state: RunState,
}

impl Session {
    /// Create a session against the configured backend.
    pub fn from_config(config: &AppConfig, events_tx: Sender<Event>) -> Self {
        let http = reqwest::Client::new();
        let client = DashboardClient::with_client(http.clone(), config.server.clone());
        let source = Arc::new(HttpEventSource::with_client(http, &config.server));
        Self::new(config, client, source, events_tx)
    }

    /// Create a session with an explicit dashboard client and event source.
    pub fn new(
        config: &AppConfig,
        client: DashboardClient,
        source: Arc<dyn EventSource>,
        events_tx: Sender<Event>,
    ) -> Self {
        Self {
            client,
            controller: RunController::new(source, events_tx.clone()),
            events_tx,
            dashboard: None,
            method_id: config.run.default_method.clone(),
            state: build_stage_template(None),
        }
    }

    /// Process ops until `Shutdown` is received or the op channel closes.
    pub async fn run(mut self, mut op_rx: UnboundedReceiver<Op>) {
        info!(method_id = %self.method_id, "session started");

        while let Some(op) = op_rx.recv().await {
            match op {
                Op::LoadDashboard => self.load_dashboard().await,
                Op::SelectMethod { method_id } => self.select_method(&method_id).await,
                Op::RunUntil { target, question } => {
                    if self.run_until(target, question, &mut op_rx).await {
                        break;
                    }
                }
                Op::CancelRun => debug!("cancel requested with no run in flight"),
                Op::Shutdown => break,
            }
        }

        info!("session stopped");
    }

    async fn load_dashboard(&mut self) {
        match self.client.fetch_dashboard().await {
            Ok(dashboard) => {
                info!(
                    methods = dashboard.ontology_utilization.len(),
                    "dashboard loaded"
                );
                notify(
                    &self.events_tx,
                    Event::DashboardLoaded {
                        dashboard: dashboard.clone(),
                    },
                )
                .await;
                self.dashboard = Some(dashboard);

                let method_id = self.method_id.clone();
                self.select_method(&method_id).await;
            }
            Err(e) => {
                warn!(error = %e, "failed to load dashboard");
                notify(
                    &self.events_tx,
                    Event::DashboardFailed {
                        error: e.to_string(),
                    },
                )
                .await;
            }
        }
    }

    /// Activate a method and replace the run state with its fresh template.
    ///
    /// Unknown ids fall back to the first method of the dashboard.
    async fn select_method(&mut self, requested: &str) {
        let method_id = self
            .dashboard
            .as_ref()
            .and_then(|d| d.method(requested))
            .map(|m| m.method_id.clone())
            .unwrap_or_else(|| requested.to_string());

        if method_id != requested {
            debug!(requested, resolved = %method_id, "unknown method, using fallback");
        }

        self.state = build_stage_template(self.topology(&method_id).as_ref());
        self.method_id = method_id.clone();

        notify(
            &self.events_tx,
            Event::MethodSelected {
                method_id,
                state: self.state.clone(),
            },
        )
        .await;
    }

    fn topology(&self, method_id: &str) -> Option<MethodDag> {
        self.dashboard
            .as_ref()
            .and_then(|d| d.method(method_id))
            .and_then(|m| m.dag.clone())
    }

    /// Drive one run to completion while still serving ops.
    ///
    /// Returns `true` when a shutdown was requested meanwhile.
    async fn run_until(
        &mut self,
        target: RuntimeStage,
        question: String,
        op_rx: &mut UnboundedReceiver<Op>,
    ) -> bool {
        let request = RunRequest {
            target,
            question,
            method_id: self.method_id.clone(),
            topology: self.topology(&self.method_id),
        };
        let cancel = CancellationToken::new();
        let controller = self.controller.clone();
        let events_tx = self.events_tx.clone();

        let run = controller.run(request, &mut self.state, cancel.clone());
        tokio::pin!(run);

        let mut shutdown = false;
        let mut ops_open = true;
        loop {
            tokio::select! {
                _ = &mut run => break,
                op = op_rx.recv(), if ops_open => match op {
                    Some(Op::RunUntil { .. }) => ignore(&events_tx, RUN_IN_PROGRESS).await,
                    Some(Op::SelectMethod { .. }) => ignore(&events_tx, METHOD_LOCKED).await,
                    Some(Op::LoadDashboard) => ignore(&events_tx, REFRESH_LOCKED).await,
                    Some(Op::CancelRun) => {
                        info!("cancelling run");
                        cancel.cancel();
                    }
                    Some(Op::Shutdown) => {
                        cancel.cancel();
                        shutdown = true;
                    }
                    None => {
                        cancel.cancel();
                        ops_open = false;
                        shutdown = true;
                    }
                },
            }
        }

        shutdown
    }
}

async fn notify(events_tx: &Sender<Event>, event: Event) {
    let _ = events_tx.send(event).await;
}

async fn ignore(events_tx: &Sender<Event>, reason: &str) {
    debug!(reason, "op ignored");
    notify(
        events_tx,
        Event::RunIgnored {
            reason: reason.to_string(),
        },
    )
    .await;
}
