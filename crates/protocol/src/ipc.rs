//! Inter-task communication protocol.
//!
//! This module defines the message types for asynchronous communication
//! between the TUI (user interface) and the Core session.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from TUI to Core
//! - `Event`: Status updates sent from Core to TUI
//!
//! Communication is channel-based, so the UI stays responsive while the
//! core is suspended on the event stream of a running pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::dashboard_models::DashboardPayload;
use crate::run_models::{RunOutcome, RunState};
use crate::topology::RuntimeStage;

/// Operations sent from the UI (TUI) to the Core session.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "runUntil",
///   "payload": {
///     "target": "lookup",
///     "question": "What does banana milk cost?"
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Fetch (or re-fetch) the dashboard document.
    LoadDashboard,

    /// Switch the active method.
    ///
    /// Replaces the run state with the new method's stage template.
    SelectMethod { method_id: String },

    /// Run the pipeline until `target` reports completion.
    ///
    /// Ignored while another run is in flight.
    RunUntil {
        target: RuntimeStage,
        question: String,
    },

    /// Cancel the run in flight, if any.
    CancelRun,

    /// Shut down the session. A run in flight is cancelled.
    Shutdown,
}

/// Events sent from the Core session to the UI (TUI).
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "runFinished",
///   "payload": {
///     "run_id": "uuid-here",
///     "outcome": { "type": "stoppedAt", "payload": { "stage": "lookup" } }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// The dashboard document has been fetched.
    DashboardLoaded { dashboard: DashboardPayload },

    /// The dashboard document could not be fetched.
    DashboardFailed { error: String },

    /// A method became active; `state` is its fresh stage template.
    MethodSelected { method_id: String, state: RunState },

    /// A run has been accepted and its request is about to be sent.
    RunStarted {
        #[ts(type = "string")]
        run_id: Uuid,
        target: RuntimeStage,
        question: String,
        started_at: DateTime<Utc>,
    },

    /// The run state changed.
    ///
    /// Always carries a whole snapshot so one wire event is never observed
    /// as two partial updates.
    RunStateChanged { state: RunState },

    /// The backend delivered the final answer.
    AnswerReceived {
        #[ts(type = "string")]
        run_id: Uuid,
        answer: String,
    },

    /// A run has ended, successfully, by intentional stop, or by failure.
    RunFinished {
        #[ts(type = "string | null")]
        run_id: Option<Uuid>,
        outcome: RunOutcome,
    },

    /// A request was refused because of the current session state.
    RunIgnored { reason: String },
}
