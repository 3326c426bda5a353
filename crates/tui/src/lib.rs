//! # of-tui
//!
//! Terminal dashboard for ontoflow.
//!
//! This crate renders the method list, the task graph, the run stages and
//! the keyword trace, and lets the operator run the pipeline up to any
//! stage. It talks to the `of-core` session through channels using the
//! `Op` and `Event` protocol defined in `of-protocol`.

pub mod app;
pub mod event;
pub mod event_handler;
pub mod tui;
pub mod view;
pub mod widgets;

pub use app::App;
pub use tui::Tui;

use anyhow::Result;
use of_core::config::models::AppConfig;
use of_core::session::Session;
use of_protocol::ipc::Op;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Capacity of the core-to-TUI event channel.
const EVENT_BUFFER: usize = 256;

/// Start a core session, run the dashboard until the user quits, then shut
/// the session down.
pub async fn run_app(config: AppConfig) -> Result<()> {
    let (op_tx, op_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);

    let session = Session::from_config(&config, event_tx);
    let core = tokio::spawn(session.run(op_rx));
    let _ = op_tx.send(Op::LoadDashboard);

    let mut app = App::new(&config, op_tx.clone(), event_rx);
    let result = {
        let mut tui = Tui::init()?;
        app.run(&mut tui).await
    };

    let _ = op_tx.send(Op::Shutdown);
    // The session may be waiting on a full event channel.
    drop(app);
    if let Err(e) = core.await {
        warn!(error = %e, "session task failed");
    }
    info!("dashboard closed");

    result
}
