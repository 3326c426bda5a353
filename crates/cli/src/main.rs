use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use colored::{ColoredString, Colorize};
use of_core::api::DashboardClient;
use of_core::config::loader::load_config;
use of_core::config::models::AppConfig;
use of_core::session::Session;
use of_protocol::dashboard_models::status_label;
use of_protocol::ipc::{Event, Op};
use of_protocol::run_models::{RunOutcome, RunState, StageStatus};
use of_protocol::topology::RuntimeStage;
use tokio::sync::mpsc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

const EVENT_BUFFER: usize = 256;

#[derive(Parser, Debug)]
#[command(
    name = "ontoflow",
    version,
    about = "Watch and drive the ontology-grounded QA pipeline"
)]
struct Cli {
    /// Project directory containing `.ontoflow/config.toml`.
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,
    /// Backend base URL, overriding the config file.
    #[arg(long, global = true)]
    base_url: Option<String>,
    /// Log at DEBUG instead of INFO.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Write logs to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the terminal dashboard (default).
    Tui,
    /// Run the pipeline headless, optionally stopping after a stage.
    Run(RunArgs),
    /// List the methods described by the dashboard document.
    Methods {
        /// Print the methods as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Query the backend health probe.
    Health,
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Method to run; defaults to the configured method.
    #[arg(long)]
    method: Option<String>,
    /// Stop once this stage is done: received, lookup, compare or generate.
    #[arg(long, value_parser = parse_stage, default_value = "generate")]
    until: RuntimeStage,
    /// Question to ask; defaults to the configured question.
    question: Option<String>,
}

fn parse_stage(value: &str) -> Result<RuntimeStage, String> {
    RuntimeStage::parse(value).ok_or_else(|| {
        let known: Vec<&str> = RuntimeStage::ALL.iter().map(|s| s.as_str()).collect();
        format!("unknown stage '{value}' (expected one of: {})", known.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);

    init_logging(&command, cli.verbose, cli.log_file.as_ref())?;

    let mut config = load_config(&cli.root)
        .await
        .wrap_err_with(|| format!("failed to load config under {}", cli.root.display()))?;
    if let Some(base_url) = cli.base_url {
        config.server.base_url = base_url;
    }

    match command {
        Command::Tui => of_tui::run_app(config).await.map_err(|e| eyre!(e)),
        Command::Run(args) => run_headless(config, args).await,
        Command::Methods { json } => list_methods(&config, json).await,
        Command::Health => health(&config).await,
    }
}

/// Install the fmt subscriber.
///
/// Headless commands log to stderr. The dashboard owns the terminal, so it
/// only logs when a log file is given.
fn init_logging(command: &Command, verbose: bool, log_file: Option<&PathBuf>) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder().with_max_level(level);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
            let subscriber = builder.with_ansi(false).with_writer(Mutex::new(file)).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None if matches!(command, Command::Tui) => {}
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}

async fn run_headless(mut config: AppConfig, args: RunArgs) -> Result<()> {
    if let Some(method) = args.method {
        config.run.default_method = method;
    }
    let question = args
        .question
        .unwrap_or_else(|| config.run.default_question.clone());

    let (op_tx, op_rx) = mpsc::unbounded_channel();
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_BUFFER);
    let core = tokio::spawn(Session::from_config(&config, event_tx).run(op_rx));

    let _ = op_tx.send(Op::LoadDashboard);
    let _ = op_tx.send(Op::RunUntil {
        target: args.until,
        question,
    });

    let mut printer = TransitionPrinter::default();
    let mut outcome = None;
    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    Event::DashboardLoaded { .. } => {}
                    Event::DashboardFailed { error } => {
                        eprintln!("{} {error}", "warning:".yellow().bold());
                    }
                    Event::MethodSelected { method_id, .. } => {
                        println!("{} {method_id}", "method".dimmed());
                    }
                    Event::RunStarted { run_id, target, .. } => {
                        println!("{} {run_id} until {target}", "run".dimmed());
                    }
                    Event::RunStateChanged { state } => printer.print_changes(&state),
                    Event::AnswerReceived { answer, .. } => {
                        println!("\n{}\n{answer}\n", "Answer".bold());
                    }
                    Event::RunIgnored { reason } => {
                        eprintln!("{} {reason}", "ignored:".yellow());
                    }
                    Event::RunFinished { outcome: finished, .. } => {
                        outcome = Some(finished);
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let _ = op_tx.send(Op::CancelRun);
            }
        }
    }

    let _ = op_tx.send(Op::Shutdown);
    drop(event_rx);
    core.await.wrap_err("session task failed")?;

    match outcome {
        Some(RunOutcome::Completed { .. }) => {
            println!("{} run completed", "✓".green());
            Ok(())
        }
        Some(RunOutcome::StoppedAt { stage }) => {
            println!("{} stopped after {stage}", "✓".green());
            Ok(())
        }
        Some(RunOutcome::Failed { reason }) => Err(eyre!("run failed: {reason}")),
        None => Err(eyre!("session ended before the run finished")),
    }
}

/// Prints one line per stage whose status changed since the last snapshot.
#[derive(Default)]
struct TransitionPrinter {
    last: Option<RunState>,
}

impl TransitionPrinter {
    fn print_changes(&mut self, state: &RunState) {
        for stage in state.iter() {
            let previous = self
                .last
                .as_ref()
                .map_or(StageStatus::Prep, |last| last.status_of(stage.stage));
            if previous != stage.status {
                println!(
                    "{} {}  {}",
                    badge(stage.status),
                    stage.title,
                    stage.detail.dimmed()
                );
            }
        }
        self.last = Some(state.clone());
    }
}

fn badge(status: StageStatus) -> ColoredString {
    let text = format!("[{:<7}]", status.label());
    match status {
        StageStatus::Prep => text.dimmed(),
        StageStatus::Running => text.yellow(),
        StageStatus::Done => text.green(),
    }
}

async fn list_methods(config: &AppConfig, json: bool) -> Result<()> {
    let dashboard = DashboardClient::new(config.server.clone())
        .fetch_dashboard()
        .await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&dashboard.ontology_utilization)?
        );
        return Ok(());
    }

    if dashboard.ontology_utilization.is_empty() {
        println!("No methods reported by {}", config.server.dashboard_url());
        return Ok(());
    }
    for method in &dashboard.ontology_utilization {
        let status = dashboard
            .test_status_for(&method.method_id)
            .map_or("-", |s| status_label(&s.status));
        let nodes = method.dag.as_ref().map_or(0, |dag| dag.nodes.len());
        println!(
            "{:<10} {:<32} {:<14} {nodes:>3} nodes",
            method.method_id.bold(),
            method.method_name,
            status
        );
    }
    Ok(())
}

async fn health(config: &AppConfig) -> Result<()> {
    let report = DashboardClient::new(config.server.clone()).health().await?;
    for (key, value) in &report {
        println!("{key}: {value}");
    }
    Ok(())
}
