//! TUI application state and event loop.
//!
//! This module defines the main `App` struct that owns the dashboard view
//! and multiplexes core events and terminal input with `tokio::select!`.

use anyhow::Result;
use crossterm::event::KeyEvent;
use of_core::config::models::AppConfig;
use of_protocol::ipc::{Event, Op};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::select;
use tokio::sync::mpsc::{Receiver, UnboundedSender};
use tokio_stream::StreamExt;

use crate::event_handler;
use crate::tui::{Tui, TuiEvent};
use crate::view::{DashboardView, Focus};
use crate::widgets::graph_view::render_graph;
use crate::widgets::method_panel::render_method_panel;
use crate::widgets::overview::render_overview;
use crate::widgets::stage_panel::render_stage_panel;
use crate::widgets::trace_panel::render_trace_panel;
use crate::widgets::PayloadView;

const KEY_HINTS: &str = concat!(
    "Tab focus | ↑/↓ select | Enter run | Shift+←→↑↓ move node | ",
    "x example | n next sample | c cancel | o overview | q quit",
);

/// Main TUI application state.
pub struct App {
    /// Everything the dashboard renders.
    pub view: DashboardView,
    /// Scroll state of the stage payload view.
    pub payload_view: PayloadView,
    /// Channel to send operations to the core.
    pub op_tx: UnboundedSender<Op>,
    /// Channel to receive events from the core.
    pub event_rx: Receiver<Event>,
    /// Flag to indicate if the application should exit.
    pub should_exit: bool,
}

impl App {
    pub fn new(config: &AppConfig, op_tx: UnboundedSender<Op>, event_rx: Receiver<Event>) -> Self {
        Self {
            view: DashboardView::new(config),
            payload_view: PayloadView::new(),
            op_tx,
            event_rx,
            should_exit: false,
        }
    }

    /// Main event loop.
    ///
    /// Runs until the user quits or the core session goes away.
    pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
        let mut tui_events = tui.event_stream();

        tui.frame_requester().schedule_frame();

        while !self.should_exit {
            select! {
                Some(event) = self.event_rx.recv() => {
                    self.handle_core_event(event);
                    tui.frame_requester().schedule_frame();
                }
                Some(tui_event) = tui_events.next() => {
                    self.handle_tui_event(tui, tui_event)?;
                }
                else => self.should_exit = true,
            }
        }

        Ok(())
    }

    fn handle_core_event(&mut self, event: Event) {
        event_handler::handle_core_event(&mut self.view, event);
    }

    fn handle_tui_event(&mut self, tui: &mut Tui, event: TuiEvent) -> Result<()> {
        match event {
            TuiEvent::Key(key_event) => {
                self.handle_key_event(key_event);
                tui.frame_requester().schedule_frame();
            }
            TuiEvent::Paste(text) => {
                if self.view.focus == Focus::Question {
                    text.chars()
                        .filter(|c| !c.is_control())
                        .for_each(|c| self.view.question.insert_char(c));
                    tui.frame_requester().schedule_frame();
                }
            }
            TuiEvent::Draw => {
                tui.draw(|frame| self.render(frame))?;
            }
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key_event: KeyEvent) {
        self.should_exit = event_handler::handle_keyboard_event(
            key_event,
            &mut self.view,
            &mut self.payload_view,
            &self.op_tx,
        );
    }

    /// Render the dashboard.
    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(10),   // Panels
                Constraint::Length(3), // Question
                Constraint::Length(2), // Status and key hints
            ])
            .split(frame.area());

        if self.view.show_overview {
            render_overview(frame, chunks[0], self.view.dashboard.as_ref());
        } else {
            self.render_panels(frame, chunks[0]);
        }

        self.view.question.render(
            chunks[1],
            frame.buffer_mut(),
            self.view.focus == Focus::Question,
        );
        self.render_status(frame, chunks[2]);
    }

    fn render_panels(&self, frame: &mut Frame, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(45),
                Constraint::Percentage(30),
            ])
            .split(area);
        let center = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(columns[1]);

        let view = &self.view;
        render_method_panel(
            frame,
            columns[0],
            view.dashboard.as_ref(),
            view.selected_method,
            view.sample_index,
            view.focus == Focus::Methods,
        );
        render_graph(
            frame,
            center[0],
            &view.layout,
            view.selected_node,
            view.focus == Focus::Graph,
        );
        render_stage_panel(
            frame,
            center[1],
            &view.run_state,
            view.selected_stage,
            &self.payload_view,
            view.focus == Focus::Stages,
        );
        render_trace_panel(
            frame,
            columns[2],
            view.keyword_trace().as_ref(),
            &view.answer,
        );
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let status = match &self.view.error {
            Some(error) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
            None => Span::raw(self.view.status_line.clone()),
        };
        let lines = vec![
            Line::from(status),
            Line::styled(KEY_HINTS, Style::default().fg(Color::DarkGray)),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;
    use of_core::stages::build_stage_template;
    use of_protocol::dashboard_models::DashboardPayload;
    use of_protocol::run_models::{RunFailure, RunOutcome};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use serde_json::json;
    use tokio::sync::mpsc::{channel, unbounded_channel};

    fn app() -> App {
        let (op_tx, _op_rx) = unbounded_channel();
        let (_event_tx, event_rx) = channel(16);
        App::new(&AppConfig::default(), op_tx, event_rx)
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|frame| app.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_app_renders_all_panels() {
        let app = app();
        let content = screen(&app);

        assert!(content.contains("Method"));
        assert!(content.contains("Run stages"));
        assert!(content.contains("Keyword trace"));
        assert!(content.contains("Answer"));
        assert!(content.contains("Loading dashboard..."));
    }

    #[tokio::test]
    async fn test_app_quit_on_q() {
        let mut app = app();

        assert!(!app.should_exit);

        app.handle_key_event(KeyEvent::from(KeyCode::Char('q')));

        assert!(app.should_exit);
    }

    #[tokio::test]
    async fn test_app_shows_method_after_dashboard_loaded() {
        let mut app = app();
        let dashboard: DashboardPayload = serde_json::from_value(json!({
            "ontology_utilization": [
                { "method_id": "method1", "method_name": "Keyword Grounding",
                  "dag": { "nodes": [
                      { "id": "n01", "label": "Parse", "runtime_stage": "received" }
                  ] } }
            ]
        }))
        .unwrap();

        app.handle_core_event(Event::DashboardLoaded { dashboard });
        app.handle_core_event(Event::MethodSelected {
            method_id: "method1".to_string(),
            state: build_stage_template(None),
        });

        let content = screen(&app);
        assert!(content.contains("Keyword Grounding"));
        assert!(content.contains("01. Parse"));
    }

    #[tokio::test]
    async fn test_app_shows_failure_in_status_line() {
        let mut app = app();
        app.handle_core_event(Event::RunFinished {
            run_id: None,
            outcome: RunOutcome::Failed {
                reason: RunFailure::EmptyQuestion,
            },
        });

        let content = screen(&app);
        assert!(content.contains(&RunFailure::EmptyQuestion.to_string()));
    }

    #[tokio::test]
    async fn test_overview_replaces_panels() {
        let mut app = app();
        app.handle_key_event(KeyEvent::from(KeyCode::Char('o')));

        let content = screen(&app);
        assert!(content.contains("Dashboard not loaded."));
        assert!(!content.contains("Keyword trace"));
    }
}
