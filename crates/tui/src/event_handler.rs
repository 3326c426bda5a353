//! Event handling utilities for the TUI.
//!
//! This module provides functions for handling different types of events:
//! - Core events (from of-core), folded into the [`DashboardView`]
//! - Keyboard events, turned into view changes and [`Op`]s

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use of_core::session::{METHOD_LOCKED, RUN_IN_PROGRESS};
use of_protocol::ipc::{Event, Op};
use of_protocol::topology::RuntimeStage;
use tokio::sync::mpsc::UnboundedSender;

use crate::event::EventStatus;
use crate::view::{DashboardView, Focus};
use crate::widgets::PayloadView;

/// Distance a node moves per `Shift+arrow`, in layout units.
pub const NUDGE_STEP: f64 = 40.0;

const PAYLOAD_SCROLL: usize = 5;

/// Handle an event received from the core.
pub fn handle_core_event(view: &mut DashboardView, event: Event) {
    match event {
        Event::DashboardLoaded { dashboard } => view.dashboard_loaded(dashboard),
        Event::DashboardFailed { error } => {
            view.status_line = "Dashboard unavailable".to_string();
            view.error = Some(error);
        }
        Event::MethodSelected { method_id, state } => view.method_selected(method_id, state),
        Event::RunStarted { target, .. } => view.run_started(target),
        Event::RunStateChanged { state } => view.state_changed(state),
        Event::AnswerReceived { answer, .. } => view.answer = answer,
        Event::RunFinished { outcome, .. } => view.run_finished(&outcome),
        Event::RunIgnored { reason } => view.status_line = reason,
    }
}

/// Handle a keyboard event from the user.
///
/// Returns `true` if the application should exit, `false` otherwise.
pub fn handle_keyboard_event(
    key_event: KeyEvent,
    view: &mut DashboardView,
    payload_view: &mut PayloadView,
    op_tx: &UnboundedSender<Op>,
) -> bool {
    if key_event.kind != KeyEventKind::Press {
        return false;
    }

    match key_event.code {
        KeyCode::Esc => return true,
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        KeyCode::Tab => {
            view.focus = view.focus.next();
            return false;
        }
        KeyCode::PageUp => {
            payload_view.scroll_up(PAYLOAD_SCROLL);
            return false;
        }
        KeyCode::PageDown => {
            payload_view.scroll_down(PAYLOAD_SCROLL);
            return false;
        }
        _ => {}
    }

    if view.focus == Focus::Question {
        if key_event.code == KeyCode::Enter {
            submit_run(view, RuntimeStage::Generate, op_tx);
            return false;
        }
        if view.question.handle_key_event(key_event) == EventStatus::Consumed {
            return false;
        }
    }

    if key_event.modifiers.contains(KeyModifiers::SHIFT) && view.focus == Focus::Graph {
        let (dx, dy) = match key_event.code {
            KeyCode::Left => (-NUDGE_STEP, 0.0),
            KeyCode::Right => (NUDGE_STEP, 0.0),
            KeyCode::Up => (0.0, -NUDGE_STEP),
            KeyCode::Down => (0.0, NUDGE_STEP),
            _ => (0.0, 0.0),
        };
        if dx != 0.0 || dy != 0.0 {
            view.nudge_selected_node(dx, dy);
            return false;
        }
    }

    match key_event.code {
        KeyCode::Char('q') => return true,
        KeyCode::Up => move_selection(view, payload_view, -1, op_tx),
        KeyCode::Down => move_selection(view, payload_view, 1, op_tx),
        KeyCode::Enter => {
            if let Some(target) = view.selected_target() {
                submit_run(view, target, op_tx);
            }
        }
        KeyCode::Char('x') => run_example(view, op_tx),
        KeyCode::Char('n') => next_sample(view),
        KeyCode::Char('c') => {
            let _ = op_tx.send(Op::CancelRun);
        }
        KeyCode::Char('o') => view.show_overview = !view.show_overview,
        _ => {}
    }

    false
}

fn move_selection(
    view: &mut DashboardView,
    payload_view: &mut PayloadView,
    delta: isize,
    op_tx: &UnboundedSender<Op>,
) {
    match view.focus {
        Focus::Methods => {
            let count = view.methods().len();
            let next = step(view.selected_method, delta, count);
            if next == view.selected_method {
                return;
            }
            if view.loading {
                view.status_line = METHOD_LOCKED.to_string();
                return;
            }
            let method_id = view.methods()[next].method_id.clone();
            let _ = op_tx.send(Op::SelectMethod { method_id });
        }
        Focus::Graph => {
            view.selected_node = step(view.selected_node, delta, view.layout.nodes.len());
        }
        Focus::Stages => {
            view.selected_stage = step(view.selected_stage, delta, RuntimeStage::ALL.len());
            payload_view.reset();
        }
        Focus::Question => {}
    }
}

/// Move `current` by `delta` inside `0..count`, clamping at both ends.
fn step(current: usize, delta: isize, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    current.saturating_add_signed(delta).min(count - 1)
}

fn submit_run(view: &mut DashboardView, target: RuntimeStage, op_tx: &UnboundedSender<Op>) {
    if view.loading {
        view.status_line = RUN_IN_PROGRESS.to_string();
        return;
    }
    let _ = op_tx.send(Op::RunUntil {
        target,
        question: view.question.text().to_string(),
    });
}

/// Load the method's first sample question and run it to the end.
fn run_example(view: &mut DashboardView, op_tx: &UnboundedSender<Op>) {
    let Some(question) = view
        .example()
        .and_then(|e| e.first_question())
        .map(str::to_string)
    else {
        view.status_line = "No example question for this method".to_string();
        return;
    };
    if view.loading {
        view.status_line = RUN_IN_PROGRESS.to_string();
        return;
    }
    view.question.set_text(&question);
    submit_run(view, RuntimeStage::Generate, op_tx);
}

/// Load the next sample question of the method without running it.
fn next_sample(view: &mut DashboardView) {
    let Some(samples) = view
        .example()
        .map(|e| e.sample_questions.clone())
        .filter(|samples| !samples.is_empty())
    else {
        view.status_line = "No sample questions for this method".to_string();
        return;
    };
    let index = if view.question.text() == samples[view.sample_index % samples.len()] {
        (view.sample_index + 1) % samples.len()
    } else {
        view.sample_index % samples.len()
    };
    view.sample_index = index;
    view.question.set_text(&samples[index]);
    view.status_line = format!("Sample {} of {}", index + 1, samples.len());
}
