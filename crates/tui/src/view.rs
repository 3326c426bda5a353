//! Presentation state of the dashboard.
//!
//! `DashboardView` mirrors what the core session reports through events and
//! adds the purely visual state: focus, selections, the question being typed
//! and the sticky graph positions.

use of_core::config::models::{AppConfig, LayoutConfig};
use of_core::layout::{compute_layout, GraphLayout, Position, StickyLayout};
use of_core::stages::build_stage_template;
use of_core::trace::KeywordTrace;
use of_protocol::dashboard_models::{DashboardPayload, MethodExample, MethodMeta};
use of_protocol::run_models::{RunOutcome, RunState};
use of_protocol::topology::{MethodDag, RuntimeStage};

use crate::widgets::QuestionInput;

/// Panel that receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Methods,
    Graph,
    Stages,
    Question,
}

impl Focus {
    /// The next panel in `Tab` order.
    pub fn next(self) -> Self {
        match self {
            Focus::Methods => Focus::Graph,
            Focus::Graph => Focus::Stages,
            Focus::Stages => Focus::Question,
            Focus::Question => Focus::Methods,
        }
    }
}

/// Everything the dashboard renders.
pub struct DashboardView {
    pub dashboard: Option<DashboardPayload>,
    pub method_id: String,
    pub run_state: RunState,
    pub layout: GraphLayout,
    sticky: StickyLayout,
    layout_config: LayoutConfig,

    pub answer: String,
    pub error: Option<String>,
    pub status_line: String,
    pub loading: bool,
    pub running_target: Option<RuntimeStage>,

    pub focus: Focus,
    pub selected_method: usize,
    pub selected_node: usize,
    pub selected_stage: usize,
    pub question: QuestionInput,
    /// Sample question last loaded into `question`.
    pub sample_index: usize,
    pub show_overview: bool,
}

impl DashboardView {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            dashboard: None,
            method_id: config.run.default_method.clone(),
            run_state: build_stage_template(None),
            layout: GraphLayout::default(),
            sticky: StickyLayout::new(),
            layout_config: config.layout.clone(),
            answer: String::new(),
            error: None,
            status_line: "Loading dashboard...".to_string(),
            loading: false,
            running_target: None,
            focus: Focus::Methods,
            selected_method: 0,
            selected_node: 0,
            selected_stage: 0,
            question: QuestionInput::with_text(&config.run.default_question),
            sample_index: 0,
            show_overview: false,
        }
    }

    pub fn methods(&self) -> &[MethodMeta] {
        self.dashboard
            .as_ref()
            .map(|d| d.ontology_utilization.as_slice())
            .unwrap_or_default()
    }

    /// The active method, falling back to the first one.
    pub fn method(&self) -> Option<&MethodMeta> {
        self.dashboard.as_ref()?.method(&self.method_id)
    }

    pub fn topology(&self) -> Option<&MethodDag> {
        self.method()?.dag.as_ref()
    }

    pub fn example(&self) -> Option<&MethodExample> {
        self.dashboard.as_ref()?.example_for(&self.method_id)
    }

    pub fn keyword_trace(&self) -> Option<KeywordTrace> {
        KeywordTrace::from_run_state(&self.run_state)
    }

    pub fn dashboard_loaded(&mut self, dashboard: DashboardPayload) {
        self.dashboard = Some(dashboard);
        self.error = None;
        self.status_line = "Dashboard loaded".to_string();
    }

    /// A method became active with a fresh run state.
    pub fn method_selected(&mut self, method_id: String, state: RunState) {
        self.selected_method = self
            .methods()
            .iter()
            .position(|m| m.method_id == method_id)
            .unwrap_or(0);
        self.method_id = method_id;
        self.run_state = state;
        self.selected_node = 0;
        self.sample_index = 0;
        self.sticky.clear();
        self.relayout();
    }

    pub fn run_started(&mut self, target: RuntimeStage) {
        self.loading = true;
        self.running_target = Some(target);
        self.answer.clear();
        self.error = None;
        self.status_line = format!("Running until {target}...");
    }

    pub fn state_changed(&mut self, state: RunState) {
        self.run_state = state;
        self.relayout();
    }

    pub fn run_finished(&mut self, outcome: &RunOutcome) {
        self.loading = false;
        self.running_target = None;
        match outcome {
            RunOutcome::Completed { .. } => {
                self.status_line = "Run completed".to_string();
            }
            RunOutcome::StoppedAt { stage } => {
                self.status_line = format!("Stopped after {stage}");
            }
            RunOutcome::Failed { reason } => {
                self.status_line = "Run failed".to_string();
                self.error = Some(reason.to_string());
            }
        }
    }

    /// Move the selected graph node by a step in layout space.
    pub fn nudge_selected_node(&mut self, dx: f64, dy: f64) {
        let Some(node) = self.layout.nodes.get(self.selected_node) else {
            return;
        };
        let moved = Position {
            x: node.position.x + dx,
            y: node.position.y + dy,
        };
        let id = node.id.clone();
        if self.sticky.move_node(&id, moved) {
            self.relayout();
        }
    }

    /// The stage a run started from the current selection would target.
    pub fn selected_target(&self) -> Option<RuntimeStage> {
        match self.focus {
            Focus::Graph => self
                .layout
                .nodes
                .get(self.selected_node)
                .and_then(|node| self.layout.stage_of(&node.id)),
            Focus::Stages => RuntimeStage::ALL.get(self.selected_stage).copied(),
            Focus::Question => Some(RuntimeStage::Generate),
            Focus::Methods => None,
        }
    }

    fn relayout(&mut self) {
        let layout = compute_layout(self.topology(), &self.run_state, &self.layout_config);
        self.layout = self.sticky.apply(layout);
        if self.selected_node >= self.layout.nodes.len() {
            self.selected_node = 0;
        }
    }
}
