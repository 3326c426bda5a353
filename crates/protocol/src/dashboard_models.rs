//! Dashboard document models for `GET /api/dashboard`.
//!
//! The dashboard is static configuration from the point of view of a run:
//! only the `dag` of the selected method feeds the execution-tracking core.
//! The remaining members are typed for display and default when absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;

use crate::topology::MethodDag;

/// The whole dashboard document.
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct DashboardPayload {
    /// Ontology build status per method.
    #[serde(default)]
    pub ontology_test_status: Vec<OntologyTestStatus>,

    /// Method descriptions including their topology.
    #[serde(default)]
    pub ontology_utilization: Vec<MethodMeta>,

    /// Representative questions per method.
    #[serde(default)]
    pub method_examples: Vec<MethodExample>,

    /// Progress of the prompt token-budget mitigations.
    #[serde(default)]
    pub token_mitigation_status: Vec<TokenMitigationStep>,
}

impl DashboardPayload {
    /// Resolve the method to display for `method_id`.
    ///
    /// Falls back to the first method when the id is unknown, so a stale
    /// selection still shows something.
    pub fn method(&self, method_id: &str) -> Option<&MethodMeta> {
        self.ontology_utilization
            .iter()
            .find(|meta| meta.method_id == method_id)
            .or_else(|| self.ontology_utilization.first())
    }

    /// The example scenario of a method, if one is published.
    pub fn example_for(&self, method_id: &str) -> Option<&MethodExample> {
        self.method_examples
            .iter()
            .find(|example| example.method_id == method_id)
    }

    /// The ontology test status row of a method.
    pub fn test_status_for(&self, method_id: &str) -> Option<&OntologyTestStatus> {
        self.ontology_test_status
            .iter()
            .find(|row| row.method_id == method_id)
    }
}

/// One method of the pipeline, as shown in the method picker.
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct MethodMeta {
    /// Identifier sent as `method_id` in chat requests.
    pub method_id: String,

    /// Display name.
    #[serde(default)]
    pub method_name: String,

    /// Kind of ontology the method relies on.
    #[serde(default)]
    pub ontology_type: String,

    /// Ontology file backing the method.
    #[serde(default)]
    pub ontology_file: String,

    /// How the question is compared against the ontology.
    #[serde(default)]
    pub compare_rule: String,

    /// One-line summary.
    #[serde(default)]
    pub highlight: String,

    /// Paper the method is based on.
    #[serde(default)]
    pub paper_basis: String,

    /// Literature references.
    #[serde(default)]
    pub references: Vec<PaperReference>,

    /// Summary of what the ontology contributes; shape owned by the backend.
    #[serde(default)]
    pub ontology_reflection: Option<Value>,

    /// The method's task graph.
    #[serde(default)]
    pub dag: Option<MethodDag>,
}

impl MethodMeta {
    /// Label used by pickers: `METHOD1 · Keyword Grounding`.
    pub fn display_name(&self) -> String {
        format!("{} · {}", self.method_id.to_uppercase(), self.method_name)
    }

    /// The reflection summary, if the backend sent one in the known shape.
    pub fn reflection(&self) -> Option<OntologyReflection> {
        let value = self.ontology_reflection.as_ref()?;
        OntologyReflection::deserialize(value).ok()
    }
}

/// What the method's ontology contributed to the last answers.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct OntologyReflection {
    pub counts: ReflectionCounts,
    pub product_labels: Vec<String>,
    pub rule_ids: Vec<String>,
    pub relation_types: Vec<String>,
    pub focus_properties: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ReflectionCounts {
    pub classes: u64,
    pub instances: u64,
    pub relations: u64,
    pub candidates: u64,
}

/// A literature reference attached to a method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct PaperReference {
    pub title: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub year: Option<u32>,
    #[serde(default)]
    pub url: String,
}

/// Ontology build status of one method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct OntologyTestStatus {
    pub method_id: String,
    #[serde(default)]
    pub method_name: String,
    #[serde(default)]
    pub ontology_type: String,
    #[serde(default)]
    pub ontology_file: String,
    #[serde(default)]
    pub classes: u64,
    #[serde(default)]
    pub instances: u64,
    #[serde(default)]
    pub relations: u64,
    /// `ready`, `done`, `partial` or `missing`.
    #[serde(default)]
    pub status: String,
}

/// Representative scenario for a method.
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct MethodExample {
    pub method_id: String,
    #[serde(default)]
    pub scenario: String,
    #[serde(default)]
    pub expected_outcome: String,
    #[serde(default)]
    pub sample_questions: Vec<String>,
    /// Command line reproducing the example outside the dashboard.
    #[serde(default)]
    pub quick_run: String,
    /// Readiness of the method's environment; shape owned by the backend.
    #[serde(default)]
    pub setup: Option<Value>,
}

impl MethodExample {
    /// The question used by "run the representative example".
    pub fn first_question(&self) -> Option<&str> {
        self.sample_questions.first().map(String::as_str)
    }

    /// The environment report, if the backend sent one in the known shape.
    pub fn setup_report(&self) -> Option<ExampleSetup> {
        let value = self.setup.as_ref()?;
        ExampleSetup::deserialize(value).ok()
    }

    /// Whether the backend reports the example environment as fully set up.
    pub fn is_ready(&self) -> bool {
        self.setup_report().is_some_and(|setup| setup.overall_ready)
    }
}

/// Readiness of the modules and variables an example needs.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct ExampleSetup {
    pub ontology_ready: bool,
    pub dependencies: Vec<SetupDependency>,
    pub env: Vec<SetupEnv>,
    pub overall_ready: bool,
}

/// An importable module the example depends on.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct SetupDependency {
    pub module: String,
    pub ready: bool,
}

/// An environment variable the example reads.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, TS)]
#[serde(default)]
pub struct SetupEnv {
    pub key: String,
    pub ready: bool,
}

/// One step of the token-budget mitigation plan.
#[derive(Serialize, Deserialize, Debug, Clone, Default, TS)]
pub struct TokenMitigationStep {
    pub step_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub process: Vec<String>,
}

/// Human label for a dashboard status keyword.
pub fn status_label(status: &str) -> &str {
    match status {
        "ready" => "ready",
        "done" => "done",
        "partial" => "partial",
        "missing" => "not configured",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(id: &str) -> MethodMeta {
        MethodMeta {
            method_id: id.to_string(),
            method_name: format!("Method {id}"),
            ..MethodMeta::default()
        }
    }

    #[test]
    fn test_method_lookup_falls_back_to_first() {
        let payload = DashboardPayload {
            ontology_utilization: vec![method("method1"), method("method2")],
            ..DashboardPayload::default()
        };

        assert_eq!(payload.method("method2").map(|m| m.method_id.as_str()), Some("method2"));
        assert_eq!(payload.method("method9").map(|m| m.method_id.as_str()), Some("method1"));
        assert!(DashboardPayload::default().method("method1").is_none());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(method("method3").display_name(), "METHOD3 · Method method3");
    }

    #[test]
    fn test_example_readiness() {
        let example = MethodExample {
            method_id: "method1".to_string(),
            sample_questions: vec!["What does banana milk cost?".to_string()],
            setup: Some(serde_json::json!({ "overall_ready": true })),
            ..MethodExample::default()
        };
        assert!(example.is_ready());
        assert_eq!(example.first_question(), Some("What does banana milk cost?"));

        let bare = MethodExample::default();
        assert!(!bare.is_ready());
        assert_eq!(bare.first_question(), None);
    }
}
