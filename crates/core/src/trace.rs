//! Keyword trace of the lookup stage.
//!
//! When the lookup stage completes, its output carries a `lookup_debug`
//! object describing how the question was matched against the ontology:
//!
//! ```json
//! {
//!   "query_terms": ["banana", "milk", "price"],
//!   "prioritized_terms": ["banana", "milk"],
//!   "candidates": [
//!     {"id": "p1", "label": "Banana milk", "matched_terms": ["banana"],
//!      "matched_fields": ["label"], "score": 3}
//!   ]
//! }
//! ```

use of_protocol::run_models::RunState;
use of_protocol::topology::RuntimeStage;
use serde::Deserialize;

/// Number of candidates worth showing to the operator.
pub const MAX_CANDIDATES: usize = 5;

/// Matching trace of one lookup.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeywordTrace {
    pub query_terms: Vec<String>,
    pub prioritized_terms: Vec<String>,
    pub candidates: Vec<TraceCandidate>,
}

/// One ontology instance that matched the question.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TraceCandidate {
    pub id: String,
    pub label: Option<String>,
    pub matched_terms: Vec<String>,
    pub matched_fields: Vec<String>,
    pub score: Option<f64>,
}

impl KeywordTrace {
    /// Extract the trace from the lookup stage's output, if it has one.
    ///
    /// Only the best [`MAX_CANDIDATES`] candidates are kept.
    pub fn from_run_state(state: &RunState) -> Option<Self> {
        let debug = state.get(RuntimeStage::Lookup).output.get("lookup_debug")?;
        if debug.is_null() {
            return None;
        }
        let mut trace: KeywordTrace = serde_json::from_value(debug.clone()).ok()?;
        trace.candidates.truncate(MAX_CANDIDATES);
        Some(trace)
    }
}

impl TraceCandidate {
    /// Label, or the id when the instance has none.
    pub fn title(&self) -> &str {
        self.label
            .as_deref()
            .filter(|label| !label.is_empty())
            .unwrap_or(&self.id)
    }

    /// `matched_terms: a, b | fields: label | score: 3`
    pub fn summary(&self) -> String {
        let score = self
            .score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "matched_terms: {} | fields: {} | score: {}",
            join_or_dash(&self.matched_terms),
            join_or_dash(&self.matched_fields),
            score
        )
    }
}

fn join_or_dash(items: &[String]) -> String {
    if items.is_empty() {
        "-".to_string()
    } else {
        items.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::{apply_stage_event, build_stage_template};
    use of_protocol::stream_models::StageEvent;
    use serde_json::json;

    #[test]
    fn test_no_trace_before_lookup_completes() {
        let state = build_stage_template(None);
        assert_eq!(KeywordTrace::from_run_state(&state), None);
    }

    #[test]
    fn test_trace_keeps_top_candidates() {
        let candidates: Vec<_> = (0..8)
            .map(|i| json!({ "id": format!("p{i}"), "score": 8 - i }))
            .collect();
        let mut state = build_stage_template(None);
        apply_stage_event(
            &mut state,
            &StageEvent::new("lookup", "done").with_output(json!({
                "raw_context": "...",
                "lookup_debug": {
                    "query_terms": ["banana", "milk"],
                    "prioritized_terms": ["banana"],
                    "candidates": candidates,
                }
            })),
        );

        let trace = KeywordTrace::from_run_state(&state).expect("trace present");

        assert_eq!(trace.query_terms, vec!["banana", "milk"]);
        assert_eq!(trace.prioritized_terms, vec!["banana"]);
        assert_eq!(trace.candidates.len(), MAX_CANDIDATES);
        assert_eq!(trace.candidates[0].id, "p0");
    }

    #[test]
    fn test_candidate_formatting() {
        let candidate = TraceCandidate {
            id: "p1".to_string(),
            label: Some("Banana milk".to_string()),
            matched_terms: vec!["banana".to_string(), "milk".to_string()],
            matched_fields: Vec::new(),
            score: Some(3.0),
        };
        assert_eq!(candidate.title(), "Banana milk");
        assert_eq!(
            candidate.summary(),
            "matched_terms: banana, milk | fields: - | score: 3"
        );

        let bare = TraceCandidate {
            id: "p2".to_string(),
            ..TraceCandidate::default()
        };
        assert_eq!(bare.title(), "p2");
    }
}
