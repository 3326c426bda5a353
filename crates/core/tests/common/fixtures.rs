//! Test fixtures for creating sample topologies, dashboards and streams.

use of_protocol::dashboard_models::DashboardPayload;
use of_protocol::topology::MethodDag;
use serde_json::{json, Value};

/// A `/api/dashboard` document with two methods.
#[allow(dead_code)]
pub fn dashboard_json() -> Value {
    json!({
        "ontology_test_status": [
            { "method_id": "method1", "method_name": "Keyword Grounding",
              "classes": 3, "instances": 12, "relations": 4, "status": "ready" }
        ],
        "ontology_utilization": [
            {
                "method_id": "method1",
                "method_name": "Keyword Grounding",
                "ontology_type": "product",
                "dag": sample_dag_json()
            },
            {
                "method_id": "method2",
                "method_name": "Rule Compare",
                "dag": {
                    "nodes": [
                        { "id": "m01", "label": "Load rules", "runtime_stage": "lookup" }
                    ]
                }
            }
        ],
        "method_examples": [
            { "method_id": "method1", "scenario": "price lookup",
              "sample_questions": ["What is the price of banana milk?"] }
        ],
        "token_mitigation_status": []
    })
}

#[allow(dead_code)]
pub fn sample_dashboard() -> DashboardPayload {
    serde_json::from_value(dashboard_json()).expect("valid dashboard fixture")
}

/// Topology of `method1`: one or two nodes per runtime stage.
#[allow(dead_code)]
pub fn sample_dag_json() -> Value {
    json!({
        "stages": [
            { "id": "s1", "title": "1) Query Understanding", "runtime_stage": "received" },
            { "id": "s2", "title": "2) Ontology Retrieval", "runtime_stage": "lookup" },
            { "id": "s3", "title": "3) Context Compare", "runtime_stage": "compare" },
            { "id": "s4", "title": "4) LLM Generation", "runtime_stage": "generate" }
        ],
        "nodes": [
            { "id": "n01", "label": "Parse question", "runtime_stage": "received" },
            { "id": "n02", "label": "Match keywords", "runtime_stage": "lookup", "lane": 0 },
            { "id": "n03", "label": "Price known?", "runtime_stage": "lookup", "lane": 1 },
            { "id": "n04", "label": "Rank facts", "runtime_stage": "compare" },
            { "id": "n05", "label": "Call LLM", "runtime_stage": "generate" }
        ],
        "edges": [
            { "source": "n01", "target": "n02" },
            { "source": "n02", "target": "n03" },
            { "source": "n03", "target": "n04" },
            { "source": "n04", "target": "n05" }
        ]
    })
}

#[allow(dead_code)]
pub fn sample_dag() -> MethodDag {
    serde_json::from_value(sample_dag_json()).expect("valid dag fixture")
}

/// One `stage` record line.
#[allow(dead_code)]
pub fn stage_line(stage: &str, status: &str) -> String {
    json!({ "event": "stage", "stage": stage, "status": status }).to_string()
}

/// One `stage` record line carrying a message and an output payload.
#[allow(dead_code)]
pub fn stage_line_with(stage: &str, status: &str, message: &str, output: Value) -> String {
    json!({
        "event": "stage",
        "stage": stage,
        "status": status,
        "message": message,
        "output": output
    })
    .to_string()
}

/// The record lines of a complete, successful run.
#[allow(dead_code)]
pub fn full_run_lines() -> Vec<String> {
    vec![
        stage_line("received", "running"),
        stage_line_with("received", "done", "Question accepted", json!(null)),
        stage_line("lookup", "running"),
        stage_line_with("lookup", "done", "3 facts found", json!({ "facts": 3 })),
        stage_line("compare", "running"),
        stage_line("compare", "done"),
        stage_line("generate", "running"),
        stage_line_with("generate", "done", "Answer generated", json!({ "chars": 24 })),
        json!({ "event": "answer", "answer": "Banana milk costs 1,500 KRW." }).to_string(),
        json!({ "event": "done" }).to_string(),
    ]
}

/// Join lines into an NDJSON body.
#[allow(dead_code)]
pub fn ndjson(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}
