//! Wire models of the streaming chat endpoint.
//!
//! `POST /api/chat/stream` takes a [`ChatRequest`] and answers with a body of
//! newline-delimited JSON records, each one a [`StreamEvent`]:
//!
//! ```text
//! {"event": "stage", "stage": "received", "status": "running", "message": "Question received"}
//! {"event": "stage", "stage": "lookup", "status": "done", "output": {"raw_context": "..."}}
//! {"event": "answer", "answer": "Banana milk costs 1,500 KRW."}
//! {"event": "done"}
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use ts_rs::TS;

/// Body of a streaming chat request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct ChatRequest {
    /// The operator's question, already trimmed.
    pub question: String,

    /// Method whose pipeline should answer the question.
    pub method_id: String,
}

/// One record of the event stream, tagged by its `event` member.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum StreamEvent {
    /// Progress of one runtime stage.
    Stage(StageEvent),

    /// The final answer. May be empty.
    Answer {
        #[serde(default)]
        answer: Option<String>,
    },

    /// The backend failed; processing must stop.
    Error {
        #[serde(default)]
        message: Option<String>,
    },

    /// Any record the client does not act upon, such as the trailing `done`.
    #[serde(other)]
    Other,
}

/// Payload of a `stage` record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, TS)]
pub struct StageEvent {
    /// Runtime stage id. Kept raw: stages the client does not know are ignored.
    pub stage: String,

    /// `running`, `done` or anything else (treated as not started). A
    /// non-string `status` is read as empty.
    #[serde(default, deserialize_with = "lenient_string")]
    pub status: String,

    /// New detail text for the stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Input payload. `None` when the member is absent; `Some(Value::Null)`
    /// when it is present and `null`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,

    /// Output payload, with the same absent/present distinction as `input`.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub output: Option<Value>,
}

impl StageEvent {
    /// Build a stage event without payloads.
    pub fn new(stage: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            status: status.into(),
            message: None,
            input: None,
            output: None,
        }
    }

    /// Set the detail message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Set the input payload.
    pub fn with_input(mut self, input: Value) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the output payload.
    pub fn with_output(mut self, output: Value) -> Self {
        self.output = Some(output);
        self
    }
}

/// Deserialize a member that is known to be present, keeping `null` as a value.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}
