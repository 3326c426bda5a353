//! Partial-run controller.
//!
//! The RunController executes one run of a method's pipeline against an
//! [`EventSource`], folds its stage records into the run state, and stops the
//! stream on purpose as soon as the operator's target stage has completed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use of_protocol::ipc::Event;
use of_protocol::run_models::{RunFailure, RunOutcome, RunState, StageStatus};
use of_protocol::stream_models::{ChatRequest, StreamEvent};
use of_protocol::topology::{MethodDag, RuntimeStage};
use tokio::sync::mpsc::Sender;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::stages::{apply_stage_event, build_stage_template};
use crate::stream::EventSource;

/// Failure message used when an `error` record carries no message.
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred while processing the request.";

/// What the operator asked for.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Stage after whose completion the run stops. `Generate` runs to the end.
    pub target: RuntimeStage,

    /// Raw question text; trimmed before it is sent.
    pub question: String,

    /// Method whose pipeline answers the question.
    pub method_id: String,

    /// Topology of that method, used to rebuild the stage template.
    pub topology: Option<MethodDag>,
}

/// Drives partial runs and reports their progress as [`Event`]s.
///
/// Clones share one in-flight flag: at most one run executes at a time.
#[derive(Clone)]
pub struct RunController {
    source: Arc<dyn EventSource>,
    events_tx: Sender<Event>,
    in_flight: Arc<AtomicBool>,
}

impl RunController {
    /// Create a controller reading from `source` and publishing to `events_tx`.
    pub fn new(source: Arc<dyn EventSource>, events_tx: Sender<Event>) -> Self {
        Self {
            source,
            events_tx,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a run is currently executing.
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Execute one run, updating `state` as records arrive.
    ///
    /// Returns `None` without side effects when another run is in flight.
    /// Otherwise:
    /// 1. An empty question fails at once; `state` is left untouched and no
    ///    request is made
    /// 2. `state` is reset to the template of `request.topology`
    /// 3. Each stage record is applied and a snapshot is published
    /// 4. Once `request.target` (unless it is the final stage) reports
    ///    `done`, `cancel` is fired and the run ends as `StoppedAt`
    ///
    /// Firing `cancel` from outside ends the run as `Failed(Aborted)`.
    pub async fn run(
        &self,
        request: RunRequest,
        state: &mut RunState,
        cancel: CancellationToken,
    ) -> Option<RunOutcome> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            debug!(target_stage = %request.target, "run refused: another run is in flight");
            return None;
        };

        let question = request.question.trim();
        if question.is_empty() {
            let outcome = RunOutcome::Failed {
                reason: RunFailure::EmptyQuestion,
            };
            self.publish(Event::RunFinished {
                run_id: None,
                outcome: outcome.clone(),
            })
            .await;
            return Some(outcome);
        }

        let run_id = Uuid::new_v4();
        *state = build_stage_template(request.topology.as_ref());

        info!(
            %run_id,
            method_id = %request.method_id,
            target_stage = %request.target,
            "run started"
        );
        self.publish(Event::RunStarted {
            run_id,
            target: request.target,
            question: question.to_string(),
            started_at: chrono::Utc::now(),
        })
        .await;
        self.publish(Event::RunStateChanged {
            state: state.clone(),
        })
        .await;

        let chat = ChatRequest {
            question: question.to_string(),
            method_id: request.method_id.clone(),
        };
        let outcome = self
            .drive(run_id, &chat, request.target, state, &cancel)
            .await;

        match &outcome {
            RunOutcome::Failed { reason } => warn!(%run_id, %reason, "run failed"),
            _ => info!(%run_id, ?outcome, "run finished"),
        }
        self.publish(Event::RunFinished {
            run_id: Some(run_id),
            outcome: outcome.clone(),
        })
        .await;

        Some(outcome)
    }

    async fn drive(
        &self,
        run_id: Uuid,
        chat: &ChatRequest,
        target: RuntimeStage,
        state: &mut RunState,
        cancel: &CancellationToken,
    ) -> RunOutcome {
        let mut stream = match self.source.open(chat, cancel.clone()).await {
            Ok(stream) => stream,
            Err(e) => return transport_failure(e),
        };

        let mut answer = None;
        while let Some(record) = stream.next().await {
            match record {
                Ok(StreamEvent::Stage(event)) => {
                    debug!(%run_id, stage = %event.stage, status = %event.status, "stage record");
                    let Some(stage) = apply_stage_event(state, &event) else {
                        continue;
                    };
                    self.publish(Event::RunStateChanged {
                        state: state.clone(),
                    })
                    .await;

                    if stage == target
                        && !target.is_terminal()
                        && state.status_of(stage) == StageStatus::Done
                    {
                        cancel.cancel();
                        return RunOutcome::StoppedAt { stage };
                    }
                }
                Ok(StreamEvent::Answer { answer: text }) => {
                    let text = text.unwrap_or_default();
                    self.publish(Event::AnswerReceived {
                        run_id,
                        answer: text.clone(),
                    })
                    .await;
                    answer = Some(text);
                }
                Ok(StreamEvent::Error { message }) => {
                    let message = message
                        .filter(|m| !m.is_empty())
                        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
                    return RunOutcome::Failed {
                        reason: RunFailure::Backend { message },
                    };
                }
                Ok(StreamEvent::Other) => debug!(%run_id, "ignoring record"),
                Err(e) => return transport_failure(e),
            }
        }

        if cancel.is_cancelled() {
            RunOutcome::Failed {
                reason: RunFailure::Aborted,
            }
        } else {
            RunOutcome::Completed { answer }
        }
    }

    async fn publish(&self, event: Event) {
        let _ = self.events_tx.send(event).await;
    }
}

fn transport_failure(error: impl std::fmt::Display) -> RunOutcome {
    RunOutcome::Failed {
        reason: RunFailure::Transport {
            message: error.to_string(),
        },
    }
}

/// Holds the in-flight flag for the lifetime of a run.
struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl InFlightGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self {
                flag: Arc::clone(flag),
            })
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ScriptedEventSource;
    use tokio::sync::mpsc;

    fn request(target: RuntimeStage, question: &str) -> RunRequest {
        RunRequest {
            target,
            question: question.to_string(),
            method_id: "method1".to_string(),
            topology: None,
        }
    }

    #[test]
    fn test_guard_is_exclusive_and_released_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));

        let guard = InFlightGuard::acquire(&flag);
        assert!(guard.is_some());
        assert!(InFlightGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(!flag.load(Ordering::Acquire));
        assert!(InFlightGuard::acquire(&flag).is_some());
    }

    #[tokio::test]
    async fn test_question_is_trimmed_before_sending() {
        let source = ScriptedEventSource::from_lines([r#"{"event":"done"}"#]);
        let (tx, _rx) = mpsc::channel(64);
        let controller = RunController::new(Arc::new(source.clone()), tx);
        let mut state = build_stage_template(None);

        let outcome = controller
            .run(
                request(RuntimeStage::Generate, "  banana milk?  "),
                &mut state,
                CancellationToken::new(),
            )
            .await;

        assert_eq!(outcome, Some(RunOutcome::Completed { answer: None }));
        assert_eq!(source.requests().await[0].question, "banana milk?");
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_open_failure_is_transport_failure() {
        let source = ScriptedEventSource::default().with_status(502);
        let (tx, _rx) = mpsc::channel(64);
        let controller = RunController::new(Arc::new(source), tx);
        let mut state = build_stage_template(None);

        let outcome = controller
            .run(
                request(RuntimeStage::Lookup, "q"),
                &mut state,
                CancellationToken::new(),
            )
            .await
            .expect("run accepted");

        assert!(matches!(
            outcome.failure(),
            Some(RunFailure::Transport { message }) if message.contains("502")
        ));
        assert!(!controller.is_running());
    }
}
