//! Job-completion monitor.
//!
//! Consumes the engine's event stream until the submitted prompt
//! reaches a terminal state or the wall-clock timeout elapses. Events
//! belonging to other prompts are discarded: the connection is already
//! scoped to this request's client id, but the prompt-id filter guards
//! against any cross-talk on a shared channel.
//!
//! Success requires two independent signals, in either order: an
//! `execution_success` event for the prompt, and an `executing` event
//! whose node is null (the terminal node of the execution graph). The
//! engine has been observed to emit one without the other under partial
//! failure, so neither alone counts. This dual check is a compatibility
//! shim for the engine's event protocol, not a general contract.

use std::time::Duration;

use futures::{Stream, StreamExt};
use tokio_tungstenite::tungstenite::Message;

use crate::client::EngineConnection;
use crate::messages::{parse_message, EngineMessage};

/// Terminal state of a monitored job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobOutcome {
    /// Both completion signals were observed.
    Succeeded,
    /// The engine reported an error, or the stream ended early.
    Failed {
        /// Human-readable failure description.
        error: String,
    },
    /// No terminal state within the wall-clock bound.
    TimedOut,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, JobOutcome::Succeeded)
    }
}

/// Wait for `prompt_id` to reach a terminal state.
///
/// The timeout is a hard bound measured from the start of the wait; it
/// is not re-armed by incoming events, so a slow but steadily
/// progressing job still hits the same ceiling. The connection is
/// closed on every exit path.
pub async fn await_completion(
    conn: EngineConnection,
    prompt_id: &str,
    timeout: Duration,
) -> JobOutcome {
    let mut conn = conn;
    let outcome = match tokio::time::timeout(timeout, drive(&mut conn.ws_stream, prompt_id)).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(
                prompt_id = %prompt_id,
                timeout_secs = timeout.as_secs(),
                "Job did not reach a terminal state in time",
            );
            JobOutcome::TimedOut
        }
    };
    conn.close().await;
    outcome
}

/// Read frames until a terminal state for `prompt_id` is observed.
///
/// Generic over the stream so the state machine can be exercised
/// without a live WebSocket.
async fn drive<S, E>(stream: &mut S, prompt_id: &str) -> JobOutcome
where
    S: Stream<Item = Result<Message, E>> + Unpin,
    E: std::fmt::Display,
{
    // The two completion signals, tracked independently.
    let mut saw_success = false;
    let mut saw_terminal_node = false;

    while let Some(frame) = stream.next().await {
        let text = match frame {
            Ok(Message::Text(text)) => text,
            Ok(Message::Binary(_)) => {
                // Preview images; not used by this pipeline.
                tracing::trace!("Ignoring binary message (preview image)");
                continue;
            }
            Ok(Message::Ping(_) | Message::Pong(_)) => continue,
            Ok(Message::Close(frame)) => {
                tracing::info!(?frame, "Engine WebSocket closed");
                break;
            }
            Ok(Message::Frame(_)) => continue,
            Err(e) => {
                tracing::error!(error = %e, "WebSocket receive error");
                return JobOutcome::Failed {
                    error: format!("event stream error: {e}"),
                };
            }
        };

        let msg = match parse_message(&text) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::warn!(error = %e, raw_message = %text, "Failed to parse engine message");
                continue;
            }
        };

        // Discard events belonging to other prompts.
        if let Some(id) = msg.prompt_id() {
            if id != prompt_id {
                tracing::debug!(other_prompt_id = %id, "Ignoring event for another prompt");
                continue;
            }
        }

        match msg {
            EngineMessage::ExecutionStart(_) => {
                tracing::info!(prompt_id = %prompt_id, "Execution started");
            }
            EngineMessage::Executing(data) => match data.node {
                Some(node) => {
                    tracing::debug!(prompt_id = %prompt_id, node = %node, "Executing node");
                }
                None => {
                    tracing::info!(prompt_id = %prompt_id, "Terminal node reached");
                    saw_terminal_node = true;
                }
            },
            EngineMessage::ExecutionSuccess(_) => {
                tracing::info!(prompt_id = %prompt_id, "Execution success reported");
                saw_success = true;
            }
            EngineMessage::ExecutionError(data) => {
                let error = data.error.unwrap_or_else(|| "unknown engine error".to_string());
                tracing::error!(prompt_id = %prompt_id, error = %error, "Execution error");
                return JobOutcome::Failed { error };
            }
            EngineMessage::Progress(data) => {
                tracing::debug!(value = data.value, max = data.max, "Generation progress");
            }
            EngineMessage::Status(_) => {
                tracing::trace!("Engine queue status");
            }
        }

        if saw_success && saw_terminal_node {
            return JobOutcome::Succeeded;
        }
    }

    JobOutcome::Failed {
        error: "event stream closed before the job reached a terminal state".to_string(),
    }
}
