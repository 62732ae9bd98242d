//! ComfyUI WebSocket message types and parser.
//!
//! ComfyUI sends JSON messages over WebSocket with the shape
//! `{"type": "<kind>", "data": {...}}`. This module deserializes them
//! into a strongly-typed [`EngineMessage`] enum once, at the channel
//! boundary; everything downstream matches on the variants.

use serde::Deserialize;

/// All engine message types the monitor cares about.
///
/// Deserialized via the internally-tagged `"type"` field with
/// associated `"data"` content.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum EngineMessage {
    /// Server status broadcast (queue depth, etc.). Not job-scoped.
    #[serde(rename = "status")]
    Status(serde_json::Value),

    /// A queued prompt has started executing.
    #[serde(rename = "execution_start")]
    ExecutionStart(ExecutionStartData),

    /// A specific node is executing; `node == None` means the execution
    /// graph's terminal node has been reached.
    #[serde(rename = "executing")]
    Executing(ExecutingData),

    /// Step-level progress inside a long-running node.
    #[serde(rename = "progress")]
    Progress(ProgressData),

    /// The engine's named completion flag for a prompt.
    #[serde(rename = "execution_success")]
    ExecutionSuccess(ExecutionSuccessData),

    /// Execution failed with an error.
    #[serde(rename = "execution_error")]
    ExecutionError(ErrorData),
}

impl EngineMessage {
    /// The prompt id this message is about, if it is job-scoped.
    pub fn prompt_id(&self) -> Option<&str> {
        match self {
            EngineMessage::Status(_) | EngineMessage::Progress(_) => None,
            EngineMessage::ExecutionStart(d) => Some(&d.prompt_id),
            EngineMessage::Executing(d) => Some(&d.prompt_id),
            EngineMessage::ExecutionSuccess(d) => Some(&d.prompt_id),
            EngineMessage::ExecutionError(d) => Some(&d.prompt_id),
        }
    }
}

/// Payload for `execution_start` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStartData {
    pub prompt_id: String,
}

/// Payload for `executing` messages.
///
/// When `node` is `None`, execution of the prompt has completed.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutingData {
    pub node: Option<String>,
    pub prompt_id: String,
}

/// Payload for `progress` messages (step-level progress within a node).
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressData {
    /// Current step number.
    pub value: i32,
    /// Total number of steps.
    pub max: i32,
}

/// Payload for `execution_success` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionSuccessData {
    pub prompt_id: String,
}

/// Payload for `execution_error` messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorData {
    pub prompt_id: String,
    /// Human-readable error description from the engine.
    #[serde(default, alias = "exception_message")]
    pub error: Option<String>,
}

/// Parse an engine WebSocket text frame into a typed message.
///
/// Returns `Err` for malformed JSON or unknown `type` values.
/// Callers should log unknown types and continue.
pub fn parse_message(text: &str) -> Result<EngineMessage, serde_json::Error> {
    serde_json::from_str(text)
}
