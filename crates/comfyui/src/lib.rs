//! ComfyUI WebSocket and REST client library.
//!
//! Provides typed message parsing, per-request WebSocket connections,
//! HTTP API wrappers (workflow submission, artifact download), the
//! job-completion monitor, and workflow template instantiation for the
//! meshtex texturing service.

pub mod api;
pub mod artifacts;
pub mod client;
pub mod messages;
pub mod monitor;
pub mod workflow;
