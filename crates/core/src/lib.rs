//! Core domain types for the meshtex texturing service.
//!
//! Provides the per-request execution context (scratch directory plus
//! client identity) and the adapter around the external mesh-conversion
//! utility. Leaf crate: no knowledge of HTTP or the generation engine.

pub mod context;
pub mod convert;
