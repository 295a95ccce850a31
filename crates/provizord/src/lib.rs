//! Provizor daemon library - drives the pharmacist expert engine.
//!
//! The engine is an interactive CLIPS console with no programmatic API; this
//! crate owns its process, types consultation input at it line by line,
//! watches the transcript for protocol markers and turns the result into
//! structured recommendation records.

pub mod config;
pub mod engine;

pub use config::EngineConfig;
pub use engine::ExpertEngine;
