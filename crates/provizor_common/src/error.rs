//! Error taxonomy for the engine driver.
//!
//! Every failure class the orchestrator can hit is a distinct, inspectable
//! variant — callers map them to whatever their boundary needs, nothing is
//! folded into an empty success.

/// Engine driver errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum EngineError {
    /// The engine binary could not be started at all. Fatal for the whole
    /// subsystem; surfaced at the health-check boundary.
    #[error("failed to spawn engine process: {0}")]
    ProcessSpawn(String),

    /// The load handshake never produced the success and prompt tokens.
    #[error("engine initialization did not complete within {0}s")]
    InitializationTimeout(u64),

    /// The process died or a pipe closed mid-session.
    #[error("engine communication failed: {0}")]
    Communication(String),

    /// Session budget exceeded and the transcript held no usable markers.
    #[error("consultation timed out after {0}s with no usable output")]
    SessionTimeout(u64),

    /// A transcript was produced but no structured records were found in it.
    #[error("transcript parse failed: {0}")]
    Parse(String),

    /// Another consultation currently holds the engine.
    #[error("engine is busy with another consultation")]
    Busy,
}
