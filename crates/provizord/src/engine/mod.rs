//! Engine driver - owns the expert-engine process and serializes sessions.
//!
//! The process exposes one command stream and one output stream and has no
//! notion of concurrent sessions, so the handle lives behind a mutex:
//! exactly one consultation holds the console at a time, the rest either
//! queue (`consult`) or bounce with `Busy` (`try_consult`).

pub mod markers;
pub mod monitor;
pub mod parser;
pub mod sequencer;
pub mod supervisor;

mod session;

pub use monitor::{MonitorAction, SessionMonitor, SessionState};
pub use parser::parse_transcript;
pub use sequencer::command_lines;
pub use supervisor::EngineProcess;

use crate::config::EngineConfig;
use provizor_common::{ConsultationRequest, ConsultationResult, EngineError};
use tokio::sync::Mutex;
use tracing::info;

/// Handle to one running expert-engine process.
pub struct ExpertEngine {
    config: EngineConfig,
    process: Mutex<EngineProcess>,
}

impl ExpertEngine {
    /// Spawn the engine process and run the initialization handshake.
    pub async fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let process = EngineProcess::start(&config).await?;
        Ok(Self { config, process: Mutex::new(process) })
    }

    /// Run one consultation session, queueing behind any active session.
    pub async fn consult(
        &self,
        request: &ConsultationRequest,
    ) -> Result<ConsultationResult, EngineError> {
        let mut process = self.process.lock().await;
        info!(
            "Consultation for {} ({} symptoms)",
            request.patient.name,
            request.symptoms.len()
        );
        session::run_session(&mut process, request, &self.config).await
    }

    /// Run one consultation session, failing immediately with
    /// [`EngineError::Busy`] when another session holds the engine.
    pub async fn try_consult(
        &self,
        request: &ConsultationRequest,
    ) -> Result<ConsultationResult, EngineError> {
        let mut process = self.process.try_lock().map_err(|_| EngineError::Busy)?;
        info!(
            "Consultation for {} ({} symptoms)",
            request.patient.name,
            request.symptoms.len()
        );
        session::run_session(&mut process, request, &self.config).await
    }

    /// True while the engine process is alive. Never waits on an active
    /// session: a held lock already proves the process is in use.
    pub fn is_running(&self) -> bool {
        match self.process.try_lock() {
            Ok(mut process) => process.is_running(),
            Err(_) => true,
        }
    }

    /// Terminate the engine process. Idempotent.
    pub async fn shutdown(&self) {
        self.process.lock().await.stop().await;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
