//! Session driver - one consultation from reset to terminal outcome.
//!
//! A single task owns the whole exchange: paced command injection, output
//! monitoring, the one-shot stuck-prompt nudge and the overall budget all
//! live in one select loop, so no timers ever race each other. On budget
//! expiry the transcript is salvage-parsed if it carries structural markers;
//! the engine process itself survives a timeout and is hard-reset by the
//! next session.

use crate::config::EngineConfig;
use crate::engine::monitor::{MonitorAction, SessionMonitor};
use crate::engine::supervisor::{send_line, EngineProcess};
use crate::engine::{markers, parser, sequencer};
use provizor_common::{ConsultationRequest, ConsultationResult, EngineError};
use tokio::time::{self, Duration, Instant};
use tracing::{debug, warn};

pub(crate) async fn run_session(
    process: &mut EngineProcess,
    request: &ConsultationRequest,
    config: &EngineConfig,
) -> Result<ConsultationResult, EngineError> {
    let lines = sequencer::command_lines(request);
    let pace = Duration::from_millis(config.line_delay_ms);
    let deadline = Instant::now() + Duration::from_secs(config.session_timeout_secs);

    let mut monitor = SessionMonitor::new();
    let mut line_idx = 0usize;
    let mut next_write = Instant::now();
    let mut nudge_at: Option<Instant> = None;

    process.drain_stale();
    debug!(
        "Session start: {} console lines, {}s budget",
        lines.len(),
        config.session_timeout_secs
    );

    loop {
        // Disabled branches still evaluate their deadline expression.
        let nudge_deadline = nudge_at.unwrap_or(deadline);

        tokio::select! {
            _ = time::sleep_until(deadline) => {
                return salvage(monitor.transcript(), config);
            }

            maybe_chunk = process.output_rx.recv() => {
                let chunk = maybe_chunk.ok_or_else(|| EngineError::Communication(
                    "engine output stream closed mid-session".to_string(),
                ))?;
                match monitor.observe(&chunk) {
                    MonitorAction::Complete => break,
                    MonitorAction::InjectBlankLine => {
                        warn!("Choice prompt stalled after terminator, scheduling blank-line nudge");
                        nudge_at = Some(Instant::now() + Duration::from_millis(config.nudge_delay_ms));
                    }
                    MonitorAction::None => {}
                }
            }

            _ = time::sleep_until(next_write), if line_idx < lines.len() => {
                let line = &lines[line_idx];
                debug!("Console line {}/{}: {:?}", line_idx + 1, lines.len(), line);
                send_line(&mut process.stdin, line).await?;
                if line == markers::SYMPTOM_TERMINATOR {
                    monitor.note_terminator_sent();
                }
                line_idx += 1;
                next_write = Instant::now() + pace;
            }

            _ = time::sleep_until(nudge_deadline), if nudge_at.is_some() => {
                debug!("Injecting reactive blank line");
                send_line(&mut process.stdin, "").await?;
                monitor.note_nudge_sent();
                nudge_at = None;
            }
        }
    }

    parser::parse_transcript(monitor.transcript())
}

/// Budget expired. A transcript that already opened a recommendation block
/// or printed a summary line is structurally useful and goes through the
/// normal parse; anything else is a timeout.
fn salvage(transcript: &str, config: &EngineConfig) -> Result<ConsultationResult, EngineError> {
    if transcript.contains(markers::BLOCK_START) || transcript.contains(markers::SUMMARY_FOUND) {
        warn!("Session budget exhausted, salvaging partial transcript");
        return parser::parse_transcript(transcript);
    }
    Err(EngineError::SessionTimeout(config.session_timeout_secs))
}
