//! Process supervisor - lifecycle of the external expert-engine process.
//!
//! Spawns the CLIPS console, pipes its streams, performs the knowledge-base
//! load handshake and owns termination. One reader task forwards stdout to
//! the session driver as decoded chunks; stderr goes straight to the log.
//! There is no restart policy: engine state is not recoverable mid-session,
//! a dead process is surfaced, never respawned behind the caller's back.

use crate::config::EngineConfig;
use crate::engine::markers;
use provizor_common::EngineError;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Capacity of the stdout chunk channel. Output left unread between
/// sessions parks here until the next session drains it.
const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// A running engine process with its console pipes.
#[derive(Debug)]
pub struct EngineProcess {
    child: Child,
    pub(crate) stdin: ChildStdin,
    pub(crate) output_rx: mpsc::Receiver<String>,
}

impl EngineProcess {
    /// Spawn the engine and complete the initialization handshake: write the
    /// knowledge-base load command and wait until the output carries both
    /// the load-success token and the console prompt.
    pub async fn start(config: &EngineConfig) -> Result<Self, EngineError> {
        let mut child = Command::new(&config.engine_command)
            .args(&config.engine_args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| EngineError::ProcessSpawn(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| EngineError::ProcessSpawn("engine stdin not captured".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| EngineError::ProcessSpawn("engine stdout not captured".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| EngineError::ProcessSpawn("engine stderr not captured".to_string()))?;

        let (tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
        tokio::spawn(forward_output(stdout, tx));
        tokio::spawn(log_stderr(stderr));

        let mut process = Self { child, stdin, output_rx };
        process.handshake(config).await?;
        info!("Engine initialized, knowledge base {} loaded", config.knowledge_base);
        Ok(process)
    }

    async fn handshake(&mut self, config: &EngineConfig) -> Result<(), EngineError> {
        self.write_line(&format!("(load \"{}\")", config.knowledge_base)).await?;
        self.write_line("").await?;

        let deadline = Instant::now() + Duration::from_secs(config.init_timeout_secs);
        let mut banner = String::new();
        loop {
            let chunk = tokio::time::timeout_at(deadline, self.output_rx.recv())
                .await
                .map_err(|_| EngineError::InitializationTimeout(config.init_timeout_secs))?;
            match chunk {
                Some(text) => {
                    banner.push_str(&text);
                    if banner.contains(markers::LOAD_OK)
                        && banner.contains(markers::CONSOLE_PROMPT)
                    {
                        return Ok(());
                    }
                }
                None => {
                    return Err(EngineError::Communication(
                        "engine closed its output during initialization".to_string(),
                    ))
                }
            }
        }
    }

    /// Write one console line (newline appended) and flush.
    pub(crate) async fn write_line(&mut self, line: &str) -> Result<(), EngineError> {
        send_line(&mut self.stdin, line).await
    }

    /// Discard output left over from a previous session.
    pub(crate) fn drain_stale(&mut self) {
        let mut discarded = 0usize;
        while self.output_rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            debug!("Discarded {} stale output chunks", discarded);
        }
    }

    /// True while the child has not exited.
    pub fn is_running(&mut self) -> bool {
        matches!(self.child.try_wait(), Ok(None))
    }

    /// Kill the engine process. Idempotent, safe with no process running.
    pub async fn stop(&mut self) {
        self.child.start_kill().ok();
        let _ = self.child.wait().await;
        info!("Engine process stopped");
    }
}

pub(crate) async fn send_line(stdin: &mut ChildStdin, line: &str) -> Result<(), EngineError> {
    let comm = |e: std::io::Error| EngineError::Communication(e.to_string());
    stdin.write_all(line.as_bytes()).await.map_err(comm)?;
    stdin.write_all(b"\n").await.map_err(comm)?;
    stdin.flush().await.map_err(comm)?;
    Ok(())
}

/// Forward stdout to the session channel. Reads raw bytes and decodes
/// incrementally: a read can end mid-way through a multibyte character, so
/// only the valid UTF-8 prefix is forwarded and the tail carries over into
/// the next read.
async fn forward_output(mut stdout: ChildStdout, tx: mpsc::Sender<String>) {
    let mut pending: Vec<u8> = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = match stdout.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        pending.extend_from_slice(&buf[..n]);

        let valid = match std::str::from_utf8(&pending) {
            Ok(_) => pending.len(),
            Err(e) if e.error_len().is_some() => {
                // Genuinely invalid byte, not a truncated character: let the
                // lossy conversion substitute it and move on.
                pending.len()
            }
            Err(e) => e.valid_up_to(),
        };
        if valid == 0 {
            continue;
        }

        let chunk = String::from_utf8_lossy(&pending[..valid]).into_owned();
        pending.drain(..valid);
        if tx.send(chunk).await.is_err() {
            break;
        }
    }
    debug!("Engine stdout closed");
}

async fn log_stderr(stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        warn!("Engine stderr: {}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_for(command: &str, args: &[&str]) -> EngineConfig {
        EngineConfig {
            engine_command: command.to_string(),
            engine_args: args.iter().map(|s| s.to_string()).collect(),
            init_timeout_secs: 2,
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn spawn_failure_is_a_process_spawn_error() {
        let config = config_for("provizor-test-no-such-binary", &[]);
        let err = EngineProcess::start(&config).await.unwrap_err();
        assert!(matches!(err, EngineError::ProcessSpawn(_)));
    }

    #[tokio::test]
    async fn handshake_succeeds_on_load_token_and_prompt() {
        let config = config_for(
            "sh",
            &["-c", "echo 'TRUE'; printf 'CLIPS> '; while read line; do :; done"],
        );
        let mut process = EngineProcess::start(&config).await.unwrap();
        assert!(process.is_running());
        process.stop().await;
        // Idempotent with the process already gone.
        process.stop().await;
    }

    #[tokio::test]
    async fn silent_engine_times_out_initialization() {
        let config = EngineConfig {
            init_timeout_secs: 1,
            ..config_for("sh", &["-c", "while read line; do :; done"])
        };
        let err = EngineProcess::start(&config).await.unwrap_err();
        assert!(matches!(err, EngineError::InitializationTimeout(1)));
    }

    #[tokio::test]
    async fn engine_exit_during_handshake_is_a_communication_error() {
        let config = config_for("sh", &["-c", "exit 0"]);
        let err = EngineProcess::start(&config).await.unwrap_err();
        assert!(matches!(err, EngineError::Communication(_)));
    }
}
