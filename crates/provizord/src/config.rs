//! Configuration for the engine driver.
//!
//! Loads settings from /etc/provizor/config.toml or uses defaults. Every
//! timing knob of the console protocol lives here; the delays are fixed
//! constants by design, the engine offers no flow-control signal to derive
//! them from.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Config file path
pub const CONFIG_PATH: &str = "/etc/provizor/config.toml";

/// Engine driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Engine executable (the CLIPS shell).
    #[serde(default = "default_engine_command")]
    pub engine_command: String,

    /// Extra arguments passed to the engine executable.
    #[serde(default)]
    pub engine_args: Vec<String>,

    /// Knowledge base file loaded during the initialization handshake.
    #[serde(default = "default_knowledge_base")]
    pub knowledge_base: String,

    /// Handshake budget in seconds.
    #[serde(default = "default_init_timeout")]
    pub init_timeout_secs: u64,

    /// Overall per-consultation budget in seconds.
    #[serde(default = "default_session_timeout")]
    pub session_timeout_secs: u64,

    /// Fixed spacing between injected console lines, in milliseconds.
    #[serde(default = "default_line_delay")]
    pub line_delay_ms: u64,

    /// Delay before the reactive blank-line nudge on a stuck choice prompt.
    #[serde(default = "default_nudge_delay")]
    pub nudge_delay_ms: u64,
}

fn default_engine_command() -> String {
    "clips".to_string()
}

fn default_knowledge_base() -> String {
    "/var/lib/provizor/expert-system.clp".to_string()
}

fn default_init_timeout() -> u64 {
    10
}

fn default_session_timeout() -> u64 {
    20
}

fn default_line_delay() -> u64 {
    300
}

fn default_nudge_delay() -> u64 {
    500
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_command: default_engine_command(),
            engine_args: Vec::new(),
            knowledge_base: default_knowledge_base(),
            init_timeout_secs: default_init_timeout(),
            session_timeout_secs: default_session_timeout(),
            line_delay_ms: default_line_delay(),
            nudge_delay_ms: default_nudge_delay(),
        }
    }
}

impl EngineConfig {
    /// Load from the system path, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_PATH).unwrap_or_else(|e| {
            warn!("Config not found, using defaults: {}", e);
            EngineConfig::default()
        })
    }

    /// Load config from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: EngineConfig = toml::from_str(&content)?;
        info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }
}
