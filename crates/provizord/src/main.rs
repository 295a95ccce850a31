//! Provizor daemon - drives the pharmacist expert engine.
//!
//! One-shot command-line boundary around the engine driver: run a
//! consultation from a JSON request file, list the symptom catalog, or
//! health-check the engine. Transport layers (HTTP and the like) sit on top
//! of the library, not in here.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use provizor_common::{symptom_catalog, ConsultationRequest};
use provizord::{EngineConfig, ExpertEngine};
use std::fs;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "provizord", version, about = "Pharmacist expert-engine driver")]
struct Cli {
    /// Config file (defaults to /etc/provizor/config.toml, then built-ins).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one consultation from a JSON request file and print the result.
    Consult {
        /// Path to a consultation request JSON file.
        #[arg(long)]
        request: PathBuf,
    },
    /// Print the symptom catalog as JSON.
    SymptomTypes,
    /// Spawn the engine, run the load handshake and report readiness.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load_from_path(path)?,
        None => EngineConfig::load(),
    };

    match cli.command {
        Command::SymptomTypes => {
            println!("{}", serde_json::to_string_pretty(&symptom_catalog())?);
        }

        Command::Check => {
            info!("provizord v{} engine check", env!("CARGO_PKG_VERSION"));
            let engine = ExpertEngine::start(config).await?;
            println!(
                "{}",
                serde_json::json!({ "status": "OK", "running": engine.is_running() })
            );
            engine.shutdown().await;
        }

        Command::Consult { request } => {
            let raw = fs::read_to_string(&request)
                .with_context(|| format!("reading request file {}", request.display()))?;
            let request: ConsultationRequest =
                serde_json::from_str(&raw).context("request file is not a valid consultation request")?;

            let engine = ExpertEngine::start(config).await?;
            let outcome = engine.consult(&request).await;
            engine.shutdown().await;

            let result = outcome?;
            info!(
                "Consultation finished: {} recommendations, {} without a drug",
                result.summary.total_found, result.summary.total_missing
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
