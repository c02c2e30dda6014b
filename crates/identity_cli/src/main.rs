//! IPPAN Identity Registry command line driver
//!
//! Replays a JSON script of registry operations against an in-memory registry
//! and reports the outcome of each step.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ippan_identity_registry::{
    CommandOutcome, ManualClock, Principal, RecordingLedger, RegistryCommand, RegistryConfig,
    RegistryService,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ippan-identity")]
#[command(about = "IPPAN Identity Registry driver", long_about = None)]
#[command(version)]
struct Cli {
    /// Registry configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a script of registry operations
    Run {
        /// JSON array of steps: {"caller": .., "height": .., "command": {"op": ..}}
        #[arg(long, value_name = "PATH")]
        script: PathBuf,
        /// Write the final registry snapshot here as JSON
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,
    },
    /// Print the effective configuration
    Config,
}

/// One scripted operation.
#[derive(Debug, Deserialize)]
struct ScriptStep {
    caller: Principal,
    /// Clock height for this step; keeps the previous height when omitted
    #[serde(default)]
    height: Option<u64>,
    command: RegistryCommand,
}

/// Result line printed for every step.
#[derive(Debug, Serialize)]
struct StepReport {
    step: usize,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    outcome: Option<CommandOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<u32>,
}

fn load_config(path: Option<&Path>) -> Result<RegistryConfig> {
    let mut config = match path {
        Some(path) => RegistryConfig::load_from_file(path)?,
        None => RegistryConfig::default(),
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn init_tracing(default_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn replay(config: &RegistryConfig, steps: Vec<ScriptStep>) -> (RegistryService, Vec<StepReport>) {
    let clock = Arc::new(ManualClock::new(0));
    let registry = RegistryService::new(config, Arc::new(RecordingLedger::new()), clock.clone());

    let reports = steps
        .into_iter()
        .enumerate()
        .map(|(step, ScriptStep { caller, height, command })| {
            if let Some(height) = height {
                clock.set(height);
            }
            match registry.execute(&caller, command) {
                Ok(outcome) => StepReport {
                    step,
                    ok: true,
                    outcome: Some(outcome),
                    error: None,
                    code: None,
                },
                Err(e) => StepReport {
                    step,
                    ok: false,
                    outcome: None,
                    code: e.code(),
                    error: Some(e.to_string()),
                },
            }
        })
        .collect();
    (registry, reports)
}

fn handle_run(config: &RegistryConfig, script: &Path, snapshot: Option<&Path>) -> Result<()> {
    let content = fs::read_to_string(script)
        .with_context(|| format!("Failed to read script {}", script.display()))?;
    let steps: Vec<ScriptStep> =
        serde_json::from_str(&content).context("Failed to parse script")?;
    info!(steps = steps.len(), "replaying script");

    let (registry, reports) = replay(config, steps);
    for report in &reports {
        println!("{}", serde_json::to_string(report)?);
    }

    let failed = reports.iter().filter(|r| !r.ok).count();
    info!(
        applied = reports.len() - failed,
        failed,
        identities = registry.get_identity_count(),
        "replay finished"
    );

    if let Some(path) = snapshot {
        let json = serde_json::to_string_pretty(&registry.snapshot())?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
        info!("Snapshot written to {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    match cli.command {
        Commands::Run { script, snapshot } => handle_run(&config, &script, snapshot.as_deref()),
        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(json: &str) -> Vec<ScriptStep> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_replay_reports_each_step() {
        let script = steps(
            r#"[
                {"caller": "C", "command": {"op": "register_identity", "pseudonym": "Creator1", "public_key": "pubkey123"}},
                {"caller": "C", "command": {"op": "set_authority", "principal": "A"}},
                {"caller": "C", "height": 3, "command": {"op": "register_identity", "pseudonym": "Creator1", "public_key": "pubkey123", "metadata": "Artist Profile"}},
                {"caller": "C", "command": {"op": "register_identity", "pseudonym": "Creator1", "public_key": "pubkey456"}}
            ]"#,
        );
        let (registry, reports) = replay(&RegistryConfig::default(), script);

        assert_eq!(reports.len(), 4);
        assert_eq!(reports[0].code, Some(110));
        assert!(reports[1].ok);
        assert_eq!(reports[2].outcome, Some(CommandOutcome::Registered { id: 0 }));
        assert_eq!(reports[3].code, Some(104));
        assert_eq!(registry.get_identity(0).unwrap().created_at, 3);
    }

    #[test]
    fn test_load_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        fs::write(&path, "max_identities = 1\ncreation_fee = 7\n").unwrap();

        // read the file directly so IDENTITY_REGISTRY_* in the environment can't leak in
        let config = RegistryConfig::load_from_file(&path).unwrap();
        config.validate().unwrap();
        assert_eq!(config.max_identities, 1);
        assert_eq!(config.creation_fee, 7);

        let script = steps(
            r#"[
                {"caller": "C", "command": {"op": "set_authority", "principal": "A"}},
                {"caller": "C", "command": {"op": "register_identity", "pseudonym": "one", "public_key": "pk"}},
                {"caller": "C", "command": {"op": "register_identity", "pseudonym": "two", "public_key": "pk"}}
            ]"#,
        );
        let (_, reports) = replay(&config, script);
        assert!(reports[1].ok);
        assert_eq!(reports[2].code, Some(107));
    }
}
