//! CLI Tooling
//!
//! Replays request scripts against a seeded forest and looks records up.

use crate::config::{CanopyConfig, ConfigLoader};
use crate::logging::init_logging;
use crate::request::{Request, RequestFacade};
use crate::store::{Forest, RecordStore};
use crate::validation::RequiredFields;
use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::future::join_all;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::info;

/// Canopy CLI - hierarchical record store
#[derive(Parser)]
#[command(name = "canopy")]
#[command(about = "In-memory hierarchical record store with optimistic requests")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path (overrides canopy.toml lookup)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the simulated backend latency
    #[arg(long)]
    pub latency_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage a script of requests, wait for settlement, print the forest
    Replay {
        /// JSON array of records to start from (default: empty forest)
        #[arg(long)]
        seed: Option<PathBuf>,
        /// JSON array of requests ({"op": "create" | "update" | "delete", ...})
        #[arg(long)]
        script: PathBuf,
        /// Await each request before staging the next
        #[arg(long)]
        sequential: bool,
        /// Require firstName and lastName on create and update
        #[arg(long)]
        require_names: bool,
    },
    /// Print one record of a seed forest
    Find {
        #[arg(long)]
        seed: PathBuf,
        id: String,
    },
}

/// Resolved configuration for a CLI invocation
pub struct CliContext {
    config: CanopyConfig,
}

impl CliContext {
    pub fn new(config_path: Option<&Path>, latency_ms: Option<u64>) -> anyhow::Result<Self> {
        let mut config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => ConfigLoader::load(&std::env::current_dir()?)?,
        };
        if let Some(latency_ms) = latency_ms {
            config.requests.latency_ms = latency_ms;
        }
        Ok(Self { config })
    }

    pub fn from_config(config: CanopyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CanopyConfig {
        &self.config
    }

    /// Install the global subscriber, honoring a `--log-level` override
    pub fn init_logging(&self, level: Option<&str>) -> anyhow::Result<()> {
        let mut logging = self.config.logging.clone();
        if let Some(level) = level {
            logging.level = level.to_string();
        }
        init_logging(Some(&logging))?;
        Ok(())
    }

    pub async fn execute(&self, command: &Commands) -> anyhow::Result<String> {
        match command {
            Commands::Replay {
                seed,
                script,
                sequential,
                require_names,
            } => {
                let forest = load_seed(seed.as_deref())?;
                let requests: Vec<Request> = serde_json::from_str(
                    &std::fs::read_to_string(script)
                        .with_context(|| format!("reading script {}", script.display()))?,
                )
                .context("parsing request script")?;
                self.replay(forest, requests, *sequential, *require_names)
                    .await
            }
            Commands::Find { seed, id } => {
                let forest = load_seed(Some(seed.as_path()))?;
                Ok(match forest.find(id) {
                    Some(record) => serde_json::to_string_pretty(record)?,
                    None => format!("No record found with id: {}", id),
                })
            }
        }
    }

    async fn replay(
        &self,
        forest: Forest,
        requests: Vec<Request>,
        sequential: bool,
        require_names: bool,
    ) -> anyhow::Result<String> {
        let facade = RequestFacade::simulated(forest, self.config.requests.clone());
        if require_names {
            facade.set_validator(RequiredFields::person_names());
        }

        let total = requests.len();
        let mut rejected = Vec::new();
        let mut pending = Vec::new();
        for (index, request) in requests.into_iter().enumerate() {
            match facade.submit(request) {
                Ok(request) if sequential => {
                    if let Err(e) = request.await {
                        rejected.push(json!({"index": index, "error": e.to_string()}));
                    }
                }
                Ok(request) => pending.push((index, request)),
                Err(e) => rejected.push(json!({"index": index, "error": e.to_string()})),
            }
        }

        let (indices, requests): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        for (index, result) in indices.into_iter().zip(join_all(requests.into_iter().map(|r| r.settled())).await) {
            if let Err(e) = result {
                rejected.push(json!({"index": index, "error": e.to_string()}));
            }
        }

        info!(total, rejected = rejected.len(), "Replay finished");
        let output = json!({
            "forest": facade.snapshot(),
            "status": facade.status(),
            "errors": rejected,
        });
        Ok(serde_json::to_string_pretty(&output)?)
    }
}

fn load_seed(path: Option<&Path>) -> anyhow::Result<Forest> {
    let Some(path) = path else {
        return Ok(Forest::new());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading seed {}", path.display()))?;
    Ok(Forest::from_json(&json)?)
}
