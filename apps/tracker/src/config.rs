use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::optimistic::ControllerConfig;

/// Runtime configuration loaded from environment variables.
/// Startup fails if a required variable is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub snapshot_path: PathBuf,
    pub script_path: Option<PathBuf>,
    pub search_query: String,
    pub remote_timeout: Duration,
    pub temp_id_prefix: String,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            snapshot_path: require_env("BOARD_SNAPSHOT_PATH")?.into(),
            script_path: optional_env("MUTATION_SCRIPT_PATH").map(PathBuf::from),
            search_query: optional_env("SEARCH_QUERY").unwrap_or_default(),
            remote_timeout: Duration::from_millis(
                std::env::var("REMOTE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "10000".to_string())
                    .parse::<u64>()
                    .context("REMOTE_TIMEOUT_MS must be a whole number of milliseconds")?,
            ),
            temp_id_prefix: std::env::var("TEMP_ID_PREFIX").unwrap_or_else(|_| "temp-".to_string()),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            remote_timeout: self.remote_timeout,
            temp_id_prefix: self.temp_id_prefix.clone(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
