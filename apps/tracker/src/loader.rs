//! Reads the authoritative board snapshot.
//!
//! The snapshot is either a bare board document or the API envelope
//! `{ "data": board }` / `{ "error": message }`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::models::Board;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read board snapshot {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed board snapshot: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Board load rejected: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait BoardLoader: Send + Sync {
    async fn load_board(&self) -> Result<Board, LoadError>;
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Snapshot {
    Bare(Board),
    Envelope {
        #[serde(default)]
        data: Option<Board>,
        #[serde(default)]
        error: Option<String>,
    },
}

impl Snapshot {
    fn into_board(self) -> Result<Board, LoadError> {
        match self {
            Snapshot::Bare(board) => Ok(board),
            Snapshot::Envelope {
                error: Some(message),
                ..
            } => Err(LoadError::Rejected(message)),
            Snapshot::Envelope {
                data: Some(board), ..
            } => Ok(board),
            Snapshot::Envelope { .. } => Err(LoadError::Rejected("Board not found".to_string())),
        }
    }
}

/// Parses a snapshot document already held in memory.
pub fn parse_snapshot(contents: &str) -> Result<Board, LoadError> {
    serde_json::from_str::<Snapshot>(contents)?.into_board()
}

/// Loads the board from a JSON file on disk.
#[derive(Debug, Clone)]
pub struct JsonFileBoardLoader {
    path: PathBuf,
}

impl JsonFileBoardLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl BoardLoader for JsonFileBoardLoader {
    async fn load_board(&self) -> Result<Board, LoadError> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.path.clone(),
                source,
            })?;
        let board = parse_snapshot(&contents)?;
        debug!(
            board = %board.id,
            columns = board.columns.len(),
            entries = board.total_entries(),
            "Loaded board snapshot"
        );
        Ok(board)
    }
}
