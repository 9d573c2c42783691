//! The remote mutation service the controller confirms predictions against.
//!
//! The controller holds an `Arc<dyn RemoteMutations>`. `InMemoryRemote` is a
//! local authoritative store used by the binary and by tests; a network-backed
//! implementation lives with the transport layer, outside this crate.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::{Board, BoardId, ColumnId, JobApplication, JobId, JobPatch, NewJob};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("{0}")]
    Rejected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Remote call timed out after {0:?}")]
    Timeout(Duration),
}

/// Authoritative side of every mutation. A move is sent as
/// `update_entry(id, JobPatch::placement(column, order))`.
///
/// Calls are safe for a caller to retry, but the controller never does: a
/// failure is compensated locally and reported.
#[async_trait]
pub trait RemoteMutations: Send + Sync {
    async fn create_entry(
        &self,
        board_id: &BoardId,
        draft: &NewJob,
    ) -> Result<JobApplication, RemoteError>;

    async fn update_entry(&self, id: &JobId, patch: &JobPatch)
        -> Result<JobApplication, RemoteError>;

    async fn delete_entry(&self, id: &JobId) -> Result<(), RemoteError>;
}

struct Store {
    jobs: HashMap<JobId, JobApplication>,
    columns: Vec<ColumnId>,
    failure: Option<RemoteError>,
    latency: Option<Duration>,
}

/// Keeps entries in memory and assigns permanent ids on create.
pub struct InMemoryRemote {
    store: Mutex<Store>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::with_store(HashMap::new(), Vec::new())
    }

    /// Seeds the store with every column and entry on `board`. Creates into a
    /// column the board does not have are then rejected.
    pub fn seeded(board: &Board) -> Self {
        let jobs = board
            .columns
            .iter()
            .flat_map(|col| col.job_applications.iter())
            .map(|job| (job.id.clone(), job.clone()))
            .collect();
        let columns = board.columns.iter().map(|col| col.id.clone()).collect();
        Self::with_store(jobs, columns)
    }

    fn with_store(jobs: HashMap<JobId, JobApplication>, columns: Vec<ColumnId>) -> Self {
        Self {
            store: Mutex::new(Store {
                jobs,
                columns,
                failure: None,
                latency: None,
            }),
        }
    }

    /// Makes every following call fail with `error` until cleared with `None`.
    pub async fn set_failure(&self, error: Option<RemoteError>) {
        self.store.lock().await.failure = error;
    }

    /// Delays every following call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.store.lock().await.latency = latency;
    }

    pub async fn get(&self, id: &JobId) -> Option<JobApplication> {
        self.store.lock().await.jobs.get(id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.store.lock().await.jobs.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn gate(&self) -> Result<(), RemoteError> {
        let (failure, latency) = {
            let store = self.store.lock().await;
            (store.failure.clone(), store.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RemoteMutations for InMemoryRemote {
    async fn create_entry(
        &self,
        _board_id: &BoardId,
        draft: &NewJob,
    ) -> Result<JobApplication, RemoteError> {
        self.gate().await?;
        let mut store = self.store.lock().await;
        if !store.columns.is_empty() && !store.columns.contains(&draft.column_id) {
            return Err(RemoteError::NotFound(format!("column {}", draft.column_id)));
        }

        let order = store
            .jobs
            .values()
            .filter(|job| job.column_id == draft.column_id)
            .count();
        let job = JobApplication::provisional(
            JobId::new(Uuid::new_v4().simple().to_string()),
            draft,
            order,
            Utc::now(),
        );
        store.jobs.insert(job.id.clone(), job.clone());
        Ok(job)
    }

    async fn update_entry(
        &self,
        id: &JobId,
        patch: &JobPatch,
    ) -> Result<JobApplication, RemoteError> {
        self.gate().await?;
        let mut store = self.store.lock().await;
        let job = store
            .jobs
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(format!("job application {id}")))?;
        patch.apply_to(job);
        job.updated_at = Utc::now();
        Ok(job.clone())
    }

    async fn delete_entry(&self, id: &JobId) -> Result<(), RemoteError> {
        self.gate().await?;
        self.store
            .lock()
            .await
            .jobs
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RemoteError::NotFound(format!("job application {id}")))
    }
}
