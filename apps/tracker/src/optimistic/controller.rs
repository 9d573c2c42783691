//! Predict-then-confirm wrapper around the four board mutations.
//!
//! Every operation runs in two steps. `begin_*` validates, captures the
//! compensating action from the current snapshot and applies the prediction
//! synchronously, so subscribers see the change before any remote work starts.
//! `settle` performs the remote call and either confirms or compensates.
//!
//! Each operation captures its own rollback at `begin_*` time. Two overlapping
//! operations on the same entry can therefore race: if the earlier one fails
//! after the later one was applied, its compensation overwrites the later
//! prediction. Nothing here serialises them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::board::{reduce, BoardAction};
use crate::errors::{MutationError, MutationResult};
use crate::models::{Board, ColumnId, JobApplication, JobId, JobPatch, NewJob};
use crate::optimistic::ids::{IdGenerator, UuidIdGenerator};
use crate::optimistic::operation::{
    Confirmation, InFlightGuard, MutationIntent, Phase, PendingMutation,
};
use crate::optimistic::remote::{RemoteError, RemoteMutations};
use crate::validation::{validate_new_job, validate_patch};

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Upper bound on a single remote call. Exceeding it counts as a failure.
    pub remote_timeout: Duration,
    pub temp_id_prefix: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
            temp_id_prefix: "temp-".to_string(),
        }
    }
}

struct Inner {
    board: watch::Sender<Arc<Board>>,
    in_flight: Arc<watch::Sender<usize>>,
    remote: Arc<dyn RemoteMutations>,
    ids: Arc<dyn IdGenerator>,
    remote_timeout: Duration,
    next_operation: AtomicU64,
}

/// Owns the live board snapshot. Cheap to clone; clones share state.
///
/// `begin_*` is expected to be called from a single UI task. Settling may
/// happen concurrently from anywhere.
#[derive(Clone)]
pub struct BoardController {
    inner: Arc<Inner>,
}

impl BoardController {
    pub fn new(board: Board, remote: Arc<dyn RemoteMutations>, config: ControllerConfig) -> Self {
        let ids = Arc::new(UuidIdGenerator::new(config.temp_id_prefix.clone()));
        Self::with_id_generator(board, remote, ids, config)
    }

    pub fn with_id_generator(
        board: Board,
        remote: Arc<dyn RemoteMutations>,
        ids: Arc<dyn IdGenerator>,
        config: ControllerConfig,
    ) -> Self {
        let (board, _) = watch::channel(Arc::new(board));
        let (in_flight, _) = watch::channel(0usize);
        Self {
            inner: Arc::new(Inner {
                board,
                in_flight: Arc::new(in_flight),
                remote,
                ids,
                remote_timeout: config.remote_timeout,
                next_operation: AtomicU64::new(1),
            }),
        }
    }

    /// The board as the UI should currently render it.
    pub fn snapshot(&self) -> Arc<Board> {
        self.inner.board.borrow().clone()
    }

    /// Notified whenever the visible snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Board>> {
        self.inner.board.subscribe()
    }

    /// Number of operations that are predicted but not yet settled.
    pub fn subscribe_pending(&self) -> watch::Receiver<usize> {
        self.inner.in_flight.subscribe()
    }

    pub fn in_flight(&self) -> usize {
        *self.inner.in_flight.borrow()
    }

    pub fn is_pending(&self) -> bool {
        self.in_flight() > 0
    }

    /// Installs a freshly loaded board. A board logically equal to the current
    /// one is ignored so subscribers are not woken for nothing. Returns whether
    /// the snapshot changed.
    pub fn replace_snapshot(&self, board: Board) -> bool {
        self.inner.board.send_if_modified(|current| {
            if current.logically_eq(&board) {
                return false;
            }
            *current = Arc::new(board);
            true
        })
    }

    // ── begin: validate, capture rollback, apply prediction ────────────────

    pub fn begin_create(&self, mut draft: NewJob) -> MutationResult<PendingMutation> {
        validate_new_job(&mut draft)?;

        let board = self.snapshot();
        let column = board
            .column(&draft.column_id)
            .ok_or_else(|| MutationError::ColumnNotFound(draft.column_id.clone()))?;

        let provisional_id = self.inner.ids.temporary_id();
        let job = JobApplication::provisional(
            provisional_id.clone(),
            &draft,
            column.len(),
            Utc::now(),
        );

        Ok(self.predict(
            BoardAction::Add { job },
            MutationIntent::Create {
                board_id: board.id.clone(),
                provisional_id: provisional_id.clone(),
                draft,
            },
            BoardAction::Delete { id: provisional_id },
        ))
    }

    pub fn begin_update(&self, id: &JobId, mut patch: JobPatch) -> MutationResult<PendingMutation> {
        validate_patch(&mut patch)?;

        let board = self.snapshot();
        let current = board
            .find_job(id)
            .ok_or_else(|| MutationError::JobNotFound(id.clone()))?;
        let restore = patch.inverse_for(current);

        Ok(self.predict(
            BoardAction::Update {
                id: id.clone(),
                patch: patch.clone(),
            },
            MutationIntent::Update {
                id: id.clone(),
                patch,
            },
            BoardAction::Update {
                id: id.clone(),
                patch: restore,
            },
        ))
    }

    pub fn begin_move(
        &self,
        id: &JobId,
        column_id: &ColumnId,
        order: usize,
    ) -> MutationResult<PendingMutation> {
        let board = self.snapshot();
        if board.column(column_id).is_none() {
            return Err(MutationError::ColumnNotFound(column_id.clone()));
        }
        let (holder, _) = board
            .locate(id)
            .ok_or_else(|| MutationError::JobNotFound(id.clone()))?;
        // The reducer inserts at an index into the order-sorted column, and
        // `order` values can have gaps, so the rollback uses the index.
        let position = holder
            .entries_by_order()
            .iter()
            .position(|job| &job.id == id)
            .unwrap_or_default();

        Ok(self.predict(
            BoardAction::Move {
                id: id.clone(),
                column_id: column_id.clone(),
                order,
            },
            MutationIntent::Move {
                id: id.clone(),
                column_id: column_id.clone(),
                order,
            },
            BoardAction::Move {
                id: id.clone(),
                column_id: holder.id.clone(),
                order: position,
            },
        ))
    }

    pub fn begin_delete(&self, id: &JobId) -> MutationResult<PendingMutation> {
        let board = self.snapshot();
        let current = board
            .find_job(id)
            .ok_or_else(|| MutationError::JobNotFound(id.clone()))?;

        Ok(self.predict(
            BoardAction::Delete { id: id.clone() },
            MutationIntent::Delete { id: id.clone() },
            BoardAction::Add {
                job: current.clone(),
            },
        ))
    }

    // ── settle: confirm or compensate ──────────────────────────────────────

    pub async fn settle(&self, mut pending: PendingMutation) -> MutationResult<Confirmation> {
        match self.call_remote(pending.intent()).await {
            Ok(confirmation) => {
                pending.advance(Phase::Confirmed)?;
                if let (MutationIntent::Create { provisional_id, .. }, Confirmation::Saved(job)) =
                    (pending.intent(), &confirmation)
                {
                    self.apply(&BoardAction::Reconcile {
                        provisional_id: provisional_id.clone(),
                        job: job.clone(),
                    });
                }
                info!(
                    operation = pending.id(),
                    kind = pending.intent().kind(),
                    job = %pending.intent().job_id(),
                    "Remote confirmed mutation"
                );
                pending.advance(Phase::Settled)?;
                Ok(confirmation)
            }
            Err(error) => {
                pending.advance(Phase::Compensating)?;
                warn!(
                    operation = pending.id(),
                    kind = pending.intent().kind(),
                    job = %pending.intent().job_id(),
                    %error,
                    "Remote mutation failed; compensating"
                );
                self.apply(pending.compensation());
                pending.advance(Phase::Settled)?;
                Err(MutationError::Remote(error))
            }
        }
    }

    // ── one-shot operations ────────────────────────────────────────────────

    pub async fn create(&self, draft: NewJob) -> MutationResult<JobApplication> {
        let pending = self.begin_create(draft)?;
        self.settle(pending).await?.into_saved()
    }

    pub async fn update(&self, id: &JobId, patch: JobPatch) -> MutationResult<JobApplication> {
        let pending = self.begin_update(id, patch)?;
        self.settle(pending).await?.into_saved()
    }

    pub async fn move_job(
        &self,
        id: &JobId,
        column_id: &ColumnId,
        order: usize,
    ) -> MutationResult<JobApplication> {
        let pending = self.begin_move(id, column_id, order)?;
        self.settle(pending).await?.into_saved()
    }

    pub async fn delete(&self, id: &JobId) -> MutationResult<()> {
        let pending = self.begin_delete(id)?;
        self.settle(pending).await.map(|_| ())
    }

    // ── internals ──────────────────────────────────────────────────────────

    fn predict(
        &self,
        action: BoardAction,
        intent: MutationIntent,
        compensation: BoardAction,
    ) -> PendingMutation {
        let id = self.inner.next_operation.fetch_add(1, Ordering::Relaxed);
        let in_flight = InFlightGuard::acquire(Arc::clone(&self.inner.in_flight));
        self.apply(&action);
        debug!(
            operation = id,
            kind = intent.kind(),
            job = %intent.job_id(),
            "Applied optimistic prediction"
        );
        PendingMutation::new(id, intent, compensation, in_flight)
    }

    /// Runs `action` through the reducer. Subscribers are only notified when
    /// the reducer produced a new snapshot.
    fn apply(&self, action: &BoardAction) {
        self.inner.board.send_if_modified(|board| {
            let next = reduce(board, action);
            if Arc::ptr_eq(board, &next) {
                debug!(kind = action.kind(), "Board action was a no-op");
                return false;
            }
            *board = next;
            true
        });
    }

    async fn call_remote(&self, intent: &MutationIntent) -> Result<Confirmation, RemoteError> {
        let remote = &self.inner.remote;
        let call = async {
            match intent {
                MutationIntent::Create {
                    board_id, draft, ..
                } => remote
                    .create_entry(board_id, draft)
                    .await
                    .map(Confirmation::Saved),
                MutationIntent::Update { id, patch } => remote
                    .update_entry(id, patch)
                    .await
                    .map(Confirmation::Saved),
                MutationIntent::Move {
                    id,
                    column_id,
                    order,
                } => remote
                    .update_entry(id, &JobPatch::placement(column_id.clone(), *order))
                    .await
                    .map(Confirmation::Saved),
                MutationIntent::Delete { id } => remote
                    .delete_entry(id)
                    .await
                    .map(|()| Confirmation::Deleted(id.clone())),
            }
        };

        let limit = self.inner.remote_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => Err(RemoteError::Timeout(limit)),
        }
    }
}
