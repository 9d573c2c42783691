use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::warn;

use crate::board::BoardAction;
use crate::errors::{MutationError, MutationResult};
use crate::models::{BoardId, ColumnId, JobApplication, JobId, JobPatch, NewJob};

pub type OperationId = u64;

/// Lifecycle of one in-flight operation.
///
/// ```text
/// Predicted ──► Confirmed ────► Settled
///     └───────► Compensating ──► Settled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Prediction applied, remote call not yet resolved.
    Predicted,
    Confirmed,
    /// Remote call failed, compensating action being applied.
    Compensating,
    Settled,
}

impl Phase {
    pub fn can_advance_to(self, next: Phase) -> bool {
        matches!(
            (self, next),
            (Phase::Predicted, Phase::Confirmed)
                | (Phase::Predicted, Phase::Compensating)
                | (Phase::Confirmed, Phase::Settled)
                | (Phase::Compensating, Phase::Settled)
        )
    }
}

/// The remote call an operation still owes.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationIntent {
    Create {
        board_id: BoardId,
        provisional_id: JobId,
        draft: NewJob,
    },
    Update {
        id: JobId,
        patch: JobPatch,
    },
    Move {
        id: JobId,
        column_id: ColumnId,
        order: usize,
    },
    Delete {
        id: JobId,
    },
}

impl MutationIntent {
    pub fn kind(&self) -> &'static str {
        match self {
            MutationIntent::Create { .. } => "create",
            MutationIntent::Update { .. } => "update",
            MutationIntent::Move { .. } => "move",
            MutationIntent::Delete { .. } => "delete",
        }
    }

    /// The entry the operation targets, provisional id for creates.
    pub fn job_id(&self) -> &JobId {
        match self {
            MutationIntent::Create { provisional_id, .. } => provisional_id,
            MutationIntent::Update { id, .. }
            | MutationIntent::Move { id, .. }
            | MutationIntent::Delete { id } => id,
        }
    }
}

/// What the remote side confirmed.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    /// Create, update and move echo the stored entry.
    Saved(JobApplication),
    Deleted(JobId),
}

impl Confirmation {
    pub fn into_saved(self) -> MutationResult<JobApplication> {
        match self {
            Confirmation::Saved(job) => Ok(job),
            Confirmation::Deleted(id) => Err(MutationError::JobNotFound(id)),
        }
    }
}

/// Counts one unit on the shared in-flight indicator for as long as it lives.
#[derive(Debug)]
pub(crate) struct InFlightGuard {
    counter: Arc<watch::Sender<usize>>,
}

impl InFlightGuard {
    pub(crate) fn acquire(counter: Arc<watch::Sender<usize>>) -> Self {
        counter.send_modify(|n| *n += 1);
        Self { counter }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// An operation whose prediction is on the board and whose remote call has
/// not been settled. Carries its own compensating action, captured when the
/// prediction was applied.
///
/// Dropping it abandons the operation: the prediction stays, nothing is
/// compensated, and the in-flight indicator is released.
#[derive(Debug)]
#[must_use = "a pending mutation does nothing until it is settled"]
pub struct PendingMutation {
    id: OperationId,
    intent: MutationIntent,
    compensation: BoardAction,
    phase: Phase,
    _in_flight: InFlightGuard,
}

impl PendingMutation {
    pub(crate) fn new(
        id: OperationId,
        intent: MutationIntent,
        compensation: BoardAction,
        in_flight: InFlightGuard,
    ) -> Self {
        Self {
            id,
            intent,
            compensation,
            phase: Phase::Predicted,
            _in_flight: in_flight,
        }
    }

    pub fn id(&self) -> OperationId {
        self.id
    }

    pub fn intent(&self) -> &MutationIntent {
        &self.intent
    }

    pub fn compensation(&self) -> &BoardAction {
        &self.compensation
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn advance(&mut self, next: Phase) -> MutationResult<()> {
        if !self.phase.can_advance_to(next) {
            warn!(
                operation = self.id,
                from = ?self.phase,
                to = ?next,
                "Rejected operation phase transition"
            );
            return Err(MutationError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        self.phase = next;
        Ok(())
    }
}
