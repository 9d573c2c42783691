//! Pure board transitions.
//!
//! `reduce` never fails: an action naming an entry or column that is not on
//! the board hands back the input snapshot itself. Columns a transition does
//! not touch are shared with the input by `Arc`.

use std::sync::Arc;

use crate::board::ordering::{renumber, sort_by_order};
use crate::models::{Board, Column, ColumnId, JobApplication, JobId, JobPatch};

#[derive(Debug, Clone, PartialEq)]
pub enum BoardAction {
    /// Appends `job` to the column named by `job.column_id`.
    Add { job: JobApplication },
    /// Merges `patch` into the first entry with `id`.
    Update { id: JobId, patch: JobPatch },
    Delete { id: JobId },
    /// Relocates an entry and densely renumbers the target column. The source
    /// column keeps its remaining `order` values as they were.
    Move {
        id: JobId,
        column_id: ColumnId,
        order: usize,
    },
    /// Swaps a provisional entry for the authoritative one returned by a
    /// confirmed create.
    Reconcile {
        provisional_id: JobId,
        job: JobApplication,
    },
}

impl BoardAction {
    pub fn kind(&self) -> &'static str {
        match self {
            BoardAction::Add { .. } => "add",
            BoardAction::Update { .. } => "update",
            BoardAction::Delete { .. } => "delete",
            BoardAction::Move { .. } => "move",
            BoardAction::Reconcile { .. } => "reconcile",
        }
    }
}

pub fn reduce(board: &Arc<Board>, action: &BoardAction) -> Arc<Board> {
    match action {
        BoardAction::Add { job } => add(board, job),
        BoardAction::Update { id, patch } => update(board, id, patch),
        BoardAction::Delete { id } => delete(board, id),
        BoardAction::Move {
            id,
            column_id,
            order,
        } => move_job(board, id, column_id, *order),
        BoardAction::Reconcile {
            provisional_id,
            job,
        } => reconcile(board, provisional_id, job),
    }
}

/// Rebuilds the board from per-column edits. `None` keeps the column as is;
/// if no column changes the input snapshot is returned.
fn rebuild(board: &Arc<Board>, mut edit: impl FnMut(&Column) -> Option<Column>) -> Arc<Board> {
    let mut changed = false;
    let columns: Vec<Arc<Column>> = board
        .columns
        .iter()
        .map(|col| match edit(col) {
            Some(next) => {
                changed = true;
                Arc::new(next)
            }
            None => Arc::clone(col),
        })
        .collect();

    if !changed {
        return Arc::clone(board);
    }
    Arc::new(Board {
        id: board.id.clone(),
        name: board.name.clone(),
        user_id: board.user_id.clone(),
        columns,
    })
}

fn add(board: &Arc<Board>, job: &JobApplication) -> Arc<Board> {
    rebuild(board, |col| {
        if col.id != job.column_id {
            return None;
        }
        let mut next = col.clone();
        next.job_applications.push(job.clone());
        sort_by_order(&mut next.job_applications);
        Some(next)
    })
}

fn update(board: &Arc<Board>, id: &JobId, patch: &JobPatch) -> Arc<Board> {
    let mut applied = false;
    rebuild(board, |col| {
        if applied {
            return None;
        }
        let index = col.job_applications.iter().position(|job| &job.id == id)?;
        applied = true;
        let mut next = col.clone();
        if let Some(job) = next.job_applications.get_mut(index) {
            patch.apply_to(job);
        }
        Some(next)
    })
}

fn delete(board: &Arc<Board>, id: &JobId) -> Arc<Board> {
    rebuild(board, |col| {
        if !col.contains(id) {
            return None;
        }
        let mut next = col.clone();
        next.job_applications.retain(|job| &job.id != id);
        Some(next)
    })
}

fn move_job(board: &Arc<Board>, id: &JobId, column_id: &ColumnId, order: usize) -> Arc<Board> {
    let Some(job) = board.find_job(id) else {
        return Arc::clone(board);
    };
    if board.column(column_id).is_none() {
        return Arc::clone(board);
    }

    let mut moved = job.clone();
    moved.column_id = column_id.clone();
    moved.order = order;

    let mut removed = false;
    rebuild(board, |col| {
        let holds_job = !removed && col.contains(id);
        let is_target = &col.id == column_id;
        if !holds_job && !is_target {
            return None;
        }

        let mut next = col.clone();
        if holds_job {
            removed = true;
            next.job_applications.retain(|job| &job.id != id);
        }
        if is_target {
            sort_by_order(&mut next.job_applications);
            let at = order.min(next.job_applications.len());
            next.job_applications.insert(at, moved.clone());
            renumber(&mut next.job_applications);
        }
        Some(next)
    })
}

fn reconcile(board: &Arc<Board>, provisional_id: &JobId, job: &JobApplication) -> Arc<Board> {
    let Some(holder) = board.columns.iter().find(|col| col.contains(provisional_id)) else {
        return Arc::clone(board);
    };

    if holder.id != job.column_id {
        let without = delete(board, provisional_id);
        return add(&without, job);
    }

    let holder_id = holder.id.clone();
    rebuild(board, |col| {
        if col.id != holder_id {
            return None;
        }
        let mut next = col.clone();
        for entry in next.job_applications.iter_mut() {
            if &entry.id == provisional_id {
                *entry = job.clone();
            }
        }
        sort_by_order(&mut next.job_applications);
        Some(next)
    })
}
