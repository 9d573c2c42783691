//! Replays a recorded list of board mutations through the controller.
//!
//! Each step goes through the same public operation the UI would call, and is
//! settled before the next one starts. A failed step is logged and skipped.

use serde::Deserialize;
use tracing::{info, warn};

use crate::models::{ColumnId, JobId, JobPatch, NewJob};
use crate::optimistic::BoardController;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum ScriptedMutation {
    Create {
        job: NewJob,
    },
    Update {
        id: JobId,
        patch: JobPatch,
    },
    Move {
        id: JobId,
        #[serde(rename = "columnId")]
        column_id: ColumnId,
        order: usize,
    },
    Delete {
        id: JobId,
    },
}

impl ScriptedMutation {
    pub fn kind(&self) -> &'static str {
        match self {
            ScriptedMutation::Create { .. } => "create",
            ScriptedMutation::Update { .. } => "update",
            ScriptedMutation::Move { .. } => "move",
            ScriptedMutation::Delete { .. } => "delete",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub confirmed: usize,
    pub failed: usize,
}

pub fn parse_script(contents: &str) -> serde_json::Result<Vec<ScriptedMutation>> {
    serde_json::from_str(contents)
}

pub async fn replay(controller: &BoardController, steps: Vec<ScriptedMutation>) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for (index, step) in steps.into_iter().enumerate() {
        let kind = step.kind();
        let outcome = match step {
            ScriptedMutation::Create { job } => controller.create(job).await.map(|_| ()),
            ScriptedMutation::Update { id, patch } => {
                controller.update(&id, patch).await.map(|_| ())
            }
            ScriptedMutation::Move {
                id,
                column_id,
                order,
            } => controller.move_job(&id, &column_id, order).await.map(|_| ()),
            ScriptedMutation::Delete { id } => controller.delete(&id).await,
        };
        match outcome {
            Ok(()) => summary.confirmed += 1,
            Err(err) => {
                let report = err.report();
                warn!(
                    step = index,
                    kind,
                    code = report.code,
                    compensated = err.was_compensated(),
                    "Scripted mutation failed: {}",
                    report.message
                );
                summary.failed += 1;
            }
        }
    }
    info!(
        confirmed = summary.confirmed,
        failed = summary.failed,
        "Mutation script replayed"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Board, Column};
    use crate::optimistic::{ControllerConfig, InMemoryRemote};
    use std::sync::Arc;

    const SCRIPT: &str = r#"[
        {
            "op": "create",
            "job": { "company": "Acme", "position": "Engineer", "columnId": "wish" }
        },
        {
            "op": "create",
            "job": { "company": "", "position": "Engineer", "columnId": "wish" }
        },
        { "op": "move", "id": "missing", "columnId": "applied", "order": 0 },
        { "op": "update", "id": "j1", "patch": { "notes": "Called back" } },
        { "op": "delete", "id": "j1" }
    ]"#;

    #[test]
    fn test_parse_script_steps() {
        let steps = parse_script(SCRIPT).unwrap();
        assert_eq!(steps.len(), 5);
        assert_eq!(steps[2].kind(), "move");
        assert_eq!(
            steps[4],
            ScriptedMutation::Delete {
                id: JobId::from("j1")
            }
        );
    }

    #[test]
    fn test_unknown_op_is_rejected() {
        assert!(parse_script(r#"[{ "op": "archive", "id": "j1" }]"#).is_err());
    }

    #[tokio::test]
    async fn test_replay_counts_failures_and_continues() {
        let board = Board::new(
            "b",
            "Job Hunt",
            vec![Column::new("wish", "Wish List", 0), Column::new("applied", "Applied", 1)],
        );
        let remote = Arc::new(InMemoryRemote::seeded(&board));
        let controller = BoardController::new(board, remote.clone(), ControllerConfig::default());

        // Only the first create is valid; "j1" does not exist.
        let summary = replay(&controller, parse_script(SCRIPT).unwrap()).await;

        assert_eq!(
            summary,
            ReplaySummary {
                confirmed: 1,
                failed: 4
            }
        );
        let board = controller.snapshot();
        assert_eq!(board.total_entries(), 1);
        assert_eq!(remote.len().await, 1);
        assert!(!controller.is_pending());
    }
}
