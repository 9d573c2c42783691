//! Property tests for the board reducer, the filtered view and compensation.
//!
//! Dense boards carry `order` values `0..n` in every column, the shape a
//! board has once the remote has reconciled it. Gapped boards keep strictly
//! increasing `order` values with holes, the shape a column is left in after
//! an entry moves out of it.

use std::sync::Arc;

use chrono::Utc;
use proptest::prelude::*;
use proptest::sample::Index;

use tracker::board::{is_dense, reduce, BoardAction};
use tracker::errors::MutationError;
use tracker::models::{Board, Column, ColumnId, JobApplication, JobId, JobPatch, NewJob};
use tracker::optimistic::{BoardController, ControllerConfig, InMemoryRemote, RemoteError};
use tracker::views::filter_board;

// ============================================================================
// GENERATORS
// ============================================================================

fn entry(id: &str, company: &str, column: &str, order: usize) -> JobApplication {
    let draft = NewJob {
        company: company.to_string(),
        position: "Engineer".to_string(),
        column_id: ColumnId::from(column),
        ..NewJob::default()
    };
    JobApplication::provisional(JobId::from(id), &draft, order, Utc::now())
}

fn dense_board(companies: &[Vec<String>]) -> Board {
    gapped_board(companies, &[])
}

/// Entry `k` of the board (counted across columns) sits `gaps[k]` further
/// along than dense numbering would put it. Missing gaps count as zero.
fn gapped_board(companies: &[Vec<String>], gaps: &[usize]) -> Board {
    let mut gaps = gaps.iter().copied();
    let columns = companies
        .iter()
        .enumerate()
        .map(|(ci, names)| {
            let column_id = format!("col-{ci}");
            let mut column = Column::new(column_id.as_str(), format!("Stage {ci}"), ci as i32);
            let mut order = 0;
            column.job_applications = names
                .iter()
                .enumerate()
                .map(|(ji, company)| {
                    order += gaps.next().unwrap_or(0);
                    let job = entry(&format!("job-{ci}-{ji}"), company, &column_id, order);
                    order += 1;
                    job
                })
                .collect();
            column
        })
        .collect();
    Board::new("board", "Job Hunt", columns)
}

fn arb_gaps() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(prop_oneof![3 => Just(0usize), 1 => 1usize..4], 0..16)
}

/// Company names per column. The first column always holds at least one entry.
fn arb_companies() -> impl Strategy<Value = Vec<Vec<String>>> {
    (
        prop::collection::vec("[a-z]{1,6}", 1..5),
        prop::collection::vec(prop::collection::vec("[a-z]{1,6}", 0..5), 0..3),
    )
        .prop_map(|(first, rest)| {
            let mut columns = vec![first];
            columns.extend(rest);
            columns
        })
}

fn job_ids(board: &Board) -> Vec<JobId> {
    board
        .columns
        .iter()
        .flat_map(|col| col.job_applications.iter().map(|job| job.id.clone()))
        .collect()
}

/// Entry ids of `column` in display order.
fn sequence_in(board: &Board, column: &ColumnId) -> Vec<JobId> {
    board
        .column(column)
        .map(|col| col.entries_by_order().iter().map(|job| job.id.clone()).collect())
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
enum Intent {
    Create { column: Index, company: String },
    Update { job: Index, company: String },
    Move { job: Index, column: Index, order: usize },
    Delete { job: Index },
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (any::<Index>(), "[a-z]{1,6}")
            .prop_map(|(column, company)| Intent::Create { column, company }),
        (any::<Index>(), "[a-z]{1,6}").prop_map(|(job, company)| Intent::Update { job, company }),
        (any::<Index>(), any::<Index>(), 0usize..8)
            .prop_map(|(job, column, order)| Intent::Move { job, column, order }),
        any::<Index>().prop_map(|job| Intent::Delete { job }),
    ]
}

// ============================================================================
// REDUCER PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_move_to_current_position_is_identity(
        companies in arb_companies(),
        pick in any::<Index>(),
    ) {
        let board = Arc::new(dense_board(&companies));
        let ids = job_ids(&board);
        let id = pick.get(&ids).clone();
        let (column, job) = board.locate(&id).unwrap();

        let next = reduce(&board, &BoardAction::Move {
            id: id.clone(),
            column_id: column.id.clone(),
            order: job.order,
        });

        prop_assert!(next.logically_eq(&board));
    }

    #[test]
    fn prop_add_then_delete_restores_board(
        companies in arb_companies(),
        gaps in arb_gaps(),
        column in any::<Index>(),
        order in 0usize..8,
        company in "[a-z]{1,6}",
    ) {
        let board = Arc::new(gapped_board(&companies, &gaps));
        let target = column.get(&board.columns).id.clone();
        let fresh = entry("fresh", &company, target.as_str(), order);

        let added = reduce(&board, &BoardAction::Add { job: fresh });
        prop_assert_eq!(added.total_entries(), board.total_entries() + 1);
        let restored = reduce(&added, &BoardAction::Delete { id: JobId::from("fresh") });

        prop_assert!(restored.logically_eq(&board));
    }

    #[test]
    fn prop_move_leaves_target_column_dense(
        companies in arb_companies(),
        gaps in arb_gaps(),
        pick in any::<Index>(),
        column in any::<Index>(),
        order in 0usize..8,
    ) {
        let board = Arc::new(gapped_board(&companies, &gaps));
        let ids = job_ids(&board);
        let id = pick.get(&ids).clone();
        let target = column.get(&board.columns).id.clone();

        let next = reduce(&board, &BoardAction::Move {
            id: id.clone(),
            column_id: target.clone(),
            order,
        });

        let landed = next.column(&target).unwrap();
        prop_assert!(is_dense(landed));
        prop_assert!(landed.contains(&id));
        prop_assert_eq!(next.total_entries(), board.total_entries());
    }

    #[test]
    fn prop_filter_never_grows(
        companies in arb_companies(),
        gaps in arb_gaps(),
        query in "[a-zA-Z]{0,3}",
    ) {
        let board = Arc::new(gapped_board(&companies, &gaps));
        let filtered = filter_board(&board, &query);
        prop_assert!(filtered.total_entries() <= board.total_entries());
        prop_assert_eq!(filtered.columns.len(), board.columns.len());
    }
}

// ============================================================================
// COMPENSATION
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_failed_remote_call_restores_board(
        companies in arb_companies(),
        gaps in arb_gaps(),
        intent in arb_intent(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let board = gapped_board(&companies, &gaps);
            let remote = Arc::new(InMemoryRemote::seeded(&board));
            remote.set_failure(Some(RemoteError::Rejected("Unauthorized".to_string()))).await;
            let controller =
                BoardController::new(board, remote.clone(), ControllerConfig::default());
            let before = controller.snapshot();
            let ids = job_ids(&before);

            let pending = match &intent {
                Intent::Create { column, company } => {
                    let draft = NewJob {
                        company: company.clone(),
                        position: "Engineer".to_string(),
                        column_id: column.get(&before.columns).id.clone(),
                        ..NewJob::default()
                    };
                    controller.begin_create(draft)
                }
                Intent::Update { job, company } => {
                    let patch = JobPatch {
                        company: Some(company.clone()),
                        notes: Some(Some("Followed up".to_string())),
                        ..JobPatch::default()
                    };
                    controller.begin_update(job.get(&ids), patch)
                }
                Intent::Move { job, column, order } => controller.begin_move(
                    job.get(&ids),
                    &column.get(&before.columns).id.clone(),
                    *order,
                ),
                Intent::Delete { job } => controller.begin_delete(job.get(&ids)),
            }
            .unwrap();

            let result = controller.settle(pending).await;
            prop_assert!(matches!(result, Err(MutationError::Remote(_))));
            prop_assert!(!controller.is_pending());

            let after = controller.snapshot();
            match &intent {
                // Both columns a move touches end up renumbered or with a
                // gap, so only the display sequence of every column has to
                // come back. A source column that started dense is restored
                // exactly.
                Intent::Move { job, .. } => {
                    let id = job.get(&ids);
                    let (source, _) = before.locate(id).unwrap();
                    for col in &before.columns {
                        prop_assert_eq!(
                            sequence_in(&after, &col.id),
                            sequence_in(&before, &col.id)
                        );
                    }
                    let restored = after.column(&source.id).unwrap();
                    prop_assert!(is_dense(restored));
                    if is_dense(source) {
                        prop_assert_eq!(
                            restored.entries_by_order(),
                            source.entries_by_order()
                        );
                    }
                }
                _ => prop_assert!(after.logically_eq(&before)),
            }
            Ok::<(), TestCaseError>(())
        })?;
    }
}
