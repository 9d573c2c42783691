use std::sync::Arc;

use crate::models::{Board, Column, JobApplication};

/// Columns in pipeline order. Stable, so columns sharing an `order` keep their
/// relative position between renders.
pub fn sorted_columns(board: &Board) -> Vec<&Arc<Column>> {
    let mut columns: Vec<&Arc<Column>> = board.columns.iter().collect();
    columns.sort_by_key(|col| col.order);
    columns
}

/// Re-derives array position from `order`. Stable for ties.
pub fn sort_by_order(entries: &mut [JobApplication]) {
    entries.sort_by_key(|job| job.order);
}

/// Dense renumbering: each entry's `order` becomes its zero-based index.
pub fn renumber(entries: &mut [JobApplication]) {
    for (index, job) in entries.iter_mut().enumerate() {
        job.order = index;
    }
}

/// True when the column's orders are exactly `0..n` with no gaps or repeats.
pub fn is_dense(column: &Column) -> bool {
    let mut orders: Vec<usize> = column.job_applications.iter().map(|j| j.order).collect();
    orders.sort_unstable();
    orders.iter().enumerate().all(|(index, order)| index == *order)
}
