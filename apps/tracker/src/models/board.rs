use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::ids::{BoardId, ColumnId, JobId};
use crate::models::job::JobApplication;

/// Root aggregate: one user's job search, split into pipeline stages.
///
/// Columns sit behind `Arc` so a transition or a derived view can hand back
/// the columns it did not touch without copying them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(rename = "_id")]
    pub id: BoardId,
    pub name: String,
    /// Owning account. Carried for reference only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub columns: Vec<Arc<Column>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    #[serde(rename = "_id")]
    pub id: ColumnId,
    pub name: String,
    pub order: i32,
    #[serde(default)]
    pub job_applications: Vec<JobApplication>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, name: impl Into<String>, order: i32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            job_applications: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.job_applications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.job_applications.is_empty()
    }

    /// Entries in display order. Stable, so equal `order` values keep their
    /// insertion order.
    pub fn entries_by_order(&self) -> Vec<&JobApplication> {
        let mut entries: Vec<&JobApplication> = self.job_applications.iter().collect();
        entries.sort_by_key(|job| job.order);
        entries
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.job_applications.iter().any(|job| &job.id == id)
    }
}

impl Board {
    pub fn new(id: impl Into<BoardId>, name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            user_id: None,
            columns: columns.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Arc<Column>> {
        self.columns.iter().find(|col| &col.id == id)
    }

    /// First match in column order, then entry order.
    pub fn find_job(&self, id: &JobId) -> Option<&JobApplication> {
        self.columns
            .iter()
            .flat_map(|col| col.job_applications.iter())
            .find(|job| &job.id == id)
    }

    /// The entry with `id` together with the column actually holding it.
    pub fn locate(&self, id: &JobId) -> Option<(&Arc<Column>, &JobApplication)> {
        self.columns.iter().find_map(|col| {
            col.job_applications
                .iter()
                .find(|job| &job.id == id)
                .map(|job| (col, job))
        })
    }

    pub fn total_entries(&self) -> usize {
        self.columns.iter().map(|col| col.len()).sum()
    }

    /// Same columns with the same entries at the same `order` values, ignoring
    /// where in a column's array each entry happens to sit.
    pub fn logically_eq(&self, other: &Board) -> bool {
        if self.id != other.id || self.name != other.name {
            return false;
        }
        if self.columns.len() != other.columns.len() {
            return false;
        }
        self.columns.iter().zip(other.columns.iter()).all(|(a, b)| {
            if Arc::ptr_eq(a, b) {
                return true;
            }
            a.id == b.id
                && a.name == b.name
                && a.order == b.order
                && canonical_entries(a) == canonical_entries(b)
        })
    }
}

fn canonical_entries(column: &Column) -> Vec<&JobApplication> {
    let mut entries: Vec<&JobApplication> = column.job_applications.iter().collect();
    entries.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    entries
}
