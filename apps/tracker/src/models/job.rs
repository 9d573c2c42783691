use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::ids::{ColumnId, JobId};

/// One tracked job opportunity on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobApplication {
    #[serde(rename = "_id")]
    pub id: JobId,
    pub company: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub column_id: ColumnId,
    /// Position within the owning column. Dense and zero-based once reconciled.
    pub order: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JobApplication {
    /// Synthesizes the locally predicted entity for a create that has not been
    /// confirmed yet.
    pub fn provisional(id: JobId, draft: &NewJob, order: usize, now: DateTime<Utc>) -> Self {
        Self {
            id,
            company: draft.company.clone(),
            position: draft.position.clone(),
            location: draft.location.clone(),
            salary: draft.salary.clone(),
            job_url: draft.job_url.clone(),
            notes: draft.notes.clone(),
            description: draft.description.clone(),
            tags: draft.tags.clone(),
            column_id: draft.column_id.clone(),
            order,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields submitted by the creation form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub company: String,
    pub position: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub column_id: ColumnId,
}

/// Partial update of a job application.
///
/// `None` leaves a field untouched. For the optional text fields the inner
/// option distinguishes "set to a value" from "clear": `Some(None)` clears.
/// `column_id` and `order` are placement fields; only the move path sets them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub location: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub salary: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub job_url: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub notes: Option<Option<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "double_option"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
}

/// Keeps an explicit `null` distinct from a missing key.
fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

impl JobPatch {
    /// The payload a move is expressed as on the remote side.
    pub fn placement(column_id: ColumnId, order: usize) -> Self {
        Self {
            column_id: Some(column_id),
            order: Some(order),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn touches_placement(&self) -> bool {
        self.column_id.is_some() || self.order.is_some()
    }

    /// Merges every set field into `job`, leaving the rest untouched.
    pub fn apply_to(&self, job: &mut JobApplication) {
        if let Some(company) = &self.company {
            job.company = company.clone();
        }
        if let Some(position) = &self.position {
            job.position = position.clone();
        }
        if let Some(location) = &self.location {
            job.location = location.clone();
        }
        if let Some(salary) = &self.salary {
            job.salary = salary.clone();
        }
        if let Some(job_url) = &self.job_url {
            job.job_url = job_url.clone();
        }
        if let Some(notes) = &self.notes {
            job.notes = notes.clone();
        }
        if let Some(description) = &self.description {
            job.description = description.clone();
        }
        if let Some(tags) = &self.tags {
            job.tags = tags.clone();
        }
        if let Some(column_id) = &self.column_id {
            job.column_id = column_id.clone();
        }
        if let Some(order) = self.order {
            job.order = order;
        }
    }

    /// Captures the current values of exactly the fields this patch sets, so
    /// that applying the result restores `job` as it was.
    pub fn inverse_for(&self, job: &JobApplication) -> Self {
        Self {
            company: self.company.as_ref().map(|_| job.company.clone()),
            position: self.position.as_ref().map(|_| job.position.clone()),
            location: self.location.as_ref().map(|_| job.location.clone()),
            salary: self.salary.as_ref().map(|_| job.salary.clone()),
            job_url: self.job_url.as_ref().map(|_| job.job_url.clone()),
            notes: self.notes.as_ref().map(|_| job.notes.clone()),
            description: self.description.as_ref().map(|_| job.description.clone()),
            tags: self.tags.as_ref().map(|_| job.tags.clone()),
            column_id: self.column_id.as_ref().map(|_| job.column_id.clone()),
            order: self.order.map(|_| job.order),
        }
    }
}
