//! Caller-side checks on form payloads. A draft or patch that fails here is
//! rejected before anything touches the board.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::models::{JobPatch, NewJob};

const MAX_COMPANY_LEN: usize = 100;
const MAX_POSITION_LEN: usize = 100;
const MAX_LOCATION_LEN: usize = 100;
const MAX_SALARY_LEN: usize = 50;
const MAX_NOTES_LEN: usize = 2000;
const MAX_DESCRIPTION_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be less than {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Salary must be numeric (e.g. 120000) or valid format (e.g. $120k)")]
    SalaryFormat,

    #[error("Please enter a valid URL (e.g., https://example.com)")]
    InvalidUrl,

    #[error("Use move to change a job's column or order")]
    PlacementInUpdate,

    #[error("Update contains no changes")]
    EmptyPatch,
}

/// Every rule a payload broke, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(pub Vec<ValidationError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&ValidationError> {
        self.0.first()
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.iter().map(|e| e.to_string()).collect();
        f.write_str(&messages.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Trims the draft's text fields in place, turns blank optionals into `None`,
/// then checks every rule.
pub fn validate_new_job(draft: &mut NewJob) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    draft.company = draft.company.trim().to_string();
    draft.position = draft.position.trim().to_string();
    check_required("Company name", &draft.company, MAX_COMPANY_LEN, &mut errors);
    check_required("Position", &draft.position, MAX_POSITION_LEN, &mut errors);

    normalize_optional(&mut draft.location);
    normalize_optional(&mut draft.salary);
    normalize_optional(&mut draft.job_url);
    normalize_optional(&mut draft.notes);
    normalize_optional(&mut draft.description);
    check_optional(
        &draft.location,
        &draft.salary,
        &draft.job_url,
        &draft.notes,
        &draft.description,
        &mut errors,
    );

    draft.tags = clean_tags(&draft.tags);
    errors.into_result()
}

/// Same rules as [`validate_new_job`], applied to the fields the patch sets.
pub fn validate_patch(patch: &mut JobPatch) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();

    if patch.touches_placement() {
        errors.0.push(ValidationError::PlacementInUpdate);
    }
    if patch.is_empty() {
        errors.0.push(ValidationError::EmptyPatch);
    }

    if let Some(company) = patch.company.as_mut() {
        *company = company.trim().to_string();
        check_required("Company name", company, MAX_COMPANY_LEN, &mut errors);
    }
    if let Some(position) = patch.position.as_mut() {
        *position = position.trim().to_string();
        check_required("Position", position, MAX_POSITION_LEN, &mut errors);
    }

    for field in [
        &mut patch.location,
        &mut patch.salary,
        &mut patch.job_url,
        &mut patch.notes,
        &mut patch.description,
    ] {
        if let Some(value) = field.as_mut() {
            normalize_optional(value);
        }
    }
    check_optional(
        &patch.location.clone().flatten(),
        &patch.salary.clone().flatten(),
        &patch.job_url.clone().flatten(),
        &patch.notes.clone().flatten(),
        &patch.description.clone().flatten(),
        &mut errors,
    );

    if let Some(tags) = patch.tags.as_mut() {
        *tags = clean_tags(tags);
    }
    errors.into_result()
}

/// Splits the comma-separated tag input from the form.
pub fn parse_tags(input: &str) -> BTreeSet<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_tags(tags: &BTreeSet<String>) -> BTreeSet<String> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn normalize_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
}

fn check_required(field: &'static str, value: &str, max: usize, errors: &mut ValidationErrors) {
    if value.is_empty() {
        errors.0.push(ValidationError::Required { field });
    } else if value.chars().count() > max {
        errors.0.push(ValidationError::TooLong { field, max });
    }
}

fn check_max(
    field: &'static str,
    value: &Option<String>,
    max: usize,
    errors: &mut ValidationErrors,
) {
    if value.as_ref().is_some_and(|v| v.chars().count() > max) {
        errors.0.push(ValidationError::TooLong { field, max });
    }
}

fn check_optional(
    location: &Option<String>,
    salary: &Option<String>,
    job_url: &Option<String>,
    notes: &Option<String>,
    description: &Option<String>,
    errors: &mut ValidationErrors,
) {
    check_max("Location", location, MAX_LOCATION_LEN, errors);

    if let Some(salary) = salary {
        if salary.chars().count() > MAX_SALARY_LEN {
            errors.0.push(ValidationError::TooLong {
                field: "Salary",
                max: MAX_SALARY_LEN,
            });
        } else if !is_salary_format(salary) {
            errors.0.push(ValidationError::SalaryFormat);
        }
    }

    if let Some(url) = job_url {
        if Url::parse(url).is_err() {
            errors.0.push(ValidationError::InvalidUrl);
        }
    }

    check_max("Notes", notes, MAX_NOTES_LEN, errors);
    check_max("Description", description, MAX_DESCRIPTION_LEN, errors);
}

/// Digits, separators, currency sign, ranges and the `k` shorthand.
fn is_salary_format(salary: &str) -> bool {
    salary.chars().all(|c| {
        c.is_ascii_digit() || c.is_whitespace() || matches!(c, ',' | '.' | '$' | '-' | 'k' | 'K')
    })
}
