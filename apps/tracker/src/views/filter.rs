use std::sync::Arc;

use crate::models::{Board, Column, JobApplication};

/// Narrows every column to the entries matching `query`.
///
/// An entry matches when its company, position, location or any tag contains
/// the query, case-insensitively. Columns that lose nothing are shared with
/// the source board. An empty query, or a query every entry matches, returns
/// `board` itself.
pub fn filter_board(board: &Arc<Board>, query: &str) -> Arc<Board> {
    if query.is_empty() {
        return Arc::clone(board);
    }
    let needle = query.to_lowercase();

    let mut narrowed = false;
    let columns: Vec<Arc<Column>> = board
        .columns
        .iter()
        .map(|col| {
            if col.job_applications.iter().all(|job| matches_query(job, &needle)) {
                return Arc::clone(col);
            }
            narrowed = true;
            Arc::new(Column {
                id: col.id.clone(),
                name: col.name.clone(),
                order: col.order,
                job_applications: col
                    .job_applications
                    .iter()
                    .filter(|job| matches_query(job, &needle))
                    .cloned()
                    .collect(),
            })
        })
        .collect();

    if !narrowed {
        return Arc::clone(board);
    }
    Arc::new(Board {
        id: board.id.clone(),
        name: board.name.clone(),
        user_id: board.user_id.clone(),
        columns,
    })
}

/// `needle` must already be lowercase.
pub fn matches_query(job: &JobApplication, needle: &str) -> bool {
    job.company.to_lowercase().contains(needle)
        || job.position.to_lowercase().contains(needle)
        || job.tags.iter().any(|tag| tag.to_lowercase().contains(needle))
        || job
            .location
            .as_ref()
            .is_some_and(|loc| loc.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ColumnId, JobId, NewJob};
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn job(id: &str, company: &str, column: &str, order: usize) -> JobApplication {
        let draft = NewJob {
            company: company.to_string(),
            position: "Engineer".to_string(),
            column_id: ColumnId::from(column),
            ..NewJob::default()
        };
        JobApplication::provisional(JobId::from(id), &draft, order, Utc::now())
    }

    fn board() -> Arc<Board> {
        let mut wish = Column::new("wish", "Wish List", 0);
        wish.job_applications = vec![job("1", "Acme Corp", "wish", 0)];
        let mut applied = Column::new("applied", "Applied", 1);
        applied.job_applications = vec![job("2", "Globex", "applied", 0)];
        Arc::new(Board::new("b", "Job Hunt", vec![wish, applied]))
    }

    #[test]
    fn test_query_matches_company_case_insensitively() {
        let source = board();
        let filtered = filter_board(&source, "acme");
        assert_eq!(filtered.total_entries(), 1);
        let wish = filtered.column(&ColumnId::from("wish")).unwrap();
        assert_eq!(wish.job_applications[0].company, "Acme Corp");
        assert!(filtered.column(&ColumnId::from("applied")).unwrap().is_empty());
        // Untouched column is shared, narrowed one is new.
        assert!(Arc::ptr_eq(&source.columns[0], &filtered.columns[0]));
        assert!(!Arc::ptr_eq(&source.columns[1], &filtered.columns[1]));
        // Source is not mutated.
        assert_eq!(source.total_entries(), 2);
    }

    #[test]
    fn test_empty_query_returns_same_board() {
        let source = board();
        assert!(Arc::ptr_eq(&source, &filter_board(&source, "")));
    }

    #[test]
    fn test_query_matching_everything_returns_same_board() {
        let source = board();
        assert!(Arc::ptr_eq(&source, &filter_board(&source, "ENGINEER")));
    }

    #[test]
    fn test_query_matches_tags_and_location() {
        let mut tagged = job("3", "Initech", "wish", 1);
        tagged.tags = BTreeSet::from(["Rust".to_string()]);
        let mut located = job("4", "Hooli", "wish", 2);
        located.location = Some("Berlin".to_string());
        assert!(matches_query(&tagged, "rus"));
        assert!(matches_query(&located, "berl"));
        assert!(!matches_query(&located, "rust"));
    }

    #[test]
    fn test_notes_are_not_searched() {
        let mut j = job("5", "Initech", "wish", 0);
        j.notes = Some("acme referral".to_string());
        assert!(!matches_query(&j, "acme"));
    }
}
