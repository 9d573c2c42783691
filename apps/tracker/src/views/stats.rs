use serde::Serialize;

use crate::models::Board;

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    pub total: usize,
    pub wishlist: usize,
    pub applied: usize,
    pub interviewing: usize,
    pub offers: usize,
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Wishlist,
    Applied,
    Interviewing,
    Offers,
    Rejected,
}

/// Stage name fragments, checked in priority order. The first fragment found
/// in a column name decides its bucket.
const BUCKET_FRAGMENTS: &[(&str, Bucket)] = &[
    ("wish", Bucket::Wishlist),
    ("apply", Bucket::Applied),
    ("applied", Bucket::Applied),
    ("interview", Bucket::Interviewing),
    ("offer", Bucket::Offers),
    ("reject", Bucket::Rejected),
];

fn bucket_for(column_name: &str) -> Option<Bucket> {
    let name = column_name.to_lowercase();
    BUCKET_FRAGMENTS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, bucket)| *bucket)
}

impl BoardStats {
    /// Every entry counts toward `total`. A column whose name matches a stage
    /// fragment sets that bucket to its own count. When several columns match
    /// the same bucket, the last one in board order wins; counts are not summed.
    pub fn compute(board: &Board) -> Self {
        let mut stats = Self::default();
        for col in &board.columns {
            let count = col.len();
            stats.total += count;
            match bucket_for(&col.name) {
                Some(Bucket::Wishlist) => stats.wishlist = count,
                Some(Bucket::Applied) => stats.applied = count,
                Some(Bucket::Interviewing) => stats.interviewing = count,
                Some(Bucket::Offers) => stats.offers = count,
                Some(Bucket::Rejected) => stats.rejected = count,
                None => {}
            }
        }
        stats
    }

    /// Applications still moving through the funnel.
    pub fn in_progress(&self) -> usize {
        self.applied + self.interviewing
    }
}
