// Derived views. Stateless and recomputed from a snapshot on demand; none of
// them mutate the board they are given.

pub mod filter;
pub mod stats;

pub use filter::filter_board;
pub use stats::BoardStats;
