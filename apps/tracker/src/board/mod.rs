// Board state transitions. Everything here is synchronous and free of I/O;
// the optimistic controller is the only caller that owns a live snapshot.

pub mod ordering;
pub mod reducer;

pub use ordering::{is_dense, sorted_columns};
pub use reducer::{reduce, BoardAction};
