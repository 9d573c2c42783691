pub mod board;
pub mod ids;
pub mod job;

pub use board::{Board, Column};
pub use ids::{BoardId, ColumnId, JobId};
pub use job::{JobApplication, JobPatch, NewJob};
