//! Client-side board state for the job application tracker.
//!
//! Edits are predicted locally, confirmed against the remote service and
//! compensated when the remote call fails.

pub mod board;
pub mod config;
pub mod errors;
pub mod loader;
pub mod models;
pub mod optimistic;
pub mod script;
pub mod state;
pub mod validation;
pub mod views;
