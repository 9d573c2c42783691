use std::sync::Arc;

use crate::config::Config;
use crate::optimistic::{BoardController, InMemoryRemote};

/// Everything a run of the tracker needs, wired once at startup.
#[derive(Clone)]
pub struct AppState {
    pub controller: BoardController,
    /// Authoritative store the controller confirms against.
    pub remote: Arc<InMemoryRemote>,
    pub config: Config,
}

impl AppState {
    pub fn new(controller: BoardController, remote: Arc<InMemoryRemote>, config: Config) -> Self {
        Self {
            controller,
            remote,
            config,
        }
    }
}
