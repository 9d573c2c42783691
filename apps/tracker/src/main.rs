use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tracker::config::Config;
use tracker::loader::{BoardLoader, JsonFileBoardLoader};
use tracker::optimistic::{BoardController, InMemoryRemote};
use tracker::script::{parse_script, replay};
use tracker::state::AppState;
use tracker::views::{filter_board, BoardStats};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting tracker v{}", env!("CARGO_PKG_VERSION"));

    // Load the authoritative board
    let loader = JsonFileBoardLoader::new(config.snapshot_path.clone());
    let board = loader
        .load_board()
        .await
        .with_context(|| format!("Failed to load board from {}", loader.path().display()))?;
    info!(
        "Board '{}' loaded: {} columns, {} entries",
        board.name,
        board.columns.len(),
        board.total_entries()
    );

    // Local authoritative store standing in for the remote service
    let remote = Arc::new(InMemoryRemote::seeded(&board));
    info!("Remote store seeded with {} entries", remote.len().await);

    let controller = BoardController::new(board, remote.clone(), config.controller_config());
    let state = AppState::new(controller, remote, config);

    if let Some(path) = &state.config.script_path {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read mutation script {}", path.display()))?;
        let steps = parse_script(&contents).context("Mutation script is not valid JSON")?;
        info!("Replaying {} scripted mutations", steps.len());
        replay(&state.controller, steps).await;
    }

    let snapshot = state.controller.snapshot();
    let stored = state.remote.len().await;
    if stored == snapshot.total_entries() {
        info!("Remote store holds {stored} entries");
    } else {
        warn!(
            stored,
            visible = snapshot.total_entries(),
            "Board and remote store disagree on entry count"
        );
    }
    let stats = BoardStats::compute(&snapshot);
    info!(
        total = stats.total,
        wishlist = stats.wishlist,
        in_progress = stats.in_progress(),
        offers = stats.offers,
        rejected = stats.rejected,
        "Board stats"
    );

    if !state.config.search_query.is_empty() {
        let filtered = filter_board(&snapshot, &state.config.search_query);
        info!(
            "Search '{}' matches {} of {} entries",
            state.config.search_query,
            filtered.total_entries(),
            snapshot.total_entries()
        );
    }

    let json = serde_json::to_string_pretty(snapshot.as_ref())?;
    println!("{json}");

    Ok(())
}
