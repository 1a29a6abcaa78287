//! CLI command handlers.

mod history;
mod jobs;
mod scrape;

use std::fs;

use anyhow::{Context, Result};
use scrapehub_core::SearchHistoryStore;
use tracing::debug;

use crate::app_config::{FileConfig, default_data_dir};

pub use history::run_history_command;
pub use jobs::run_jobs_command;
pub use scrape::run_scrape_command;

const HISTORY_DB_FILENAME: &str = "history.db";

/// Opens the saved-search store at the configured or default location.
async fn open_history_store(config: &FileConfig) -> Result<SearchHistoryStore> {
    let path = config
        .history_db
        .clone()
        .unwrap_or_else(|| default_data_dir().join(HISTORY_DB_FILENAME));
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    debug!(path = %path.display(), "Opening search history");
    let store = SearchHistoryStore::open(&path)
        .await
        .with_context(|| format!("Failed to open history database '{}'", path.display()))?;

    match config.history_capacity.and_then(|c| usize::try_from(c).ok()) {
        Some(capacity) => Ok(store.with_capacity(capacity)?),
        None => Ok(store),
    }
}
