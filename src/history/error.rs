//! Error types for the search history store.

use thiserror::Error;

/// Errors from [`SearchHistoryStore`](super::SearchHistoryStore).
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Query against the history database failed.
    #[error("search history database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migrations failed to apply.
    #[error("failed to migrate search history database: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Query parameters could not be encoded.
    #[error("failed to encode search query: {0}")]
    Encode(#[source] serde_json::Error),

    /// A stored row no longer decodes.
    #[error("saved search {id} is unreadable: {reason}")]
    CorruptRecord {
        /// Row id.
        id: i64,
        /// What failed to decode.
        reason: String,
    },

    /// Capacity of zero would evict every search.
    #[error("history capacity must be at least 1")]
    InvalidCapacity,
}

impl HistoryError {
    pub(crate) fn corrupt(id: i64, reason: impl std::fmt::Display) -> Self {
        Self::CorruptRecord {
            id,
            reason: reason.to_string(),
        }
    }
}
