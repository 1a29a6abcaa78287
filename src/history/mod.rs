//! Persistent history of submitted LinkedIn searches.
//!
//! Saved searches are append-only. When a capacity is set, the oldest rows
//! are evicted in the same transaction that inserts the new one, so the
//! table never holds more than `capacity` rows even with parallel writers.
//!
//! # Example
//!
//! ```no_run
//! use scrapehub_core::{JobSearchQuery, SearchHistoryStore};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SearchHistoryStore::open(Path::new("history.db"))
//!     .await?
//!     .with_capacity(50)?;
//! store.append(&JobSearchQuery::new().keywords("rust"), 12).await?;
//! # Ok(())
//! # }
//! ```

mod error;

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use tracing::{debug, info, instrument};

use crate::linkedin::JobSearchQuery;

pub use error::HistoryError;

/// One stored search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedSearch {
    /// Row id; increases with insertion order.
    pub id: i64,
    /// The parameters as submitted.
    pub query: JobSearchQuery,
    /// When the search was saved.
    pub created_at: DateTime<Utc>,
    /// Records the search returned.
    pub result_count: u64,
}

#[derive(Debug, FromRow)]
struct SavedSearchRow {
    id: i64,
    query_json: String,
    result_count: i64,
    created_at: String,
}

impl TryFrom<SavedSearchRow> for SavedSearch {
    type Error = HistoryError;

    fn try_from(row: SavedSearchRow) -> Result<Self, Self::Error> {
        let query = serde_json::from_str(&row.query_json)
            .map_err(|e| HistoryError::corrupt(row.id, e))?;
        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| HistoryError::corrupt(row.id, e))?
            .with_timezone(&Utc);
        Ok(Self {
            id: row.id,
            query,
            created_at,
            result_count: u64::try_from(row.result_count).unwrap_or(0),
        })
    }
}

/// Writers are short transactions; a handful of connections is plenty.
const MAX_CONNECTIONS: u32 = 4;

/// How long a writer waits on a locked database file.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed store of saved searches.
#[derive(Debug, Clone)]
pub struct SearchHistoryStore {
    pool: SqlitePool,
    capacity: Option<usize>,
}

impl SearchHistoryStore {
    /// Opens the history database at `path`, creating the file and schema
    /// when missing. The store has no capacity limit.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Database`] if the file cannot be opened or
    /// [`HistoryError::Migration`] if the schema cannot be brought up to date.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub async fn open(path: &Path) -> Result<Self, HistoryError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;
        Self::migrated(pool).await
    }

    /// Opens a private in-memory store that disappears when dropped.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    #[instrument]
    pub async fn open_in_memory() -> Result<Self, HistoryError> {
        // Every connection to `:memory:` is its own database, so the pool
        // must hold exactly one and never recycle it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        Self::migrated(pool).await
    }

    async fn migrated(pool: SqlitePool) -> Result<Self, HistoryError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self {
            pool,
            capacity: None,
        })
    }

    /// Keeps at most `capacity` searches from now on, evicting oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidCapacity`] when `capacity` is zero.
    pub fn with_capacity(self, capacity: usize) -> Result<Self, HistoryError> {
        if capacity == 0 {
            return Err(HistoryError::InvalidCapacity);
        }
        Ok(Self {
            capacity: Some(capacity),
            ..self
        })
    }

    /// Configured capacity, if any.
    #[must_use]
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    /// Saves `query` with its result count.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Encode`] if the query cannot be serialized or
    /// [`HistoryError::Database`] if the insert or eviction fails.
    #[instrument(skip(self, query), fields(summary = %query.summary()))]
    pub async fn append(
        &self,
        query: &JobSearchQuery,
        result_count: u64,
    ) -> Result<SavedSearch, HistoryError> {
        let query_json = serde_json::to_string(query).map_err(HistoryError::Encode)?;
        let created_at = Utc::now();

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r"INSERT INTO saved_searches (query_json, summary, result_count, created_at)
              VALUES (?, ?, ?, ?)",
        )
        .bind(&query_json)
        .bind(query.summary())
        .bind(i64::try_from(result_count).unwrap_or(i64::MAX))
        .bind(created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_rowid();

        if let Some(capacity) = self.capacity {
            let evicted = sqlx::query(
                r"DELETE FROM saved_searches
                  WHERE id NOT IN (
                      SELECT id FROM saved_searches ORDER BY id DESC LIMIT ?
                  )",
            )
            .bind(i64::try_from(capacity).unwrap_or(i64::MAX))
            .execute(&mut *tx)
            .await?
            .rows_affected();
            if evicted > 0 {
                debug!(evicted, capacity, "evicted oldest saved searches");
            }
        }
        tx.commit().await?;

        info!(id, result_count, "search saved");
        Ok(SavedSearch {
            id,
            query: query.clone(),
            created_at,
            result_count,
        })
    }

    /// All saved searches, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Database`] on query failure or
    /// [`HistoryError::CorruptRecord`] for rows that no longer decode.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<SavedSearch>, HistoryError> {
        let rows = sqlx::query_as::<_, SavedSearchRow>(
            r"SELECT id, query_json, result_count, created_at
              FROM saved_searches ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(SavedSearch::try_from).collect()
    }

    /// The saved search with `id`, if it still exists.
    ///
    /// # Errors
    ///
    /// Same as [`list`](Self::list).
    #[instrument(skip(self))]
    pub async fn get(&self, id: i64) -> Result<Option<SavedSearch>, HistoryError> {
        let row = sqlx::query_as::<_, SavedSearchRow>(
            r"SELECT id, query_json, result_count, created_at
              FROM saved_searches WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(SavedSearch::try_from).transpose()
    }

    /// Number of saved searches.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Database`] on query failure.
    pub async fn len(&self) -> Result<usize, HistoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM saved_searches")
            .fetch_one(&self.pool)
            .await?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether nothing is saved.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Database`] on query failure.
    pub async fn is_empty(&self) -> Result<bool, HistoryError> {
        Ok(self.len().await? == 0)
    }

    /// Deletes every saved search, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::Database`] on query failure.
    #[instrument(skip(self))]
    pub async fn clear(&self) -> Result<u64, HistoryError> {
        let removed = sqlx::query("DELETE FROM saved_searches")
            .execute(&self.pool)
            .await?
            .rows_affected();
        info!(removed, "search history cleared");
        Ok(removed)
    }
}
