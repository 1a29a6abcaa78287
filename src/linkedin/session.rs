//! Pagination state of one logical job search.

use std::collections::HashSet;
use std::fmt;

use uuid::Uuid;

use super::error::ApiError;
use super::model::{JobRecord, JobSearchResponse};
use super::query::JobSearchQuery;

/// Lifecycle of a [`SearchSession`].
///
/// `Idle -> Querying -> {Paginating, Exhausted, Failed}`; a `Paginating`
/// session goes back through `Querying` for every page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Submitted, no page requested yet.
    Idle,
    /// A page request is in flight.
    Querying,
    /// At least one page returned and more may follow.
    Paginating,
    /// No further pages; `next_page` will not touch the network.
    Exhausted,
    /// Stopped by a non-retryable error.
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Querying => "querying",
            Self::Paginating => "paginating",
            Self::Exhausted => "exhausted",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A submitted search and its pagination cursor.
#[derive(Debug, Clone)]
pub struct SearchSession {
    id: String,
    query: JobSearchQuery,
    page_size: u32,
    offset: u32,
    state: SessionState,
    seen_ids: HashSet<String>,
    pages_fetched: u32,
    server_search_id: Option<String>,
}

impl SearchSession {
    pub(crate) fn new(query: JobSearchQuery, page_size: u32) -> Self {
        let offset = query.offset;
        Self {
            id: Uuid::new_v4().to_string(),
            query,
            page_size,
            offset,
            state: SessionState::Idle,
            seen_ids: HashSet::new(),
            pages_fetched: 0,
            server_search_id: None,
        }
    }

    /// Local session id (UUID v4).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The query as submitted.
    #[must_use]
    pub fn query(&self) -> &JobSearchQuery {
        &self.query
    }

    /// Records requested per page.
    #[must_use]
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Offset the next page starts at.
    #[must_use]
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether no further pages will be requested.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.state == SessionState::Exhausted
    }

    /// Pages successfully fetched so far.
    #[must_use]
    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Distinct records returned so far.
    #[must_use]
    pub fn records_seen(&self) -> usize {
        self.seen_ids.len()
    }

    /// Search id reported by the server, once known.
    #[must_use]
    pub fn server_search_id(&self) -> Option<&str> {
        self.server_search_id.as_deref()
    }

    /// Moves to `Querying`, or explains why no request may be made.
    pub(crate) fn begin_page(&mut self) -> Result<SessionState, ApiError> {
        match self.state {
            SessionState::Exhausted => Err(ApiError::SessionExhausted {
                session_id: self.id.clone(),
            }),
            SessionState::Failed => Err(ApiError::SessionFailed {
                session_id: self.id.clone(),
            }),
            previous => {
                self.state = SessionState::Querying;
                Ok(previous)
            }
        }
    }

    /// Applies a page: advances the offset by what was returned, drops
    /// repeated ids, and decides whether the search is exhausted.
    pub(crate) fn complete_page(&mut self, response: JobSearchResponse) -> Vec<JobRecord> {
        let returned = u32::try_from(response.elements.len()).unwrap_or(u32::MAX);
        self.offset = self.offset.saturating_add(returned);
        self.pages_fetched += 1;

        if self.server_search_id.is_none() {
            self.server_search_id = response.metadata.and_then(|m| m.search_id);
        }

        let total_reached = response
            .paging
            .and_then(|p| p.total)
            .is_some_and(|total| self.offset >= total);
        self.state = if returned < self.page_size || total_reached {
            SessionState::Exhausted
        } else {
            SessionState::Paginating
        };

        response
            .elements
            .into_iter()
            .filter_map(super::model::JobElement::into_record)
            .filter(|record| self.seen_ids.insert(record.id.clone()))
            .collect()
    }

    /// Records a failed page request.
    ///
    /// Retryable errors restore `previous` so the same page can be asked for
    /// again; anything else fails the session.
    pub(crate) fn abort_page(&mut self, previous: SessionState, error: &ApiError) {
        self.state = if error.is_retryable() {
            previous
        } else {
            SessionState::Failed
        };
    }
}
