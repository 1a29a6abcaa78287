//! Error types for the LinkedIn API client.

use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Maximum characters of an API error body kept in [`ApiError::Api`].
const MESSAGE_EXCERPT_CHARS: usize = 300;

/// Errors that can occur while talking to the LinkedIn API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Query has no usable filter or an invalid page size.
    #[error("invalid job search query: {reason}")]
    InvalidQuery {
        /// What is wrong with the query.
        reason: String,
    },

    /// One or more credential values are missing.
    #[error("LinkedIn API not configured; missing: {}", missing.join(", "))]
    NotConfigured {
        /// Names of the missing values (environment-variable style).
        missing: Vec<&'static str>,
    },

    /// Quota exhausted. `reset_at` is the reset time the shared tracker
    /// holds; `None` when the server never said, in which case the tracker
    /// does not block the next call either.
    #[error("rate limited{}", reset_suffix(reset_at.as_ref(), wait.as_ref()))]
    RateLimited {
        /// When the quota resets, if known.
        reset_at: Option<DateTime<Utc>>,
        /// Time remaining until `reset_at` when the error was raised.
        wait: Option<Duration>,
    },

    /// Access token rejected; re-authentication required.
    #[error("LinkedIn access token expired or revoked (HTTP {status})")]
    AuthExpired {
        /// 401 or 403.
        status: u16,
    },

    /// Any other non-success response.
    #[error("LinkedIn API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server message or body excerpt.
        message: String,
    },

    /// Request did not complete within the configured timeout.
    #[error("LinkedIn API request timed out: {url}")]
    Timeout {
        /// Endpoint URL.
        url: String,
    },

    /// Transport failure.
    #[error("LinkedIn API network error for {url}: {source}")]
    Network {
        /// Endpoint URL.
        url: String,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },

    /// Response body was not the expected JSON shape.
    #[error("failed to decode LinkedIn response from {url}: {source}")]
    Decode {
        /// Endpoint URL.
        url: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Session already returned its last page.
    #[error("search session {session_id} is exhausted")]
    SessionExhausted {
        /// Session identifier.
        session_id: String,
    },

    /// Session stopped after a non-retryable failure.
    #[error("search session {session_id} failed; submit a new search")]
    SessionFailed {
        /// Session identifier.
        session_id: String,
    },
}

impl ApiError {
    /// Creates an invalid-query error.
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Creates a rate-limited error measured from `now`.
    #[must_use]
    pub fn rate_limited(reset_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Self {
        let wait = reset_at.map(|reset_at| (reset_at - now).to_std().unwrap_or(Duration::ZERO));
        Self::RateLimited { reset_at, wait }
    }

    /// Creates an API error, trimming long bodies.
    pub fn api(status: u16, body: &str) -> Self {
        let trimmed = body.trim();
        let mut message: String = trimmed.chars().take(MESSAGE_EXCERPT_CHARS).collect();
        if trimmed.chars().count() > MESSAGE_EXCERPT_CHARS {
            message.push_str("...");
        }
        Self::Api { status, message }
    }

    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Network {
                url: url.to_string(),
                source: error,
            }
        }
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthExpired { status } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the same call may succeed if retried later.
    ///
    /// Rate limits, timeouts, transport failures and 5xx responses are
    /// retryable. Bad queries, missing credentials and expired tokens need
    /// the caller to fix something first.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } | Self::Network { .. } => true,
            Self::Api { status, .. } => *status >= 500,
            Self::InvalidQuery { .. }
            | Self::NotConfigured { .. }
            | Self::AuthExpired { .. }
            | Self::Decode { .. }
            | Self::SessionExhausted { .. }
            | Self::SessionFailed { .. } => false,
        }
    }
}

fn reset_suffix(reset_at: Option<&DateTime<Utc>>, wait: Option<&Duration>) -> String {
    match (reset_at, wait) {
        (Some(reset_at), Some(wait)) => format!(" until {reset_at} (wait {}s)", wait.as_secs()),
        (Some(reset_at), None) => format!(" until {reset_at}"),
        _ => "; the server gave no reset time".to_string(),
    }
}
