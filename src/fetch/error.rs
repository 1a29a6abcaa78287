//! Error types for the fetch module.
//!
//! Each variant carries the URL that failed so callers can render a specific
//! message without keeping extra context around.

use thiserror::Error;

use super::constants::ERROR_BODY_EXCERPT_CHARS;

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request did not complete within the caller-supplied timeout.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// Server answered with a non-2xx status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
        /// Leading part of the response body, for diagnostics.
        body: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("connection error fetching {url}: {source}")]
    Connection {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Redirect chain exceeded the configured hop budget.
    #[error("too many redirects fetching {url} (limit {limit})")]
    TooManyRedirects {
        /// The URL whose redirect chain was abandoned.
        url: String,
        /// Configured maximum number of hops.
        limit: usize,
    },
}

impl FetchError {
    /// Creates a timeout error.
    pub fn timeout(url: impl Into<String>) -> Self {
        Self::Timeout { url: url.into() }
    }

    /// Creates an HTTP status error, truncating the body excerpt.
    pub fn http_status(url: impl Into<String>, status: u16, body: &str) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            body: body.chars().take(ERROR_BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// Creates a connection error from a reqwest error.
    pub fn connection(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Connection {
            url: url.into(),
            source,
        }
    }

    /// Creates a redirect-limit error.
    pub fn too_many_redirects(url: impl Into<String>, limit: usize) -> Self {
        Self::TooManyRedirects {
            url: url.into(),
            limit,
        }
    }

    /// Maps a transport error into the matching variant.
    pub(crate) fn from_reqwest(url: &str, error: reqwest::Error, max_redirects: usize) -> Self {
        if error.is_timeout() {
            Self::timeout(url)
        } else if error.is_redirect() {
            Self::too_many_redirects(url, max_redirects)
        } else {
            Self::connection(url, error)
        }
    }

    /// Returns the HTTP status code for [`FetchError::HttpStatus`].
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the caller may retry the same request unchanged.
    ///
    /// Timeouts and connection failures are transient. Status errors and
    /// redirect loops repeat on retry.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Connection { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_timeout_display() {
        let error = FetchError::timeout("https://example.com/page");
        let msg = error.to_string();
        assert!(msg.contains("timeout"), "got: {msg}");
        assert!(msg.contains("https://example.com/page"), "got: {msg}");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_fetch_error_http_status_display() {
        let error = FetchError::http_status("https://example.com/missing", 404, "not here");
        let msg = error.to_string();
        assert!(msg.contains("404"), "got: {msg}");
        assert_eq!(error.status(), Some(404));
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_fetch_error_http_status_truncates_body() {
        let body = "x".repeat(ERROR_BODY_EXCERPT_CHARS * 3);
        let FetchError::HttpStatus { body, .. } =
            FetchError::http_status("https://example.com", 500, &body)
        else {
            panic!("expected HttpStatus");
        };
        assert_eq!(body.chars().count(), ERROR_BODY_EXCERPT_CHARS);
    }

    #[test]
    fn test_fetch_error_too_many_redirects_display() {
        let error = FetchError::too_many_redirects("https://loop.example", 3);
        let msg = error.to_string();
        assert!(msg.contains("too many redirects"), "got: {msg}");
        assert!(msg.contains("limit 3"), "got: {msg}");
        assert!(!error.is_retryable());
        assert_eq!(error.status(), None);
    }
}
