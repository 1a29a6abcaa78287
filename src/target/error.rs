//! Error types for scrape target preparation.

use thiserror::Error;

/// Errors that can occur while turning raw user input into scrape targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    /// Input was empty after trimming, or could not be turned into a URL.
    #[error("invalid URL '{url}': {reason}\n  Suggestion: {suggestion}")]
    InvalidUrl {
        /// The raw input that failed.
        url: String,
        /// Why the input is invalid.
        reason: String,
        /// How to fix the issue.
        suggestion: String,
    },

    /// More URLs were supplied than the caller allows in one batch.
    #[error("{count} URLs supplied, at most {limit} may be processed at a time")]
    TooManyUrls {
        /// Number of non-blank lines supplied.
        count: usize,
        /// Caller-configured cap.
        limit: usize,
    },
}

impl TargetError {
    /// Creates an `InvalidUrl` error for blank input.
    #[must_use]
    pub fn empty(raw: &str) -> Self {
        Self::InvalidUrl {
            url: raw.to_string(),
            reason: "input is empty".to_string(),
            suggestion: "Enter a URL such as example.com/page".to_string(),
        }
    }

    /// Returns `false`: every target error needs corrected input.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }
}
