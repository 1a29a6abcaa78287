//! Scrape target normalization.
//!
//! User-supplied URLs arrive in many shapes: bare hosts, `http://` links
//! pasted from a browser, or lines from an uploaded file. This module turns
//! them into [`ScrapeTarget`]s whose `normalized_url` always uses `https://`.
//!
//! Only the scheme is touched here. Host resolution and reachability are
//! the fetcher's concern.
//!
//! # Example
//!
//! ```
//! use scrapehub_core::target::normalize;
//!
//! let target = normalize("en.wikipedia.org/wiki/Cat").unwrap();
//! assert_eq!(target.normalized_url, "https://en.wikipedia.org/wiki/Cat");
//! ```

mod error;

use serde::Serialize;
use tracing::{debug, instrument};

pub use error::TargetError;

const SECURE_PREFIX: &str = "https://";
const INSECURE_PREFIX: &str = "http://";

/// A URL prepared for fetching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScrapeTarget {
    /// Input exactly as the caller supplied it.
    pub raw_url: String,
    /// Canonical form, always starting with `https://`.
    pub normalized_url: String,
}

impl ScrapeTarget {
    /// Returns the host portion of the normalized URL, if it parses.
    #[must_use]
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.normalized_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase))
    }
}

/// Normalizes a single raw URL.
///
/// - Surrounding whitespace is trimmed; blank input fails with
///   [`TargetError::InvalidUrl`].
/// - `https://` input passes through unchanged.
/// - `http://` is upgraded to `https://`, keeping host and path.
/// - Input without a scheme gets `https://` prefixed.
///
/// Scheme matching is case-insensitive and the scheme is written in lowercase;
/// the rest of the URL is kept as typed.
///
/// # Errors
///
/// Returns [`TargetError::InvalidUrl`] for blank input. Anything else is
/// accepted; malformed URLs surface when they are fetched.
#[instrument(level = "debug")]
pub fn normalize(raw: &str) -> Result<ScrapeTarget, TargetError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TargetError::empty(raw));
    }

    let normalized_url = if has_prefix_ignore_case(trimmed, SECURE_PREFIX) {
        format!("{SECURE_PREFIX}{}", &trimmed[SECURE_PREFIX.len()..])
    } else if has_prefix_ignore_case(trimmed, INSECURE_PREFIX) {
        format!("{SECURE_PREFIX}{}", &trimmed[INSECURE_PREFIX.len()..])
    } else {
        format!("{SECURE_PREFIX}{trimmed}")
    };

    debug!(url = %normalized_url, "normalized target");
    Ok(ScrapeTarget {
        raw_url: raw.to_string(),
        normalized_url,
    })
}

/// Normalizes every non-blank line of `input`, enforcing a caller-chosen cap.
///
/// The cap is a caller policy (manual entry and file upload use different
/// limits), so it is passed in rather than fixed here.
///
/// # Errors
///
/// Returns [`TargetError::TooManyUrls`] when more than `limit` non-blank lines
/// are present, or the first [`TargetError::InvalidUrl`] encountered.
#[instrument(skip(input), fields(input_len = input.len()))]
pub fn collect_targets(input: &str, limit: usize) -> Result<Vec<ScrapeTarget>, TargetError> {
    let lines: Vec<&str> = input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.len() > limit {
        return Err(TargetError::TooManyUrls {
            count: lines.len(),
            limit,
        });
    }

    lines.into_iter().map(normalize).collect()
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
