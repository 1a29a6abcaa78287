//! HTTP client wrapper for authenticated page fetches.
//!
//! This module provides the [`Fetcher`] struct which issues one GET per call,
//! attaches the active [`AuthConfig`], follows a bounded number of redirects
//! and returns the complete body as a [`RawPage`].

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, redirect};
use tracing::{debug, info, instrument};

use super::auth::AuthConfig;
use super::constants::{CONNECT_TIMEOUT_SECS, DEFAULT_MAX_REDIRECTS, REQUEST_TIMEOUT_SECS};
use super::error::FetchError;
use crate::target::ScrapeTarget;
use crate::user_agent::BROWSER_USER_AGENT;

/// A fully received page body.
///
/// Extraction only starts from a `RawPage`, so an abandoned fetch never leaves
/// partially extracted state behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// URL the caller asked for.
    pub requested_url: String,
    /// URL after redirects; relative links resolve against this.
    pub final_url: String,
    /// Final HTTP status (always 2xx).
    pub status: u16,
    /// `Content-Type` header, when present.
    pub content_type: Option<String>,
    /// Decoded response body.
    pub body: String,
}

impl RawPage {
    /// Builds a page from in-memory HTML. Useful for tests and offline input.
    pub fn from_html(url: impl Into<String>, body: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            requested_url: url.clone(),
            final_url: url,
            status: 200,
            content_type: Some("text/html".to_string()),
            body: body.into(),
        }
    }
}

/// Construction-time settings for a [`Fetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    /// TCP connect timeout.
    pub connect_timeout: Duration,
    /// Timeout used by callers that do not pick their own.
    pub default_timeout: Duration,
    /// Redirect hops followed before failing with `TooManyRedirects`.
    pub max_redirects: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(CONNECT_TIMEOUT_SECS),
            default_timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// Page fetcher with credential support.
///
/// Created once and reused across targets to share the connection pool.
/// There is no internal retry: each call is a single attempt, so a failure
/// always belongs to exactly one request.
///
/// # Example
///
/// ```no_run
/// use scrapehub_core::fetch::{AuthConfig, Fetcher};
/// use scrapehub_core::target::normalize;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = Fetcher::new();
/// let target = normalize("example.com")?;
/// let page = fetcher
///     .fetch(&target, &AuthConfig::None, fetcher.default_timeout())
///     .await?;
/// println!("{} bytes from {}", page.body.len(), page.final_url);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    config: FetcherConfig,
}

impl Default for Fetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetcher {
    /// Creates a fetcher with default timeouts and redirect budget.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static default
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_config(FetcherConfig::default())
            .expect("failed to build HTTP client with static configuration")
    }

    /// Creates a fetcher with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns the builder error if the TLS backend cannot be initialized.
    #[instrument(level = "debug")]
    pub fn with_config(config: FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .redirect(redirect::Policy::limited(config.max_redirects))
            .gzip(true)
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        Ok(Self { client, config })
    }

    /// Timeout configured for callers that do not choose their own.
    #[must_use]
    pub fn default_timeout(&self) -> Duration {
        self.config.default_timeout
    }

    /// Fetches a normalized target.
    ///
    /// # Errors
    ///
    /// See [`fetch_url`](Self::fetch_url).
    #[instrument(skip(self, target, auth), fields(url = %target.normalized_url, auth = auth.kind()))]
    pub async fn fetch(
        &self,
        target: &ScrapeTarget,
        auth: &AuthConfig,
        timeout: Duration,
    ) -> Result<RawPage, FetchError> {
        self.fetch_url(&target.normalized_url, auth, timeout).await
    }

    /// Fetches any absolute URL.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`FetchError::Timeout`] when `timeout` elapses before the body is read
    /// - [`FetchError::TooManyRedirects`] when the redirect budget is exhausted
    /// - [`FetchError::HttpStatus`] for non-2xx responses, with a body excerpt
    /// - [`FetchError::Connection`] for any other transport failure
    #[instrument(skip(self, auth), fields(auth = auth.kind()))]
    pub async fn fetch_url(
        &self,
        url: &str,
        auth: &AuthConfig,
        timeout: Duration,
    ) -> Result<RawPage, FetchError> {
        debug!("sending request");
        let request = auth.apply(self.client.get(url).timeout(timeout));

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e, self.config.max_redirects))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(std::string::ToString::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e, self.config.max_redirects))?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "non-success status");
            return Err(FetchError::http_status(url, status.as_u16(), &body));
        }

        info!(
            final_url = %final_url,
            status = status.as_u16(),
            bytes = body.len(),
            "page fetched"
        );

        Ok(RawPage {
            requested_url: url.to_string(),
            final_url,
            status: status.as_u16(),
            content_type,
            body,
        })
    }
}
