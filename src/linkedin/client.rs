//! HTTP client for the LinkedIn job-search REST API.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::error::ApiError;
use super::model::{JobDetails, JobElement, JobRecord, JobSearchResponse};
use super::query::{JobSearchQuery, MAX_PAGE_SIZE};
use super::rate_limit::{RateLimitObservation, RateLimitTracker};
use super::session::SearchSession;
use crate::user_agent::default_api_user_agent;

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://api.linkedin.com/v2";

/// Records requested per page when the query does not say.
pub const DEFAULT_PAGE_SIZE: u32 = 25;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// The four values a LinkedIn app needs.
///
/// Received from the caller per client and never stored by the library.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LinkedInCredentials {
    /// OAuth client id.
    pub client_id: String,
    /// OAuth client secret.
    pub client_secret: String,
    /// Registered redirect URI.
    pub redirect_uri: String,
    /// Bearer access token.
    pub access_token: String,
}

impl LinkedInCredentials {
    /// Environment variable holding the client id.
    pub const CLIENT_ID_VAR: &'static str = "LINKEDIN_CLIENT_ID";
    /// Environment variable holding the client secret.
    pub const CLIENT_SECRET_VAR: &'static str = "LINKEDIN_CLIENT_SECRET";
    /// Environment variable holding the redirect URI.
    pub const REDIRECT_URI_VAR: &'static str = "LINKEDIN_REDIRECT_URI";
    /// Environment variable holding the access token.
    pub const ACCESS_TOKEN_VAR: &'static str = "LINKEDIN_ACCESS_TOKEN";

    /// Bundles the four values.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            access_token: access_token.into(),
        }
    }

    /// Reads the four `LINKEDIN_*` environment variables; unset ones are empty.
    #[must_use]
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        Self::new(
            var(Self::CLIENT_ID_VAR),
            var(Self::CLIENT_SECRET_VAR),
            var(Self::REDIRECT_URI_VAR),
            var(Self::ACCESS_TOKEN_VAR),
        )
    }

    /// Names of the values that are empty.
    #[must_use]
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (Self::CLIENT_ID_VAR, &self.client_id),
            (Self::CLIENT_SECRET_VAR, &self.client_secret),
            (Self::REDIRECT_URI_VAR, &self.redirect_uri),
            (Self::ACCESS_TOKEN_VAR, &self.access_token),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    /// Fails with [`ApiError::NotConfigured`] unless all values are present.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] listing the empty values.
    pub fn ensure_configured(&self) -> Result<(), ApiError> {
        let missing = self.missing();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::NotConfigured { missing })
        }
    }
}

impl fmt::Debug for LinkedInCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedInCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Endpoint and paging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedInConfig {
    /// API root, without trailing slash.
    pub base_url: String,
    /// Default records per page (1..=100).
    pub page_size: u32,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// LinkedIn job-search client.
///
/// Every request first consults the shared [`RateLimitTracker`]; a spent
/// quota with a future reset fails fast with [`ApiError::RateLimited`] and
/// no network call. Every response updates the tracker. The client never
/// sleeps and never refreshes tokens.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use scrapehub_core::linkedin::{
///     JobSearchQuery, LinkedInClient, LinkedInConfig, LinkedInCredentials, RateLimitTracker,
/// };
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = LinkedInClient::new(
///     LinkedInCredentials::from_env(),
///     LinkedInConfig::default(),
///     Arc::new(RateLimitTracker::new()),
/// )?;
/// let mut session = client.submit(JobSearchQuery::new().keywords("rust"))?;
/// while !session.is_exhausted() {
///     let jobs = client.next_page(&mut session).await?;
///     println!("{} jobs", jobs.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LinkedInClient {
    http: Client,
    credentials: LinkedInCredentials,
    config: LinkedInConfig,
    rate_limits: Arc<RateLimitTracker>,
}

impl LinkedInClient {
    /// Creates a client sharing `rate_limits` with any other client given the
    /// same tracker.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotConfigured`] when a credential is empty,
    /// [`ApiError::InvalidQuery`] for a page size outside `1..=100`, or
    /// [`ApiError::Network`] if the HTTP client cannot be built.
    pub fn new(
        credentials: LinkedInCredentials,
        config: LinkedInConfig,
        rate_limits: Arc<RateLimitTracker>,
    ) -> Result<Self, ApiError> {
        credentials.ensure_configured()?;
        if !(1..=MAX_PAGE_SIZE).contains(&config.page_size) {
            return Err(ApiError::invalid_query(format!(
                "default page size {} is outside 1..={MAX_PAGE_SIZE}",
                config.page_size
            )));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(default_api_user_agent())
            .build()
            .map_err(|e| ApiError::from_reqwest(&config.base_url, e))?;
        Ok(Self {
            http,
            credentials,
            config,
            rate_limits,
        })
    }

    /// The tracker this client reports to.
    #[must_use]
    pub fn rate_limits(&self) -> &Arc<RateLimitTracker> {
        &self.rate_limits
    }

    /// Validates `query` and opens an idle session for it. No request is made.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidQuery`] when no filter is set.
    #[instrument(skip(self))]
    pub fn submit(&self, query: JobSearchQuery) -> Result<SearchSession, ApiError> {
        query.validate()?;
        let page_size = query.limit.unwrap_or(self.config.page_size);
        let session = SearchSession::new(query, page_size);
        info!(session_id = session.id(), page_size, "search submitted");
        Ok(session)
    }

    /// Fetches the next page of `session`.
    ///
    /// Returned records exclude ids already returned by earlier pages.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - [`ApiError::SessionExhausted`] / [`ApiError::SessionFailed`] without a request
    /// - [`ApiError::RateLimited`] when the quota is spent (possibly without a request)
    /// - [`ApiError::AuthExpired`] on 401; the session becomes `Failed`
    /// - [`ApiError::Api`], [`ApiError::Timeout`], [`ApiError::Network`], [`ApiError::Decode`]
    #[instrument(skip(self, session), fields(session_id = session.id(), offset = session.offset()))]
    pub async fn next_page(&self, session: &mut SearchSession) -> Result<Vec<JobRecord>, ApiError> {
        let previous = session.begin_page()?;
        let params = session
            .query()
            .to_params(session.offset(), session.page_size());

        match self.get_json::<JobSearchResponse>("jobSearch", &params).await {
            Ok(response) => {
                let returned = response.elements.len();
                let records = session.complete_page(response);
                info!(
                    returned,
                    new_records = records.len(),
                    next_offset = session.offset(),
                    state = %session.state(),
                    "page received"
                );
                Ok(records)
            }
            Err(error) => {
                session.abort_page(previous, &error);
                warn!(error = %error, state = %session.state(), "page request failed");
                Err(error)
            }
        }
    }

    /// Fetches one posting by id.
    ///
    /// # Errors
    ///
    /// Same failures as [`next_page`](Self::next_page) minus the session ones;
    /// a response without an id is reported as [`ApiError::Api`].
    #[instrument(skip(self))]
    pub async fn job_details(&self, job_id: &str) -> Result<JobDetails, ApiError> {
        let endpoint = format!("jobs/{}", urlencoding::encode(job_id.trim()));
        let element = self.get_json::<JobElement>(&endpoint, &[]).await?;
        element
            .into_details()
            .ok_or_else(|| ApiError::api(200, "job details response has no id"))
    }

    /// Checks the token against `GET /me`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AuthExpired`] for a rejected token, or any
    /// transport or rate-limit failure.
    #[instrument(skip(self))]
    pub async fn check_status(&self) -> Result<(), ApiError> {
        self.get_json::<serde_json::Value>("me", &[]).await?;
        info!("LinkedIn API is operational");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&'static str, String)],
    ) -> Result<T, ApiError> {
        let now = Utc::now();
        if let Some(reset_at) = self.rate_limits.blocked_until(now).await {
            debug!(%reset_at, "quota spent, not sending request");
            return Err(ApiError::rate_limited(Some(reset_at), now));
        }

        let url = format!("{}/{endpoint}", self.config.base_url.trim_end_matches('/'));
        debug!(url = %url, "sending API request");
        let response = self
            .http
            .get(&url)
            .query(params)
            .bearer_auth(&self.credentials.access_token)
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .send()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;

        let status = response.status().as_u16();
        let observation = RateLimitObservation::from_headers(response.headers(), status, Utc::now());
        self.rate_limits.record(observation).await;

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_reqwest(&url, e))?;

        match status {
            200..=299 => serde_json::from_str(&body).map_err(|source| ApiError::Decode {
                url: url.clone(),
                source,
            }),
            401 => Err(ApiError::AuthExpired { status }),
            429 => {
                let reset_at = self.rate_limits.blocked_until(observation.observed_at).await;
                Err(ApiError::rate_limited(reset_at, observation.observed_at))
            }
            _ => Err(ApiError::api(status, &body)),
        }
    }
}
