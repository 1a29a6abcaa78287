//! LinkedIn job-search API client.
//!
//! # Features
//!
//! - Query validation before any request ([`JobSearchQuery::validate`])
//! - Offset pagination through [`SearchSession`], advancing by records returned
//! - Per-session de-duplication of job ids
//! - Shared, server-sourced quota tracking ([`RateLimitTracker`]) with
//!   fail-fast on a spent quota
//! - Distinct errors for rate limits, expired tokens and other API failures

mod client;
mod error;
mod model;
mod query;
mod rate_limit;
mod session;

pub use client::{
    DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE, DEFAULT_TIMEOUT_SECS, LinkedInClient, LinkedInConfig,
    LinkedInCredentials,
};
pub use error::ApiError;
pub use model::{DESCRIPTION_SNIPPET_CHARS, JobDetails, JobRecord, description_snippet};
pub use query::{DatePosted, ExperienceLevel, JobSearchQuery, JobType, MAX_PAGE_SIZE, SortBy};
pub use rate_limit::{
    RateLimitObservation, RateLimitState, RateLimitTracker, parse_retry_after,
};
pub use session::{SearchSession, SessionState};
