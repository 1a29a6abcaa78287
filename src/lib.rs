//! Scrapehub Core Library
//!
//! This library provides the extraction and API-access engine behind the
//! `scrapehub` tool: it turns web pages into labeled records and pages
//! through LinkedIn job searches, then writes either as CSV or JSON.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`target`] - URL normalization to fetchable HTTPS targets
//! - [`fetch`] - Authenticated single-attempt page fetching
//! - [`extract`] - Common-field heuristics and CSS selector rules
//! - [`export`] - CSV/JSON writers with a shared column order
//! - [`linkedin`] - Job-search client with pagination and quota tracking
//! - [`history`] - Saved LinkedIn searches in SQLite

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod export;
pub mod extract;
pub mod fetch;
pub mod history;
pub mod linkedin;
pub mod target;
mod user_agent;

// Re-export commonly used types
pub use export::{ExportFormat, ExportOptions, Exportable, WriteError, export_filename, write_records};
pub use extract::{
    CommonField, ExtractionResult, ExtractionRule, FieldValue, RuleError, RuleSet, extract,
};
pub use fetch::{AuthConfig, FetchError, Fetcher, FetcherConfig, RawPage};
pub use history::{HistoryError, SavedSearch, SearchHistoryStore};
pub use linkedin::{
    ApiError, JobRecord, JobSearchQuery, LinkedInClient, LinkedInConfig, LinkedInCredentials,
    RateLimitTracker, SearchSession,
};
pub use target::{ScrapeTarget, TargetError, collect_targets, normalize};
pub use user_agent::BROWSER_USER_AGENT;
