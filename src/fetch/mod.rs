//! Authenticated page fetching.
//!
//! # Features
//!
//! - One attempt per call; retry policy belongs to the caller
//! - Basic, Bearer and Cookie credentials ([`AuthConfig`])
//! - Redirects followed up to a bounded hop count
//! - Per-call timeout, browser User-Agent, gzip decoding
//! - Structured errors that keep the status code and a body excerpt

mod auth;
mod client;
pub mod constants;
mod error;

pub use auth::AuthConfig;
pub use client::{Fetcher, FetcherConfig, RawPage};
pub use error::FetchError;
