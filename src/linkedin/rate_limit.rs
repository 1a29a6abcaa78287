//! Server-reported quota tracking for the LinkedIn client.
//!
//! The [`RateLimitTracker`] is the single authority over [`RateLimitState`].
//! It is created by the caller, wrapped in `Arc`, and handed to every client
//! that shares the same quota. Values only ever come from response headers;
//! nothing is decremented locally.
//!
//! Responses can finish out of order when calls run in parallel, so each
//! observation carries the server's `Date` and is applied only if it is at
//! least as recent as the last one applied.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use scrapehub_core::linkedin::RateLimitTracker;
//!
//! # async fn example() {
//! let tracker = Arc::new(RateLimitTracker::new());
//! assert!(tracker.blocked_until(chrono::Utc::now()).await.is_none());
//! # }
//! ```

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::header::{DATE, HeaderMap, RETRY_AFTER};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

/// Remaining-calls header.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Quota-reset header (epoch seconds or seconds from now).
pub const RESET_HEADER: &str = "x-ratelimit-reset";

/// Reset values below this are deltas, above it epoch seconds.
const EPOCH_THRESHOLD_SECS: i64 = 1_000_000_000;

/// Maximum Retry-After value (1 hour) to prevent excessive waits.
const MAX_RETRY_AFTER: Duration = Duration::from_secs(3600);

/// Last known quota, as reported by the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RateLimitState {
    /// Calls left in the current window.
    pub remaining: Option<u64>,
    /// When the window resets.
    pub reset_at: Option<DateTime<Utc>>,
    /// Timestamp of the observation these values came from.
    pub last_checked: Option<DateTime<Utc>>,
}

impl RateLimitState {
    /// Reset time if the quota is spent and the reset lies after `now`.
    #[must_use]
    pub fn blocked_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match (self.remaining, self.reset_at) {
            (Some(0), Some(reset_at)) if reset_at > now => Some(reset_at),
            _ => None,
        }
    }
}

/// Quota values read from one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitObservation {
    /// Reported remaining calls.
    pub remaining: Option<u64>,
    /// Reported reset time.
    pub reset_at: Option<DateTime<Utc>>,
    /// Server `Date`, or local receive time when absent.
    pub observed_at: DateTime<Utc>,
}

impl RateLimitObservation {
    /// Reads quota headers.
    ///
    /// A 429 always means zero remaining; its `Retry-After` supplies the reset
    /// time when `X-RateLimit-Reset` is absent.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap, status: u16, received_at: DateTime<Utc>) -> Self {
        let observed_at = header_str(headers, DATE.as_str())
            .and_then(|v| httpdate::parse_http_date(v).ok())
            .map_or(received_at, DateTime::<Utc>::from);

        let mut remaining = header_str(headers, REMAINING_HEADER).and_then(|v| v.parse::<u64>().ok());
        let mut reset_at =
            header_str(headers, RESET_HEADER).and_then(|v| parse_reset(v, observed_at));

        if status == 429 {
            remaining = Some(0);
            if reset_at.is_none() {
                reset_at = header_str(headers, RETRY_AFTER.as_str())
                    .and_then(|v| parse_retry_after(v, observed_at))
                    .and_then(|wait| TimeDelta::from_std(wait).ok())
                    .map(|wait| observed_at + wait);
            }
        }

        Self {
            remaining,
            reset_at,
            observed_at,
        }
    }

    /// Whether the response carried any quota information.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.remaining.is_none() && self.reset_at.is_none()
    }
}

/// Shared owner of [`RateLimitState`].
#[derive(Debug, Default)]
pub struct RateLimitTracker {
    state: Mutex<RateLimitState>,
}

impl RateLimitTracker {
    /// Tracker with no knowledge of the quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker seeded with a known state.
    #[must_use]
    pub fn with_state(state: RateLimitState) -> Self {
        Self {
            state: Mutex::new(state),
        }
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> RateLimitState {
        *self.state.lock().await
    }

    /// Reset time if calls must wait; see [`RateLimitState::blocked_until`].
    pub async fn blocked_until(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.state.lock().await.blocked_until(now)
    }

    /// Applies `observation` unless a more recent one was already applied.
    ///
    /// Returns `true` when the state changed.
    #[instrument(skip(self), level = "debug")]
    pub async fn record(&self, observation: RateLimitObservation) -> bool {
        if observation.is_empty() {
            return false;
        }
        let mut state = self.state.lock().await;
        if state
            .last_checked
            .is_some_and(|last| observation.observed_at < last)
        {
            debug!(last_checked = ?state.last_checked, "ignoring stale rate-limit observation");
            return false;
        }
        if let Some(remaining) = observation.remaining {
            state.remaining = Some(remaining);
        }
        if let Some(reset_at) = observation.reset_at {
            state.reset_at = Some(reset_at);
        }
        state.last_checked = Some(observation.observed_at);
        if state.remaining == Some(0) {
            warn!(reset_at = ?state.reset_at, "LinkedIn quota exhausted");
        }
        true
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::trim)
}

fn parse_reset(value: &str, observed_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let seconds = value.parse::<i64>().ok()?;
    if seconds < 0 {
        return None;
    }
    if seconds >= EPOCH_THRESHOLD_SECS {
        DateTime::from_timestamp(seconds, 0)
    } else {
        observed_at.checked_add_signed(TimeDelta::seconds(seconds))
    }
}

/// Parses a Retry-After header value into a Duration.
///
/// Supports integer seconds (`120`) and HTTP-dates
/// (`Wed, 21 Oct 2025 07:28:00 GMT`), the latter measured from `now`.
/// Returns `None` if the value cannot be parsed. Caps excessive values at 1 hour.
///
/// ```
/// use std::time::Duration;
/// use scrapehub_core::linkedin::parse_retry_after;
///
/// let now = chrono::Utc::now();
/// assert_eq!(parse_retry_after("120", now), Some(Duration::from_secs(120)));
/// assert_eq!(parse_retry_after("invalid", now), None);
/// ```
#[must_use]
pub fn parse_retry_after(header_value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let header_value = header_value.trim();

    let duration = if let Ok(seconds) = header_value.parse::<i64>() {
        let Ok(seconds) = u64::try_from(seconds) else {
            debug!(seconds, "negative Retry-After value, ignoring");
            return None;
        };
        Duration::from_secs(seconds)
    } else if let Ok(at) = httpdate::parse_http_date(header_value) {
        (DateTime::<Utc>::from(at) - now)
            .to_std()
            .unwrap_or(Duration::ZERO)
    } else {
        debug!(header_value, "unparseable Retry-After value");
        return None;
    };

    if duration > MAX_RETRY_AFTER {
        warn!(
            delay_secs = duration.as_secs(),
            max_secs = MAX_RETRY_AFTER.as_secs(),
            "Retry-After exceeds maximum, capping at 1 hour"
        );
        return Some(MAX_RETRY_AFTER);
    }
    Some(duration)
}
