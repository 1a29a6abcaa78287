//! Constants for the fetch module (timeouts, redirects, diagnostics).

/// Default HTTP connect timeout (10 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default whole-request timeout (15 seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default maximum number of redirect hops followed before failing.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Maximum number of response-body characters kept on HTTP status errors.
pub const ERROR_BODY_EXCERPT_CHARS: usize = 512;
