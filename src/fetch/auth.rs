//! Credentials attached to page fetches.
//!
//! Exactly one [`AuthConfig`] variant is active per fetch. Secret material is
//! never printed: the `Debug` impl redacts it the same way cookie values are
//! redacted elsewhere.

use std::fmt;

use reqwest::RequestBuilder;
use reqwest::header::COOKIE;

/// Transport-level credentials for a fetch.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum AuthConfig {
    /// No credentials.
    #[default]
    None,
    /// HTTP Basic authentication.
    Basic {
        /// Username sent in the clear part of the header.
        username: String,
        /// Password (sensitive, never log).
        password: String,
    },
    /// `Authorization: Bearer <token>`.
    Bearer {
        /// Token (sensitive, never log).
        token: String,
    },
    /// Raw `Cookie` header value such as `session=abc; theme=dark`.
    Cookie {
        /// Header value (sensitive, never log).
        raw: String,
    },
}

impl AuthConfig {
    /// Creates a Basic credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates a Bearer credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Creates a Cookie credential from a raw header value.
    pub fn cookie(raw: impl Into<String>) -> Self {
        Self::Cookie { raw: raw.into() }
    }

    /// Parses `user:password`. The password may itself contain `:`.
    ///
    /// Returns `None` when there is no separator or the username is empty.
    #[must_use]
    pub fn parse_basic(pair: &str) -> Option<Self> {
        let (username, password) = pair.split_once(':')?;
        if username.is_empty() {
            return None;
        }
        Some(Self::basic(username, password))
    }

    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic { .. } => "basic",
            Self::Bearer { .. } => "bearer",
            Self::Cookie { .. } => "cookie",
        }
    }

    /// Attaches the credential to an outgoing request.
    #[must_use]
    pub fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::None => request,
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::Bearer { token } => request.bearer_auth(token),
            Self::Cookie { raw } => request.header(COOKIE, raw.as_str()),
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::Cookie { .. } => f
                .debug_struct("Cookie")
                .field("raw", &"[REDACTED]")
                .finish(),
        }
    }
}
