//! Shared User-Agent strings for page and API HTTP clients.

/// Browser User-Agent sent with page fetches.
///
/// Many sites answer unknown agents with 403, so page fetches present
/// themselves as a desktop browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36";

/// Default User-Agent for API requests (identifies the tool).
#[must_use]
pub(crate) fn default_api_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("scrapehub/{version} (job-search-client)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_user_agent_contains_version() {
        let ua = default_api_user_agent();
        assert_eq!(
            ua.strip_prefix("scrapehub/")
                .and_then(|s| s.split(' ').next()),
            Some(env!("CARGO_PKG_VERSION")),
            "API UA must contain crate version: {ua}"
        );
    }

    #[test]
    fn test_browser_user_agent_looks_like_browser() {
        assert!(BROWSER_USER_AGENT.starts_with("Mozilla/5.0"));
    }
}
