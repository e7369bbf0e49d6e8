//! Bearer token extraction from transport-neutral request credentials.

use std::collections::HashMap;

/// Cookie that carries the access token for browser sessions.
pub const DEFAULT_SESSION_COOKIE: &str = "access_token";

/// The parts of an inbound request that can carry a token.
///
/// The HTTP layer fills this from its headers; this crate never sees the
/// transport types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestCredentials {
    pub cookies: HashMap<String, String>,
    pub authorization: Option<String>,
}

impl RequestCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn with_authorization(mut self, value: impl Into<String>) -> Self {
        self.authorization = Some(value.into());
        self
    }
}

/// Pulls the raw token out of a request: session cookie first, then
/// `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenExtractor {
    cookie_name: String,
}

impl TokenExtractor {
    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn extract<'a>(&self, credentials: &'a RequestCredentials) -> Option<&'a str> {
        let from_cookie = credentials
            .cookies
            .get(&self.cookie_name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty());

        if from_cookie.is_some() {
            return from_cookie;
        }

        credentials.authorization.as_deref().and_then(bearer_token)
    }
}

impl Default for TokenExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_COOKIE)
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_wins_over_header() {
        let creds = RequestCredentials::new()
            .with_cookie(DEFAULT_SESSION_COOKIE, "from-cookie")
            .with_authorization("Bearer from-header");

        assert_eq!(TokenExtractor::default().extract(&creds), Some("from-cookie"));
    }

    #[test]
    fn header_is_used_without_cookie() {
        let creds = RequestCredentials::new().with_authorization("Bearer abc.def.ghi");
        assert_eq!(TokenExtractor::default().extract(&creds), Some("abc.def.ghi"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        let creds = RequestCredentials::new().with_authorization("bearer tok");
        assert_eq!(TokenExtractor::default().extract(&creds), Some("tok"));
    }

    #[test]
    fn empty_cookie_falls_back_to_header() {
        let creds = RequestCredentials::new()
            .with_cookie(DEFAULT_SESSION_COOKIE, "")
            .with_authorization("Bearer tok");

        assert_eq!(TokenExtractor::default().extract(&creds), Some("tok"));
    }

    #[test]
    fn other_cookies_are_ignored() {
        let creds = RequestCredentials::new().with_cookie("refresh_token", "nope");
        assert_eq!(TokenExtractor::default().extract(&creds), None);
    }

    #[test]
    fn custom_cookie_name() {
        let creds = RequestCredentials::new().with_cookie("sid", "tok");
        assert_eq!(TokenExtractor::new("sid").extract(&creds), Some("tok"));
    }

    #[test]
    fn non_bearer_or_empty_headers_yield_nothing() {
        let extractor = TokenExtractor::default();
        for header in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer    ", "tok"] {
            let creds = RequestCredentials::new().with_authorization(header);
            assert_eq!(extractor.extract(&creds), None, "header: {header:?}");
        }
    }

    #[test]
    fn nothing_presented() {
        assert_eq!(TokenExtractor::default().extract(&RequestCredentials::new()), None);
    }
}
