use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use atrium_auth::{RequestCredentials, VerificationError};

use crate::app::{errors::rejection_to_response, AppState};
use crate::context::SessionContext;

/// Resolve the principal for every protected route, or answer 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let credentials = credentials_from_headers(req.headers());

    let Some(token) = state.resolver.extractor().extract(&credentials) else {
        return rejection_to_response(VerificationError::MissingToken.into());
    };

    match state.resolver.resolve_token(token).await {
        Ok(principal) => {
            let session = SessionContext::new(principal, token);
            req.extensions_mut().insert(session);
            next.run(req).await
        }
        Err(rejection) => rejection_to_response(rejection),
    }
}

/// Map HTTP headers onto the transport-neutral credential set.
pub fn credentials_from_headers(headers: &HeaderMap) -> RequestCredentials {
    let jar = CookieJar::from_headers(headers);

    let mut credentials = RequestCredentials::new();
    for cookie in jar.iter() {
        credentials
            .cookies
            .entry(cookie.name().to_string())
            .or_insert_with(|| cookie.value().to_string());
    }

    credentials.authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    credentials
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn cookies_and_authorization_are_collected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def; lang=en"),
        );
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));

        let creds = credentials_from_headers(&headers);

        assert_eq!(creds.cookies.get("access_token").map(String::as_str), Some("abc.def"));
        assert_eq!(creds.cookies.get("theme").map(String::as_str), Some("dark"));
        assert_eq!(creds.authorization.as_deref(), Some("Bearer xyz"));
    }

    #[test]
    fn multiple_cookie_headers_are_merged() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("access_token=tok"));

        let creds = credentials_from_headers(&headers);

        assert_eq!(creds.cookies.get("a").map(String::as_str), Some("1"));
        assert_eq!(creds.cookies.get("access_token").map(String::as_str), Some("tok"));
    }

    #[test]
    fn empty_headers_yield_empty_credentials() {
        let creds = credentials_from_headers(&HeaderMap::new());
        assert_eq!(creds, RequestCredentials::new());
    }
}
