use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{error, info};

use crate::app::{errors::json_error, AppState};
use crate::context::SessionContext;

/// Revoke the presented token and clear the session cookie.
pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    jar: CookieJar,
) -> Response {
    let subject = session.principal().subject_id();

    if let Err(e) = state.revocations.revoke_default(session.token()) {
        error!(subject = %subject, error = %e, "logout could not revoke token");
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "revocation_unavailable",
            "could not end the session, try again",
        );
    }

    info!(subject = %subject, "session revoked");

    let cookie_name = state.resolver.extractor().cookie_name().to_string();
    let jar = jar.remove(Cookie::build((cookie_name, "")).path("/"));

    (jar, StatusCode::NO_CONTENT).into_response()
}
