use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::context::SessionContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(session): Extension<SessionContext>) -> impl IntoResponse {
    let principal = session.principal();

    let mut body = json!({
        "subject_id": principal.subject_id().to_string(),
        "staff_id": principal.staff_id().to_string(),
        "email": principal.email(),
        "business_id": principal.business_id().to_string(),
        "role": principal.role().as_str(),
        "delegated": principal.is_delegated(),
    });

    if let Some(delegation) = principal.delegation() {
        body["delegation"] = json!({
            "delegation_session_id": delegation.delegation_session_id.to_string(),
            "original_business_id": delegation.original_business_id.to_string(),
            "original_role": delegation.original_role.as_str(),
        });
    }

    Json(body)
}
