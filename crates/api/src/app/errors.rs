use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use atrium_auth::Rejection;

/// Every rejection is a 401 with a fixed, non-distinguishing message.
pub fn rejection_to_response(rejection: Rejection) -> Response {
    json_error(StatusCode::UNAUTHORIZED, "unauthorized", rejection.message())
}

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
