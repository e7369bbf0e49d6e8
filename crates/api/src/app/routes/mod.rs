use axum::{
    routing::{get, post},
    Router,
};

use crate::app::AppState;

pub mod session;
pub mod system;

/// Router for all authenticated endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route("/auth/logout", post(session::logout))
}
