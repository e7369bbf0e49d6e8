//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: builds the resolver and stores from configuration
//! - `routes/`: HTTP handlers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Router};

use atrium_auth::{PrincipalResolver, RevocationStore};

use crate::middleware;

pub mod errors;
pub mod routes;
pub mod services;

/// Shared state for handlers and the auth middleware.
///
/// `revocations` is the same store the resolver consults.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<PrincipalResolver>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl AppState {
    pub fn new(resolver: PrincipalResolver, revocations: Arc<dyn RevocationStore>) -> Self {
        Self {
            resolver: Arc::new(resolver),
            revocations,
        }
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(state: AppState) -> Router {
    // Protected routes: require a resolved principal.
    let protected = routes::router().layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(protected)
        .with_state(state)
}
