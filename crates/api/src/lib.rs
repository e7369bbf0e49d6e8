//! HTTP API: session validation middleware, auth routes, startup wiring.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
