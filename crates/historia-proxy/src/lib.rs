//! historia-proxy
//!
//! Credential-injecting relay in front of the upstream chat completion
//! API. Clients post a completion request without a model or key; the
//! relay adds both and passes the upstream reply through.

use axum::middleware as axum_mw;
use axum::routing::{any, get};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use state::AppState;

pub const COMPLETION_PATH: &str = "/api/completion-proxy";

/// Build the relay router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(routes::health::health_check))
        // Every method lands here so that non-POST gets the JSON 405 envelope.
        .route(COMPLETION_PATH, any(routes::completion::relay))
        .layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
