//! HTTP API application wiring (Axum router + store wiring).
//!
//! - `services.rs`: the stores and orchestrator, plus the blocking bridge
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: &Config) -> Router {
    let services = Arc::new(services::build_services(config));
    router(services)
}

/// Router over already-built services.
pub fn router(services: Arc<services::AppServices>) -> Router {
    let api = routes::router()
        .layer(axum::middleware::from_fn(middleware::user_context_middleware));

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/metrics", get(routes::system::metrics))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(services)),
        )
}
