//! thermal-api — scheduler-extender HTTP surface.
//!
//! Decodes extender calls, hands them to the `Orchestrator`, and encodes
//! the results back into the extender wire format.
//!
//! # Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `{base_path}/{filter_verb}` | Filter: admit cool nodes, reject hot ones |
//! | POST | `{base_path}/{prioritize_verb}` | Prioritize: score nodes, cooler is higher |
//! | GET | `/healthz` | Liveness |
//! | GET | `/metrics` | Prometheus exposition |
//!
//! Defaults are `/thermalScheduler/filter/thermal` and
//! `/thermalScheduler/prioritize/thermal_score`.

pub mod convert;
pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use thermal_core::config::ServerConfig;
use thermal_decision::Orchestrator;

pub use error::{RequestError, RequestResult};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<Orchestrator>,
}

/// Build the extender router.
pub fn build_router(orchestrator: Arc<Orchestrator>, server: &ServerConfig) -> Router {
    let state = ApiState { orchestrator };

    Router::new()
        .route(&server.filter_path(), post(handlers::filter))
        .route(&server.prioritize_path(), post(handlers::prioritize))
        .route("/healthz", get(handlers::healthz))
        .route("/metrics", get(handlers::prometheus_metrics))
        .layer(DefaultBodyLimit::max(server.max_body_bytes))
        .with_state(state)
}
