//! # unitdex-api: Axum CRUD Service for StarCraft Units and Skills
//!
//! Serves the Unit and Skill resources declared in `unitdex-core` from
//! in-memory stores. Every input is checked against the resource's field
//! rules, and every failure leaves the stores unchanged.
//!
//! ## API Surface
//!
//! | Prefix              | Module                | Domain          |
//! |---------------------|-----------------------|-----------------|
//! | `/units/*`          | [`routes::units`]     | Units           |
//! | `/skills/*`         | [`routes::skills`]    | Skills          |
//! | `/openapi.json`     | [`openapi`]           | API description |
//! | `/health/*`         | this module           | Probes          |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```
//!
//! ## Error Model
//!
//! | Status | Code               | Cause                                     |
//! |--------|--------------------|-------------------------------------------|
//! | 400    | `CONFLICT`         | Uniqueness violation on create or update  |
//! | 404    | `NOT_FOUND`        | No live record with the requested id      |
//! | 422    | `VALIDATION_ERROR` | Unreadable input or field rule violations |

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::middleware::from_fn;
use axum::Router;

use crate::state::AppState;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let metrics = state.metrics.clone();

    let api = Router::new()
        .merge(routes::units::router())
        .merge(routes::skills::router())
        .merge(openapi::router())
        .layer(from_fn(middleware::metrics::metrics_middleware))
        .layer(middleware::tracing_layer::layer())
        .layer(axum::Extension(metrics))
        .with_state(state);

    let health = Router::new()
        .route("/health/liveness", axum::routing::get(liveness))
        .route("/health/readiness", axum::routing::get(readiness));

    Router::new().merge(health).merge(api)
}

/// Liveness check: always returns 200 if the process is running.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness check: the stores are in memory, so the service is ready as
/// soon as it is listening.
async fn readiness() -> &'static str {
    "ready"
}
