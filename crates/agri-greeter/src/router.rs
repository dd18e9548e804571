//! Axum router wiring.
//!
//! Routes are wrapped, from the inside out, by panic recovery (handler faults
//! become 500s) and the request instrumentation middleware, so recovered
//! errors and 404s are counted and timed like any other exchange.

use axum::{middleware, routing::get, Router};
use tower_http::catch_panic::CatchPanicLayer;

use crate::{app_state::AppState, obs, ops};

pub fn build_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/", get(ops::home))
        .route("/metrics", get(ops::metrics));

    with_instrumentation(routes, state)
}

/// Add the 404 fallback, panic recovery and instrumentation to `routes`.
pub fn with_instrumentation(routes: Router<AppState>, state: AppState) -> Router {
    routes
        .fallback(ops::not_found)
        .layer(CatchPanicLayer::new())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            obs::track_requests,
        ))
        .with_state(state)
}
