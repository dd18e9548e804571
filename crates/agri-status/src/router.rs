//! Axum router wiring for the status service.

use axum::{routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::ops;

pub fn build_router() -> Router {
    Router::new()
        .route("/", get(ops::info))
        .route("/health", get(ops::health))
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
}
