//! Greeter HTTP endpoints.
//!
//! - `/`        : greeting (liveness)
//! - `/metrics` : Prometheus text format

use agri_core::metrics::CONTENT_TYPE;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::app_state::AppState;

pub const GREETING: &str = "Agri Digital Platform is running!";

pub async fn home() -> &'static str {
    GREETING
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let body = state.metrics().render();

    (StatusCode::OK, [(header::CONTENT_TYPE, CONTENT_TYPE)], body).into_response()
}

/// Unmatched routes: bare 404, no body.
pub async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}
