//! Request instrumentation middleware.
//!
//! Every exchange, the 404 fallback included, passes through three hooks:
//! - `before_request`: start a [`RequestTimer`] for (method, path)
//! - `after_request`: count the final response by (method, path, status)
//! - `teardown_request`: commit one latency observation
//!
//! The timer is a plain value threaded from hook to hook. A timer dropped
//! without being stopped (the request future was cancelled mid-flight)
//! commits on drop, so each request yields exactly one observation.
//! Nothing here can alter the status or body of the response.

use std::sync::Arc;
use std::time::{Duration, Instant};

use agri_core::MetricsRegistry;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::app_state::AppState;

/// Per-request timing context for one (method, path) pair.
pub struct RequestTimer {
    registry: Arc<MetricsRegistry>,
    method: String,
    path: String,
    start: Instant,
    committed: bool,
}

impl RequestTimer {
    pub fn start(
        registry: Arc<MetricsRegistry>,
        method: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            method: method.into(),
            path: path.into(),
            start: Instant::now(),
            committed: false,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Commit the latency observation and return the recorded duration.
    pub fn stop(mut self) -> Duration {
        self.commit()
    }

    fn commit(&mut self) -> Duration {
        let elapsed = self.start.elapsed();
        if !self.committed {
            self.committed = true;
            self.registry
                .observe_latency(&self.method, &self.path, elapsed.as_secs_f64());
        }
        elapsed
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        if !self.committed {
            self.commit();
        }
    }
}

/// Pre-handler hook.
pub fn before_request(registry: Arc<MetricsRegistry>, req: &Request) -> RequestTimer {
    RequestTimer::start(registry, req.method().as_str(), req.uri().path())
}

/// Post-handler hook: sees the final response, success or error.
pub fn after_request(timer: &RequestTimer, res: &Response) {
    timer
        .registry
        .increment_counter(&timer.method, &timer.path, res.status().as_u16());
}

/// Teardown hook: runs last, exactly once.
pub fn teardown_request(timer: RequestTimer) -> Duration {
    timer.stop()
}

/// Axum middleware running the three hooks around the inner service.
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let timer = before_request(state.metrics(), &req);

    let res = next.run(req).await;
    after_request(&timer, &res);

    let method = timer.method().to_owned();
    let path = timer.path().to_owned();
    let elapsed = teardown_request(timer);

    tracing::debug!(
        %method,
        %path,
        status = res.status().as_u16(),
        elapsed_ms = elapsed.as_secs_f64() * 1e3,
        "request completed"
    );
    res
}
