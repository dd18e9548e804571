//! Request observability for the greeter.
//!
//! Counters and histograms live in `agri_core::MetricsRegistry`; this module
//! only wires them into the HTTP request lifecycle.

pub mod instrument;

pub use instrument::{after_request, before_request, teardown_request, track_requests, RequestTimer};
