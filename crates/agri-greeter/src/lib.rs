//! Agri greeter service library entry.
//!
//! A liveness/greeting endpoint plus Prometheus metrics, with every exchange
//! wrapped by the request instrumentation middleware. Consumed by the binary
//! (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod config;
pub mod obs;
pub mod ops;
pub mod router;
