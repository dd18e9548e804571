//! Agri platform core: the shared error surface and the in-process metrics
//! registry used by the HTTP services.
//!
//! This crate carries no transport or runtime dependencies, so the registry
//! can be constructed and driven directly in tests without a network layer.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Instrumentation faults are logged and dropped; they never reach a caller.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod metrics;

/// Shared result type.
pub use error::{AgriError, Result};
pub use metrics::{HistogramSnapshot, MetricsRegistry};
