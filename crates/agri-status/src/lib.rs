//! Agri status service: health and version reporting over JSON.
//!
//! Independent of the greeter; it carries no request metrics.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod config;
pub mod ops;
pub mod router;
