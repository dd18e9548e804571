//! Shared error type across agri crates.

use thiserror::Error;

/// Shared result type.
pub type Result<T> = std::result::Result<T, AgriError>;

/// Startup and configuration errors.
///
/// Request handling never produces one of these: routing misses are plain
/// 404s and handler faults are turned into 500s by the HTTP stack.
#[derive(Debug, Error)]
pub enum AgriError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u32),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}
