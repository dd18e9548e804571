//! Greeter config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use agri_core::error::{AgriError, Result};

pub use schema::{GreeterConfig, MetricsSection, ServerSection};

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "agri-greeter.yaml";

pub fn load_from_file(path: &str) -> Result<GreeterConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| AgriError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<GreeterConfig> {
    let cfg: GreeterConfig = serde_yaml::from_str(s)
        .map_err(|e| AgriError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` when it exists, otherwise fall back to built-in defaults.
pub fn load_or_default(path: &str) -> Result<GreeterConfig> {
    if Path::new(path).exists() {
        tracing::info!(%path, "loading config");
        load_from_file(path)
    } else {
        tracing::info!(%path, "no config file, using defaults");
        Ok(GreeterConfig::default())
    }
}
