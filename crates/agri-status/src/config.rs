//! Status service config (strict parsing, optional file).

use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use agri_core::error::{AgriError, Result};
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "agri-status.yaml";

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusConfig {
    pub version: u32,

    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            version: 1,
            listen: default_listen(),
        }
    }
}

impl StatusConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AgriError::UnsupportedVersion(self.version));
        }
        self.listen_addr()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            AgriError::Config(format!("listen must be a valid SocketAddr ({}): {e}", self.listen))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

pub fn load_from_str(s: &str) -> Result<StatusConfig> {
    let cfg: StatusConfig = serde_yaml::from_str(s)
        .map_err(|e| AgriError::Config(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load `path` when it exists, otherwise fall back to built-in defaults.
pub fn load_or_default(path: &str) -> Result<StatusConfig> {
    if !Path::new(path).exists() {
        tracing::info!(%path, "no config file, using defaults");
        return Ok(StatusConfig::default());
    }
    let s = fs::read_to_string(path)
        .map_err(|e| AgriError::Config(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}
