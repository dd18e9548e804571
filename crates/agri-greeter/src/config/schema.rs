use std::net::SocketAddr;

use serde::Deserialize;
use agri_core::error::{AgriError, Result};
use agri_core::metrics::{validate_buckets, DEFAULT_LATENCY_BUCKETS};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GreeterConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub metrics: MetricsSection,
}

impl Default for GreeterConfig {
    fn default() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            metrics: MetricsSection::default(),
        }
    }
}

impl GreeterConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(AgriError::UnsupportedVersion(self.version));
        }
        self.server.listen_addr()?;
        validate_buckets(&self.metrics.latency_buckets)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl ServerSection {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            AgriError::Config(format!("server.listen must be a valid SocketAddr ({}): {e}", self.listen))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Histogram upper bounds in seconds.
    #[serde(default = "default_latency_buckets")]
    pub latency_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            latency_buckets: default_latency_buckets(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_latency_buckets() -> Vec<f64> {
    DEFAULT_LATENCY_BUCKETS.to_vec()
}
