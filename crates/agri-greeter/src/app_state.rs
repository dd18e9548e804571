//! Shared application state for the greeter service.

use std::sync::Arc;

use agri_core::error::Result;
use agri_core::MetricsRegistry;

use crate::config::GreeterConfig;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
    metrics: Arc<MetricsRegistry>,
}

struct AppStateInner {
    cfg: GreeterConfig,
}

impl AppState {
    /// Build application state, constructing the metrics registry from config.
    pub fn new(cfg: GreeterConfig) -> Result<Self> {
        let metrics = MetricsRegistry::with_latency_buckets(cfg.metrics.latency_buckets.clone())?;
        Ok(Self::with_metrics(cfg, Arc::new(metrics)))
    }

    /// Build state around an existing registry, so callers can inspect it.
    pub fn with_metrics(cfg: GreeterConfig, metrics: Arc<MetricsRegistry>) -> Self {
        Self {
            inner: Arc::new(AppStateInner { cfg }),
            metrics,
        }
    }

    pub fn cfg(&self) -> &GreeterConfig {
        &self.inner.cfg
    }

    pub fn metrics(&self) -> Arc<MetricsRegistry> {
        Arc::clone(&self.metrics)
    }
}
