//! Status endpoints.
//!
//! - `/health` : `{"status":"ok"}`
//! - `/`       : service name and version

use axum::Json;
use serde::Serialize;

pub const SERVICE_NAME: &str = "python-agri-devops-platform";
pub const SERVICE_VERSION: &str = "0.1";

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub service: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME,
        version: SERVICE_VERSION,
    })
}
