//! Application endpoints.

use axum::{
    body::Body,
    http::{Method, Request},
    Json,
};
use serde::Serialize;

use crate::routing::{RegistryError, RouteRegistry};

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn greeting(_req: Request<Body>) -> Json<&'static str> {
    Json("Hello World!")
}

pub async fn health(_req: Request<Body>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// The service's endpoint table.
pub fn default_routes() -> Result<RouteRegistry, RegistryError> {
    let mut registry = RouteRegistry::new();
    registry.register("/api/greeting", Method::GET, greeting, true)?;
    registry.register("/health", Method::GET, health, false)?;
    Ok(registry)
}
