//! Shared utilities for integration tests.
#![allow(dead_code)]

use apikey_gate::config::GateConfig;
use apikey_gate::handlers::default_routes;
use apikey_gate::GateServer;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request};
use axum::response::Response;

pub const KEY: &str = "iL0UCJtAwwq8nVjvUJoVkM9CjFhyycLp";

/// Config with the sample key and no listeners bound.
pub fn test_config() -> GateConfig {
    let mut config = GateConfig::default();
    config.auth.api_key = KEY.to_string();
    config.listener.plaintext_address = None;
    config
}

/// Server with the application's own routes.
pub fn test_server(config: GateConfig) -> GateServer {
    GateServer::new(config, default_routes().unwrap()).unwrap()
}

/// GET request, optionally carrying the key header.
pub fn get(path: &str, key: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(path);
    if let Some(key) = key {
        builder = builder.header("ApiKey", key);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
