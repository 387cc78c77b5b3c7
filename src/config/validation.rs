//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Check the key header is a legal HTTP header name
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GateConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderName;

use crate::config::schema::GateConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("auth.api_key must not be empty")]
    EmptyApiKey,

    #[error("auth.header_name {0:?} is not a valid HTTP header name")]
    InvalidHeaderName(String),

    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("listener.tls.{0} must not be empty")]
    EmptyTlsPath(&'static str),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &GateConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.auth.api_key.is_empty() {
        errors.push(ValidationError::EmptyApiKey);
    }
    if HeaderName::from_bytes(config.auth.header_name.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidHeaderName(
            config.auth.header_name.clone(),
        ));
    }

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if let Some(addr) = &config.listener.plaintext_address {
        check_address(&mut errors, "listener.plaintext_address", addr);
    }
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.listener.max_connections == 0 {
        errors.push(ValidationError::Zero("listener.max_connections"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True when some request could pass the transport gate: either an encrypted
/// listener exists or a TLS-terminating proxy is trusted.
pub fn can_accept_encrypted(config: &GateConfig) -> bool {
    config.listener.tls.is_some() || config.transport.trust_forwarded_proto
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
