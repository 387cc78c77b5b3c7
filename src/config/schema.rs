//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gate.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::auth::API_KEY_HEADER;

/// Root configuration for the gate.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GateConfig {
    /// Listener configuration (bind addresses, TLS).
    pub listener: ListenerConfig,

    /// Trusted key and the header it is presented in.
    pub auth: AuthConfig,

    /// Transport detection settings.
    pub transport: TransportConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl GateConfig {
    /// Copy of this config that is safe to print or log.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        config.auth.api_key = "<redacted>".to_string();
        config
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address of the encrypted listener (e.g., "0.0.0.0:8443").
    /// Only bound when `tls` is set.
    pub bind_address: String,

    /// Optional plaintext listener. Every request on it is refused by the
    /// transport gate unless forwarded-proto trust is enabled.
    pub plaintext_address: Option<String>,

    /// Maximum requests in flight across the pipeline (backpressure).
    pub max_connections: usize,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8443".to_string(),
            plaintext_address: Some("0.0.0.0:8080".to_string()),
            max_connections: 10_000,
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// Pre-shared key configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Request header carrying the key.
    pub header_name: String,

    /// The trusted key.
    pub api_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header_name: API_KEY_HEADER.to_string(),
            // WARNING: This is a well-known sample key! Change this in production.
            api_key: "iL0UCJtAwwq8nVjvUJoVkM9CjFhyycLp".to_string(),
        }
    }
}

/// Transport detection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TransportConfig {
    /// Honour `X-Forwarded-Proto` set by a TLS-terminating proxy in front of
    /// the plaintext listener. Never enable this when clients can reach the
    /// plaintext listener directly.
    pub trust_forwarded_proto: bool,
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,

    /// Time in-flight requests get to finish after shutdown is triggered.
    pub shutdown_grace_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request_secs: 30,
            shutdown_grace_secs: 10,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_toml_uses_defaults() {
        let config: GateConfig = toml::from_str("").unwrap();
        assert_eq!(config.auth.header_name, "ApiKey");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(config.listener.tls.is_none());
        assert!(!config.transport.trust_forwarded_proto);
    }

    #[test]
    fn test_partial_sections() {
        let config: GateConfig = toml::from_str(
            r#"
            [auth]
            api_key = "s3cret"

            [listener.tls]
            cert_path = "certs/server.pem"
            key_path = "certs/server.key"

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.auth.api_key, "s3cret");
        assert_eq!(config.auth.header_name, "ApiKey");
        assert_eq!(config.listener.bind_address, "0.0.0.0:8443");
        assert_eq!(
            config.listener.tls.as_ref().map(|t| t.key_path.as_str()),
            Some("certs/server.key")
        );
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn test_redacted_hides_key() {
        let config = GateConfig::default();
        let printed = toml::to_string(&config.redacted()).unwrap();
        assert!(!printed.contains(&config.auth.api_key));
        assert!(printed.contains("<redacted>"));
    }
}
