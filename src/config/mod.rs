//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GateConfig (validated, immutable)
//!     → consumed once at wiring time
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the trusted key lives for the process
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AuthConfig, GateConfig, ListenerConfig, LogFormat, ObservabilityConfig, TimeoutConfig,
    TlsConfig, TransportConfig,
};
pub use validation::{can_accept_encrypted, validate_config, ValidationError};
