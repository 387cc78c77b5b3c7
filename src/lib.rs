//! Pre-shared key gate for HTTP APIs.
//!
//! Rejects plaintext traffic with 403 and requests to protected routes that
//! lack the trusted key with 401, before any handler runs.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod transport;

pub use auth::{KeySource, KeyValidator, StaticKeySource};
pub use config::GateConfig;
pub use error::Rejection;
pub use http::GateServer;
pub use lifecycle::Shutdown;
pub use routing::RouteRegistry;
pub use transport::Transport;
