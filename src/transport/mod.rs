//! Transport enforcement subsystem.
//!
//! # Data Flow
//! ```text
//! Listener (TLS or plaintext)
//!     → tags request with a Transport marker (extension)
//!     → gate.rs (classify, reject plaintext with 403)
//!     → Pass to dispatch
//! ```
//!
//! # Design Decisions
//! - Runs before any key check: a key sent in the clear is already leaked
//! - Fail closed: an untagged request with no usable evidence is plaintext
//! - Forwarded headers ignored unless explicitly trusted

pub mod gate;

pub use gate::{transport_gate, TransportGate};

/// How a request reached the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Encrypted,
    Plaintext,
}

impl Transport {
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Transport::Encrypted)
    }
}
