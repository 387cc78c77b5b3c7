//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → tls.rs (TLS handshake on the encrypted listener)
//!     → Hand off to HTTP layer, tagged Encrypted
//!
//! Plaintext listener
//!     → Hand off to HTTP layer, tagged Plaintext (refused by the transport gate)
//! ```

pub mod tls;
