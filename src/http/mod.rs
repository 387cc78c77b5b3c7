//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS / plaintext connection
//!     → server.rs (Axum setup, listener transport tag)
//!     → request.rs (request ID)
//!     → transport gate (403 on plaintext)
//!     → dispatch.rs (resolve route → key validator if protected → handler)
//!     → Send to client
//! ```

pub mod dispatch;
pub mod request;
pub mod server;

pub use dispatch::{dispatch, DispatchState};
pub use request::{RequestIdExt, UuidRequestId, X_REQUEST_ID};
pub use server::{GateServer, ServerError};
