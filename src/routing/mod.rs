//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → registry.rs (route lookup)
//!     → Return: matched Route (handler + protection flag),
//!       MethodNotAllowed, or NotFound
//!
//! Route Registration (at startup):
//!     register(path, method, handler, protected)
//!     → Freeze as immutable registry
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - Protection is per-route data, consulted by dispatch
//! - Deterministic: same input always matches same route

pub mod registry;

pub use registry::{BoxedHandler, RegistryError, Resolution, Route, RouteRegistry};
