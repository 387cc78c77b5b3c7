//! Pre-shared key authorization subsystem.
//!
//! # Data Flow
//! ```text
//! Protected route matched
//!     → validator.rs (read key header)
//!     → key_source.rs (current trusted key)
//!     → exact comparison → pass or 401
//! ```
//!
//! # Design Decisions
//! - Key source injected at wiring time, swappable behind a trait
//! - Neither the trusted nor the presented key is ever logged
//! - Missing and wrong keys produce the same response

pub mod key_source;
pub mod validator;

pub use key_source::{KeySource, StaticKeySource};
pub use validator::{KeyValidator, API_KEY_HEADER};
