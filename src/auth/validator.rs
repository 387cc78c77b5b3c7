//! API key validation for protected routes.

use std::fmt;
use std::sync::Arc;

use axum::http::{HeaderMap, HeaderName};

use crate::auth::key_source::KeySource;
use crate::error::Rejection;

/// Default header carrying the key.
pub const API_KEY_HEADER: &str = "ApiKey";

/// Compares the key header of a request against a [`KeySource`].
///
/// The source is handed in at construction; the validator never looks it up
/// per request.
#[derive(Clone)]
pub struct KeyValidator {
    source: Arc<dyn KeySource>,
    header: HeaderName,
}

impl KeyValidator {
    pub fn new(source: Arc<dyn KeySource>, header: HeaderName) -> Self {
        Self { source, header }
    }

    /// Validator reading the default `ApiKey` header.
    pub fn with_default_header(source: Arc<dyn KeySource>) -> Self {
        Self::new(source, HeaderName::from_static("apikey"))
    }

    pub fn header(&self) -> &HeaderName {
        &self.header
    }

    /// Exact, case-sensitive comparison of the first header value.
    // TODO: swap to a constant-time compare once a hardened mode is configurable.
    pub fn validate(&self, headers: &HeaderMap) -> Result<(), Rejection> {
        let presented = match headers.get(&self.header) {
            Some(value) if !value.is_empty() => value,
            _ => return Err(Rejection::MissingKey),
        };

        if presented.as_bytes() == self.source.current_key().as_bytes() {
            Ok(())
        } else {
            Err(Rejection::InvalidKey)
        }
    }
}

impl fmt::Debug for KeyValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyValidator")
            .field("header", &self.header)
            .finish_non_exhaustive()
    }
}
