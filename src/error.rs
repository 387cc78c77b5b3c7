//! Gate rejections.
//!
//! Both kinds are routine outcomes of untrusted input, never process errors.
//! Each maps to a terminal response; nothing downstream runs after one.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Why a gate refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The request did not arrive over an encrypted transport.
    #[error("SSL Required")]
    TransportRequired,

    /// The key header was absent or empty.
    #[error("missing api key")]
    MissingKey,

    /// The key header did not equal the trusted key.
    #[error("invalid api key")]
    InvalidKey,
}

impl Rejection {
    /// Status code sent to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Rejection::TransportRequired => StatusCode::FORBIDDEN,
            Rejection::MissingKey | Rejection::InvalidKey => StatusCode::UNAUTHORIZED,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::TransportRequired => "transport_required",
            Rejection::MissingKey => "missing_key",
            Rejection::InvalidKey => "invalid_key",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        // Missing and wrong keys look the same on the wire.
        let body = match self {
            Rejection::TransportRequired => "SSL Required",
            Rejection::MissingKey | Rejection::InvalidKey => "Unauthorized",
        };
        (self.status(), body).into_response()
    }
}
