//! Transport gate middleware.
//! Refuses requests that did not arrive over TLS.

use axum::{
    body::Body,
    extract::State,
    http::{header::HeaderName, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::Rejection;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::transport::Transport;

pub const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Stateless transport check, cloned into every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransportGate {
    trust_forwarded_proto: bool,
}

impl TransportGate {
    pub fn new(trust_forwarded_proto: bool) -> Self {
        Self {
            trust_forwarded_proto,
        }
    }

    /// Decide the transport a request arrived on.
    ///
    /// A TLS listener's marker wins. Next comes `X-Forwarded-Proto` (only when
    /// trusted), then a plaintext listener's marker, then an absolute-form
    /// request URI. Anything else is plaintext.
    pub fn classify<B>(&self, req: &Request<B>) -> Transport {
        let marker = req.extensions().get::<Transport>().copied();
        if marker == Some(Transport::Encrypted) {
            return Transport::Encrypted;
        }

        if self.trust_forwarded_proto {
            if let Some(proto) = req
                .headers()
                .get(&X_FORWARDED_PROTO)
                .and_then(|v| v.to_str().ok())
            {
                // Comma-separated when several proxies appended; the first is the client hop.
                let first = proto.split(',').next().unwrap_or_default().trim();
                return if first.eq_ignore_ascii_case("https") {
                    Transport::Encrypted
                } else {
                    Transport::Plaintext
                };
            }
        }

        if marker == Some(Transport::Plaintext) {
            return Transport::Plaintext;
        }

        match req.uri().scheme_str() {
            Some(scheme) if scheme.eq_ignore_ascii_case("https") => Transport::Encrypted,
            _ => Transport::Plaintext,
        }
    }

    /// Pass encrypted requests, refuse everything else.
    pub fn check<B>(&self, req: &Request<B>) -> Result<(), Rejection> {
        if self.classify(req).is_encrypted() {
            Ok(())
        } else {
            Err(Rejection::TransportRequired)
        }
    }
}

pub async fn transport_gate(
    State(gate): State<TransportGate>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if let Err(rejection) = gate.check(&req) {
        tracing::warn!(
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.uri().path(),
            reason = rejection.kind(),
            "Rejected plaintext request"
        );
        metrics::record_rejection(rejection);
        return rejection.into_response();
    }

    next.run(req).await
}
