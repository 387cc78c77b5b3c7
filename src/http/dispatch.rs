//! Request dispatch.
//! Resolves the route, runs the key validator for protected routes, then
//! invokes the handler.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};

use crate::auth::KeyValidator;
use crate::http::request::RequestIdExt;
use crate::observability::metrics;
use crate::routing::{Resolution, RouteRegistry};

/// State shared by every dispatch. Read-only after wiring.
#[derive(Clone)]
pub struct DispatchState {
    pub registry: Arc<RouteRegistry>,
    pub validator: Arc<KeyValidator>,
}

pub async fn dispatch(State(state): State<DispatchState>, req: Request<Body>) -> Response {
    let start_time = Instant::now();
    let method = req.method().clone();
    let method_str = method.to_string();
    let path = req.uri().path().to_string();

    let route = match state.registry.resolve(&method, &path) {
        Resolution::Matched(route) => route,
        Resolution::MethodNotAllowed(allowed) => {
            tracing::debug!(request_id = %req.request_id(), method = %method, path = %path, "Method not allowed");
            metrics::record_request(&method_str, 405, "none", start_time);

            let allow = allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            let mut response = StatusCode::METHOD_NOT_ALLOWED.into_response();
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
            return response;
        }
        Resolution::NotFound => {
            tracing::debug!(request_id = %req.request_id(), method = %method, path = %path, "No route matched");
            metrics::record_request(&method_str, 404, "none", start_time);
            return (StatusCode::NOT_FOUND, "Not Found").into_response();
        }
    };

    if route.is_protected() {
        if let Err(rejection) = state.validator.validate(req.headers()) {
            tracing::warn!(
                request_id = %req.request_id(),
                method = %method,
                path = %path,
                reason = rejection.kind(),
                "Rejected unauthorized request"
            );
            metrics::record_rejection(rejection);
            return rejection.into_response();
        }
    }

    tracing::debug!(
        request_id = %req.request_id(),
        method = %method,
        route = %route.path(),
        protected = route.is_protected(),
        "Dispatching request"
    );

    let response = route.call(req).await;
    metrics::record_request(&method_str, response.status().as_u16(), route.path(), start_time);
    response
}
