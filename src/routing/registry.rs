//! Route registration and lookup.
//!
//! # Responsibilities
//! - Store (method, path) → handler bindings with a protection flag
//! - Look up the route for a request
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after wiring (shared via Arc without locks)
//! - Exact path match; one trailing slash is ignored
//! - HEAD falls back to the GET route
//! - Explicit NotFound / MethodNotAllowed rather than silent default

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use futures_util::future::{BoxFuture, FutureExt};

/// Type-erased endpoint handler.
pub type BoxedHandler = Arc<dyn Fn(Request<Body>) -> BoxFuture<'static, Response> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("route {method} {path} is already registered")]
    Duplicate { method: Method, path: String },

    #[error("route path {0:?} must start with '/' and contain no query or fragment")]
    InvalidPath(String),
}

/// A registered endpoint.
#[derive(Clone)]
pub struct Route {
    path: String,
    method: Method,
    protected: bool,
    handler: BoxedHandler,
}

impl Route {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Whether the key validator must approve requests to this route.
    pub fn is_protected(&self) -> bool {
        self.protected
    }

    /// Invoke the handler.
    pub async fn call(&self, req: Request<Body>) -> Response {
        (self.handler)(req).await
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("protected", &self.protected)
            .finish_non_exhaustive()
    }
}

/// Result of a lookup.
#[derive(Debug)]
pub enum Resolution<'a> {
    Matched(&'a Route),
    /// The path exists but not for this method; carries the methods that do.
    MethodNotAllowed(Vec<Method>),
    NotFound,
}

/// Table of endpoints, built once at startup.
#[derive(Default, Clone)]
pub struct RouteRegistry {
    routes: HashMap<String, Vec<Route>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `handler` to `method` + `path`. When `protected` is set, dispatch
    /// runs the key validator before the handler.
    pub fn register<H, Fut, R>(
        &mut self,
        path: &str,
        method: Method,
        handler: H,
        protected: bool,
    ) -> Result<(), RegistryError>
    where
        H: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = R> + Send + 'static,
        R: IntoResponse + 'static,
    {
        if !path.starts_with('/') || path.contains(['?', '#']) {
            return Err(RegistryError::InvalidPath(path.to_string()));
        }
        let path = normalize_path(path).to_string();

        let entries = self.routes.entry(path.clone()).or_default();
        if entries.iter().any(|r| r.method == method) {
            return Err(RegistryError::Duplicate { method, path });
        }

        let handler: BoxedHandler =
            Arc::new(move |req| handler(req).map(IntoResponse::into_response).boxed());

        entries.push(Route {
            path,
            method,
            protected,
            handler,
        });
        Ok(())
    }

    /// Find the route for a request method and path.
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution<'_> {
        let Some(entries) = self.routes.get(normalize_path(path)) else {
            return Resolution::NotFound;
        };

        if let Some(route) = entries.iter().find(|r| r.method == *method) {
            return Resolution::Matched(route);
        }
        if *method == Method::HEAD {
            if let Some(route) = entries.iter().find(|r| r.method == Method::GET) {
                return Resolution::Matched(route);
            }
        }

        let mut allowed: Vec<Method> = entries.iter().map(|r| r.method.clone()).collect();
        if allowed.contains(&Method::GET) && !allowed.contains(&Method::HEAD) {
            allowed.push(Method::HEAD);
        }
        Resolution::MethodNotAllowed(allowed)
    }

    /// All registered routes, in no particular order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for RouteRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.routes()).finish()
    }
}

fn normalize_path(path: &str) -> &str {
    match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    }
}
