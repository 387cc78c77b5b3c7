//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (request ID, tracing, timeout, limits, transport gate)
//! - Tag each listener's requests with their transport
//! - Serve TLS and plaintext listeners until shutdown

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::HeaderName,
    middleware,
    routing::any,
    Extension, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinSet;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::auth::{KeySource, KeyValidator, StaticKeySource};
use crate::config::{can_accept_encrypted, GateConfig};
use crate::http::dispatch::{dispatch, DispatchState};
use crate::http::request::{UuidRequestId, X_REQUEST_ID};
use crate::net::tls::load_tls_config;
use crate::routing::RouteRegistry;
use crate::transport::{transport_gate, Transport, TransportGate};

/// Error type for server setup and serving.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("{field} {value:?} is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("key header {0:?} is not a valid HTTP header name")]
    InvalidHeaderName(String),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TLS setup failed: {0}")]
    Tls(#[source] std::io::Error),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("no listener configured: set listener.tls or listener.plaintext_address")]
    NoListener,
}

/// The gated HTTP server.
pub struct GateServer {
    router: Router,
    config: GateConfig,
}

impl GateServer {
    /// Build the server with the configured static key.
    pub fn new(config: GateConfig, registry: RouteRegistry) -> Result<Self, ServerError> {
        let source = Arc::new(StaticKeySource::new(config.auth.api_key.clone()));
        Self::with_key_source(config, registry, source)
    }

    /// Build the server around any key source.
    pub fn with_key_source(
        config: GateConfig,
        registry: RouteRegistry,
        source: Arc<dyn KeySource>,
    ) -> Result<Self, ServerError> {
        let header = HeaderName::from_bytes(config.auth.header_name.as_bytes())
            .map_err(|_| ServerError::InvalidHeaderName(config.auth.header_name.clone()))?;
        let validator = KeyValidator::new(source, header);
        tracing::info!(key_header = %validator.header(), "Key validator ready");

        for route in registry.routes() {
            tracing::info!(
                method = %route.method(),
                path = %route.path(),
                protected = route.is_protected(),
                "Route registered"
            );
        }
        if !can_accept_encrypted(&config) {
            tracing::warn!(
                "No TLS listener and X-Forwarded-Proto untrusted: every request will be refused"
            );
        }

        let state = DispatchState {
            registry: Arc::new(registry),
            validator: Arc::new(validator),
        };
        let router = Self::build_router(&config, state);

        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Outermost first: request ID, trace, timeout, concurrency limit,
    /// transport gate, then dispatch (which runs the key validator).
    #[allow(deprecated)]
    fn build_router(config: &GateConfig, state: DispatchState) -> Router {
        let gate = TransportGate::new(config.transport.trust_forwarded_proto);

        Router::new()
            .route("/", any(dispatch))
            .route("/{*path}", any(dispatch))
            .with_state(state)
            .layer(middleware::from_fn_with_state(gate, transport_gate))
            .layer(GlobalConcurrencyLimitLayer::new(config.listener.max_connections))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, UuidRequestId))
    }

    /// The assembled pipeline, without a transport marker.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The pipeline as served on a listener of the given transport.
    pub fn router_for(&self, transport: Transport) -> Router {
        self.router.clone().layer(Extension(transport))
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Serve every configured listener until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) -> Result<(), ServerError> {
        let grace = Duration::from_secs(self.config.timeouts.shutdown_grace_secs);
        let tls_handle = axum_server::Handle::new();
        let mut tasks = JoinSet::new();

        if let Some(tls) = &self.config.listener.tls {
            let addr = parse_addr("listener.bind_address", &self.config.listener.bind_address)?;
            let rustls = load_tls_config(Path::new(&tls.cert_path), Path::new(&tls.key_path))
                .await
                .map_err(ServerError::Tls)?;
            let app = self.router_for(Transport::Encrypted).into_make_service();
            let handle = tls_handle.clone();

            tracing::info!(address = %addr, "TLS listener starting");
            tasks.spawn(async move {
                axum_server::bind_rustls(addr, rustls)
                    .handle(handle)
                    .serve(app)
                    .await
                    .map_err(ServerError::from)
            });
        }

        if let Some(address) = &self.config.listener.plaintext_address {
            let listener = TcpListener::bind(address)
                .await
                .map_err(|source| ServerError::Bind {
                    address: address.clone(),
                    source,
                })?;
            let app = self.router_for(Transport::Plaintext);
            let mut stop = shutdown.resubscribe();

            tracing::info!(address = %listener.local_addr()?, "Plaintext listener starting");
            tasks.spawn(async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(async move {
                        let _ = stop.recv().await;
                    })
                    .await
                    .map_err(ServerError::from)
            });
        }

        if tasks.is_empty() {
            return Err(ServerError::NoListener);
        }

        loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    tracing::info!(grace_secs = grace.as_secs(), "Draining listeners");
                    tls_handle.graceful_shutdown(Some(grace));
                    break;
                }
                joined = tasks.join_next() => match joined {
                    Some(result) => {
                        // Listener errors are fatal; a clean early exit leaves the others serving.
                        result??;
                        tracing::warn!("Listener stopped before shutdown");
                    }
                    None => return Ok(()),
                },
            }
        }

        // The grace period bounds the drain of every listener, not just TLS.
        let drain = async {
            while let Some(result) = tasks.join_next().await {
                result??;
            }
            Ok::<(), ServerError>(())
        };
        let drained = tokio::time::timeout(grace, drain).await;
        match drained {
            Ok(result) => result?,
            Err(_) => {
                tracing::warn!(
                    grace_secs = grace.as_secs(),
                    "Grace period elapsed, abandoning in-flight requests"
                );
                tasks.shutdown().await;
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn parse_addr(field: &'static str, value: &str) -> Result<SocketAddr, ServerError> {
    value.parse().map_err(|_| ServerError::InvalidAddress {
        field,
        value: value.to_string(),
    })
}
