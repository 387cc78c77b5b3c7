//! Pipeline tests: the full middleware stack driven in-process.

use std::borrow::Cow;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use apikey_gate::auth::KeySource;
use apikey_gate::http::X_REQUEST_ID;
use apikey_gate::routing::RouteRegistry;
use apikey_gate::{GateServer, Transport};
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use tower::ServiceExt;

mod common;
use common::{body_string, get, test_config, test_server, KEY};

#[tokio::test]
async fn plaintext_greeting_is_forbidden() {
    let app = test_server(test_config()).router_for(Transport::Plaintext);

    let response = app.oneshot(get("/api/greeting", Some(KEY))).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_string(response).await, "SSL Required");
}

#[tokio::test]
async fn encrypted_greeting_with_key_succeeds() {
    let app = test_server(test_config()).router_for(Transport::Encrypted);

    let response = app.oneshot(get("/api/greeting", Some(KEY))).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "\"Hello World!\"");
}

#[tokio::test]
async fn encrypted_greeting_with_wrong_key_is_unauthorized() {
    let app = test_server(test_config()).router_for(Transport::Encrypted);

    let response = app
        .oneshot(get("/api/greeting", Some("wrong-value")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn encrypted_greeting_without_key_is_unauthorized() {
    let app = test_server(test_config()).router_for(Transport::Encrypted);

    let response = app.oneshot(get("/api/greeting", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_string(response).await, "Unauthorized");
}

#[tokio::test]
async fn encrypted_unprotected_endpoint_needs_no_key() {
    let app = test_server(test_config()).router_for(Transport::Encrypted);

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn plaintext_is_forbidden_regardless_of_route() {
    let server = test_server(test_config());

    for path in ["/health", "/api/greeting", "/does-not-exist"] {
        for key in [None, Some(KEY), Some("wrong")] {
            let response = server
                .router_for(Transport::Plaintext)
                .oneshot(get(path, key))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::FORBIDDEN, "{path} {key:?}");
        }
    }
}

#[tokio::test]
async fn untagged_router_fails_closed() {
    let app = test_server(test_config()).router();

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn forwarded_proto_honoured_only_when_trusted() {
    let request = || {
        Request::builder()
            .uri("/api/greeting")
            .header("X-Forwarded-Proto", "https")
            .header("ApiKey", KEY)
            .body(Body::empty())
            .unwrap()
    };

    let untrusted = test_server(test_config()).router_for(Transport::Plaintext);
    let response = untrusted.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut config = test_config();
    config.transport.trust_forwarded_proto = true;
    let behind_proxy = test_server(config);
    let response = behind_proxy
        .router_for(Transport::Plaintext)
        .oneshot(request())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = behind_proxy.router().oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let untrusted = test_server(test_config()).router();
    let response = untrusted.oneshot(request()).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_path_and_method() {
    let server = test_server(test_config());

    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(get("/nope", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let request = Request::builder()
        .method(Method::DELETE)
        .uri("/api/greeting")
        .header("ApiKey", KEY)
        .body(Body::empty())
        .unwrap();
    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn request_id_is_generated_and_preserved() {
    let server = test_server(test_config());

    let response = server
        .router_for(Transport::Plaintext)
        .oneshot(get("/health", None))
        .await
        .unwrap();
    let generated = response.headers().get(&X_REQUEST_ID).unwrap();
    assert!(!generated.is_empty());

    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "client-chosen")
        .body(Body::empty())
        .unwrap();
    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.headers()[&X_REQUEST_ID], "client-chosen");
}

#[tokio::test]
async fn custom_key_header() {
    let mut config = test_config();
    config.auth.header_name = "X-Api-Key".into();
    let server = test_server(config);
    assert_eq!(server.config().auth.header_name, "X-Api-Key");

    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(get("/api/greeting", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/greeting")
        .header("X-Api-Key", KEY)
        .body(Body::empty())
        .unwrap();
    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(request)
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// Stand-in for a key held in external storage.
struct RotatingStore {
    reads: AtomicUsize,
}

impl KeySource for RotatingStore {
    fn current_key(&self) -> Cow<'_, str> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Cow::Borrowed("from-store")
    }
}

#[tokio::test]
async fn key_source_is_swappable() {
    let store = Arc::new(RotatingStore {
        reads: AtomicUsize::new(0),
    });
    let mut registry = RouteRegistry::new();
    registry
        .register("/vault", Method::GET, |_| async { "opened" }, true)
        .unwrap();
    let server = GateServer::with_key_source(test_config(), registry, store.clone()).unwrap();

    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(get("/vault", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(get("/vault", Some("from-store")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "opened");
    assert_eq!(store.reads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn handler_never_runs_for_rejected_requests() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let mut registry = RouteRegistry::new();
    registry
        .register(
            "/count",
            Method::GET,
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                async { StatusCode::NO_CONTENT }
            },
            true,
        )
        .unwrap();
    let server = GateServer::new(test_config(), registry).unwrap();

    let rejected = [
        (Transport::Plaintext, Some(KEY)),
        (Transport::Encrypted, None),
        (Transport::Encrypted, Some("")),
        (Transport::Encrypted, Some("nope")),
    ];
    for (transport, key) in rejected {
        let response = server
            .router_for(transport)
            .oneshot(get("/count", key))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let response = server
        .router_for(Transport::Encrypted)
        .oneshot(get("/count", Some(KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
