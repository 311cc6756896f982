#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use concert_db::store::InMemoryConcertStore;
use concert_events::{BusPublisher, DomainEvent, EventBus};
use concert_service::ConcertService;
use http_body_util::BodyExt;
use tokio::sync::broadcast;
use tower::ServiceExt;

use concert_api::config::ServerConfig;
use concert_api::router::build_app_router;
use concert_api::state::AppState;

pub const BOUNDARY: &str = "concert-test-boundary";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        dependency_timeout_secs: 5,
        max_upload_bytes: 1024 * 1024,
        redis_url: None,
        queue_prefix: String::new(),
    }
}

/// The full router over an in-memory store, plus a receiver for every
/// notification the service publishes.
pub struct TestApp {
    pub router: Router,
    pub events: broadcast::Receiver<DomainEvent>,
    pub store: Arc<InMemoryConcertStore>,
}

impl TestApp {
    /// Clone of the router, ready for a single `oneshot` request.
    pub fn app(&self) -> Router {
        self.router.clone()
    }

    /// Notifications published so far, in order.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Build the application exactly as `main.rs` does, swapping Postgres and
/// Redis for in-process implementations.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(InMemoryConcertStore::new());
    let bus = Arc::new(EventBus::default());
    let events = bus.subscribe();

    let concerts = ConcertService::new(store.clone(), Arc::new(BusPublisher::new(bus)));
    let state = AppState {
        concerts: Arc::new(concerts),
        config: Arc::new(config.clone()),
    };

    TestApp {
        router: build_app_router(state, &config),
        events,
        store,
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, Body::empty(), None).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Body::empty(), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Method::POST,
        uri,
        Body::from(body.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        Method::PUT,
        uri,
        Body::from(body.to_string()),
        Some("application/json".to_string()),
    )
    .await
}

/// A text part or a binary `image` part of a multipart body.
pub enum Part<'a> {
    Text(&'a str, &'a str),
    Image(&'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::Image(bytes) => {
                body.extend_from_slice(
                    b"Content-Disposition: form-data; name=\"image\"; filename=\"poster.png\"\r\n\
                      Content-Type: image/png\r\n\r\n",
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn send_multipart(
    app: Router,
    method: Method,
    uri: &str,
    parts: &[Part<'_>],
) -> Response<Body> {
    send(
        app,
        method,
        uri,
        Body::from(multipart_body(parts)),
        Some(format!("multipart/form-data; boundary={BOUNDARY}")),
    )
    .await
}

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    body: Body,
    content_type: Option<String>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}
