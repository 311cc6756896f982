//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use concert_api::router::build_app_router;
use concert_api::state::AppState;
use concert_db::store::InMemoryConcertStore;
use concert_events::{ConnectionStatus, DomainEvent, NotificationPublisher, PublishError};
use concert_service::ConcertService;
use tower::ServiceExt;

/// A publisher whose broker is gone.
struct DisconnectedPublisher;

#[async_trait]
impl NotificationPublisher for DisconnectedPublisher {
    async fn connect(&self) -> Result<(), PublishError> {
        Err(PublishError::Connect("connection refused".into()))
    }

    async fn publish(&self, _event: &DomainEvent) -> Result<(), PublishError> {
        Err(PublishError::Connect("connection refused".into()))
    }

    fn status(&self) -> ConnectionStatus {
        ConnectionStatus::Disconnected
    }

    async fn shutdown(&self) {}
}

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = common::build_test_app();
    let response = get(app.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["publisher"], "connected");
}

#[tokio::test]
async fn health_check_reports_degraded_publisher() {
    let config = common::test_config();
    let concerts = ConcertService::new(
        Arc::new(InMemoryConcertStore::new()),
        Arc::new(DisconnectedPublisher),
    );
    let state = AppState {
        concerts: Arc::new(concerts),
        config: Arc::new(config.clone()),
    };
    let app = build_app_router(state, &config);

    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["publisher"], "disconnected");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = common::build_test_app();
    let response = get(app.app(), "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = common::build_test_app();
    let response = get(app.app(), "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let request_id = response.headers().get("x-request-id");
    assert!(
        request_id.is_some(),
        "Response must contain an x-request-id header"
    );

    let id_str = request_id.unwrap().to_str().unwrap();
    assert_eq!(id_str.len(), 36, "x-request-id should be a UUID string");
}

#[tokio::test]
async fn body_over_upload_limit_is_rejected() {
    let app = common::build_test_app();
    let limit = common::test_config().max_upload_bytes;
    let poster = vec![7u8; limit + 1];

    let response = common::send_multipart(
        app.app(),
        Method::POST,
        "/v1/concert/createConcert",
        &[
            common::Part::Text("title", "Big Poster"),
            common::Part::Text("location", "Paris"),
            common::Part::Text("date", "2025-06-15T20:00:00Z"),
            common::Part::Text("maxSeats", "10"),
            common::Part::Text("status", "scheduled"),
            common::Part::Image(&poster),
        ],
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let app = common::build_test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/v1/concert/getConcerts")
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "GET")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    let allow_origin = headers
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:5173");

    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("PUT"),
        "Allow-Methods should contain PUT, got: {allow_methods}"
    );
}
