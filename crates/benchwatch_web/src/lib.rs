//! HTTP surface for benchwatch.
//!
//! # Responsibility
//! - Serve the landing page and the bench map.
//! - Expose a small JSON API for adding and marking benches.
//!
//! # Invariants
//! - Handlers never hold a storage connection across an `.await`.
//! - Storage failures surface as 5xx responses and are logged.

pub mod config;
pub mod error;
pub mod extractors;
pub mod pages;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use benchwatch_core::BenchService;
use log::{info, warn};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub use config::ServerArgs;
pub use error::{ApiError, ApiResult};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: BenchService,
}

impl AppState {
    pub fn new(service: BenchService) -> Self {
        Self { service }
    }
}

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/map", get(routes::map))
        .route("/health", get(routes::health))
        .route(
            "/api/benches",
            get(routes::list_benches).post(routes::create_bench),
        )
        .route("/api/benches/{id}", get(routes::get_bench))
        .route(
            "/api/benches/{id}/availability",
            post(routes::update_availability),
        )
        .route("/api/benches/{id}/history", get(routes::bench_history))
        .with_state(state)
}

/// Serves `state` on `addr` until Ctrl+C.
pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("event=server_start module=web status=ok addr={addr}");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=web status=ok");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => warn!("event=shutdown module=web status=start reason=ctrl_c"),
        Err(err) => warn!("event=shutdown module=web status=error error={err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::{build_router, AppState};
    use crate::routes::{CreatedBench, MapBench};
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use benchwatch_core::{BenchService, BenchUpdate};
    use serde::de::DeserializeOwned;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_app() -> (TempDir, BenchService, Router) {
        let dir = tempfile::tempdir().unwrap();
        let service = BenchService::new(dir.path().join("benches.db"));
        service.initialize_schema().unwrap();
        let app = build_router(AppState::new(service.clone()));
        (dir, service, app)
    }

    async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    async fn post_json(app: &Router, uri: &str, json: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    fn decode<T: DeserializeOwned>(body: &[u8]) -> T {
        serde_json::from_slice(body).unwrap()
    }

    #[tokio::test]
    async fn home_page_renders() {
        let (_dir, _service, app) = test_app();

        let (status, body) = get(&app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains("/map"));
    }

    #[tokio::test]
    async fn map_page_renders_with_no_benches() {
        let (_dir, _service, app) = test_app();

        let (status, body) = get(&app, "/map").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body)
            .unwrap()
            .contains("const benches = [];"));
    }

    #[tokio::test]
    async fn map_page_embeds_every_bench() {
        let (_dir, service, app) = test_app();
        service
            .create_bench(37.7749, -122.4194, "Bench in Golden Gate Park", "TestUser")
            .unwrap();
        service
            .create_bench(37.7849, -122.4094, "Bench near the playground", "TestUser")
            .unwrap();

        let (status, body) = get(&app, "/map").await;
        assert_eq!(status, StatusCode::OK);
        let html = String::from_utf8(body).unwrap();
        assert!(html.contains("Bench in Golden Gate Park"));
        assert!(html.contains("Bench near the playground"));
        assert!(html.contains(r#""is_available":true"#));
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (_dir, _service, app) = test_app();

        let (status, body) = get(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = decode(&body);
        assert_eq!(value["status"], "ok");
    }

    #[tokio::test]
    async fn create_then_fetch_bench_through_api() {
        let (_dir, _service, app) = test_app();

        let (status, body) = post_json(
            &app,
            "/api/benches",
            r#"{"latitude": 37.7749, "longitude": -122.4194, "description": "Test bench", "added_by": "Alice"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let created: CreatedBench = decode(&body);

        let (status, body) = get(&app, &format!("/api/benches/{}", created.id)).await;
        assert_eq!(status, StatusCode::OK);
        let bench: MapBench = decode(&body);
        assert_eq!(bench.id, created.id);
        assert_eq!(bench.description, "Test bench");
        assert_eq!(bench.added_by, "Alice");
        assert!(bench.is_available);

        let (status, body) = get(&app, "/api/benches").await;
        assert_eq!(status, StatusCode::OK);
        let all: Vec<MapBench> = decode(&body);
        assert_eq!(all, vec![bench]);
    }

    #[tokio::test]
    async fn create_without_reporter_is_anonymous() {
        let (_dir, service, app) = test_app();

        let (status, body) =
            post_json(&app, "/api/benches", r#"{"latitude": 1.0, "longitude": 2.0}"#).await;
        assert_eq!(status, StatusCode::CREATED);
        let created: CreatedBench = decode(&body);

        let bench = service.find_bench(created.id).unwrap().unwrap();
        assert_eq!(bench.added_by, "Anonymous");
        assert_eq!(bench.description, "");
    }

    #[tokio::test]
    async fn create_rejects_out_of_range_latitude() {
        let (_dir, service, app) = test_app();

        let (status, _) =
            post_json(&app, "/api/benches", r#"{"latitude": 123.0, "longitude": 2.0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(service.list_benches().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mark_occupied_updates_bench_and_history() {
        let (_dir, service, app) = test_app();
        let id = service
            .create_bench(37.7749, -122.4194, "Test bench", "Alice")
            .unwrap();

        let (status, body) = post_json(
            &app,
            &format!("/api/benches/{id}/availability"),
            r#"{"is_available": false, "updated_by": "Bob"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let update: BenchUpdate = decode(&body);
        assert_eq!(update.bench_id, id);
        assert!(!update.is_available);
        assert_eq!(update.updated_by, "Bob");

        assert!(!service.find_bench(id).unwrap().unwrap().is_available);

        let (status, body) = get(&app, &format!("/api/benches/{id}/history")).await;
        assert_eq!(status, StatusCode::OK);
        let history: Vec<BenchUpdate> = decode(&body);
        assert_eq!(history, vec![update]);
    }

    #[tokio::test]
    async fn unknown_bench_is_404_everywhere() {
        let (_dir, _service, app) = test_app();

        let (status, _) = get(&app, "/api/benches/77").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = post_json(
            &app,
            "/api/benches/77/availability",
            r#"{"is_available": true}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let value: serde_json::Value = decode(&body);
        assert_eq!(value["status"], 404);

        let (status, _) = get(&app, "/api/benches/77/history").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_body_field_is_json_400() {
        let (_dir, service, app) = test_app();

        let (status, body) = post_json(&app, "/api/benches", r#"{"longitude": 2.0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = decode(&body);
        assert_eq!(value["status"], 400);
        assert!(value["error"].as_str().unwrap().contains("latitude"));
        assert!(service.list_benches().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_json_is_json_400() {
        let (_dir, _service, app) = test_app();

        let (status, body) = post_json(&app, "/api/benches/1/availability", "{not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value: serde_json::Value = decode(&body);
        assert_eq!(value["status"], 400);
    }

    #[tokio::test]
    async fn non_numeric_bench_id_is_json_400() {
        let (_dir, _service, app) = test_app();

        for uri in ["/api/benches/abc", "/api/benches/abc/history"] {
            let (status, body) = get(&app, uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            let value: serde_json::Value = decode(&body);
            assert_eq!(value["status"], 400);
            assert!(value["error"].as_str().unwrap().contains("abc"));
        }
    }

    #[tokio::test]
    async fn storage_failure_is_500() {
        let dir = tempfile::tempdir().unwrap();
        let service = BenchService::new(dir.path().join("missing").join("benches.db"));
        let app = build_router(AppState::new(service));

        let (status, _) = get(&app, "/map").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
