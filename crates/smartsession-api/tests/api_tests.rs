//! HTTP integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use smartsession_api::{create_router, ApiConfig, AppState};
use smartsession_vision::NullFaceProvider;

fn create_test_router() -> Router {
    let state = AppState::with_provider(ApiConfig::default(), Arc::new(NullFaceProvider::new()));
    create_router(state, None)
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, body) = get_json(create_test_router(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_ready_reports_backend_and_counts() {
    let (status, body) = get_json(create_test_router(), "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["vision_backend"], "null");
    assert_eq!(body["producers"], 0);
    assert_eq!(body["consumers"], 0);
}

#[tokio::test]
async fn test_metrics_route_absent_when_disabled() {
    let response = create_test_router()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_security_headers_and_request_id() {
    let response = create_test_router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("X-Request-ID", "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-request-id"], "req-42");
}

#[tokio::test]
async fn test_ws_route_requires_upgrade() {
    let response = create_test_router()
        .oneshot(Request::builder().uri("/ws/student").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[cfg(feature = "opencv")]
#[test]
fn test_startup_requires_cascade_files() {
    let mut config = ApiConfig::default();
    config.vision.face_cascade_path = "/nonexistent/face.xml".to_string();
    config.vision.eye_cascade_path = "/nonexistent/eye.xml".to_string();

    let err = match AppState::new(config) {
        Ok(state) => panic!("started with backend {}", state.vision.name()),
        Err(e) => e,
    };
    assert!(matches!(
        err,
        smartsession_api::ApiError::Vision(smartsession_vision::VisionError::ModelNotFound(_))
    ));
}
