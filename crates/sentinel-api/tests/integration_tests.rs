//! Integration tests for sentinel-api

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use sentinel_api::{create_app, AppState};
use sentinel_core::{NewProject, Phase, ProjectParameters, TestKind};
use sentinel_store::{InMemoryStore, ProjectStore};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// Helpers
// ============================================================================

async fn app_with_project(kind: TestKind) -> (Router, Uuid) {
    let store: Arc<dyn ProjectStore> = Arc::new(InMemoryStore::new());
    let project = store
        .create_project(NewProject {
            owner: "alice".to_string(),
            name: "Search".to_string(),
            module_name: "indexer".to_string(),
            test_kind: kind,
            parameters: ProjectParameters::default(),
            current_phase: Phase::Generation,
        })
        .await
        .unwrap();

    let state = AppState::new(store, Some("secret".to_string())).unwrap();
    (create_app(state), project.id)
}

fn post(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ============================================================================
// Endpoints
// ============================================================================

#[tokio::test]
async fn test_generate_endpoint() {
    let (app, project_id) = app_with_project(TestKind::Integration).await;

    let response = app
        .oneshot(post(
            "/functions/v1/generate-test-cases",
            Some("secret"),
            json!({
                "projectId": project_id,
                "projectName": "Search",
                "moduleName": "indexer",
                "testType": "integration",
                "parameters": {}
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0]["title"], "End-to-End Flow Test");
    assert_eq!(rows[0]["description"], "Test complete workflow of indexer");
    assert_eq!(rows[0]["status"], "pending");
}

#[tokio::test]
async fn test_analyze_endpoint_after_generation() {
    let (app, project_id) = app_with_project(TestKind::Unit).await;

    let generated = app
        .clone()
        .oneshot(post(
            "/functions/v1/generate-test-cases",
            Some("secret"),
            json!({
                "projectId": project_id,
                "projectName": "Search",
                "moduleName": "indexer",
                "testKind": "unit"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(generated.status(), StatusCode::OK);

    let response = app
        .oneshot(post(
            "/functions/v1/analyze-tests",
            Some("secret"),
            json!({ "projectId": project_id, "testKind": "unit" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["coverage_level"], 85);
    assert_eq!(body["data"]["errors"], json!([]));
}

#[tokio::test]
async fn test_unknown_project_is_server_error() {
    let (app, _) = app_with_project(TestKind::Unit).await;

    let response = app
        .oneshot(post(
            "/functions/v1/analyze-tests",
            Some("secret"),
            json!({ "projectId": Uuid::new_v4(), "testKind": "unit" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().starts_with("NOTFOUND/"));
}

#[tokio::test]
async fn test_malformed_body_is_server_error() {
    let (app, _) = app_with_project(TestKind::Unit).await;

    let response = app
        .oneshot(post("/functions/v1/analyze-tests", Some("secret"), json!({ "testKind": "unit" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(json_body(response).await["error"].is_string());
}

// ============================================================================
// Auth, CORS, health, metrics
// ============================================================================

#[tokio::test]
async fn test_missing_or_wrong_bearer_is_unauthorized() {
    let (app, project_id) = app_with_project(TestKind::Unit).await;
    let body = json!({ "projectId": project_id, "testKind": "unit" });

    let missing = app
        .clone()
        .oneshot(post("/functions/v1/analyze-tests", None, body.clone()))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
    assert!(json_body(missing).await["error"].is_string());

    let wrong = app
        .oneshot(post("/functions/v1/analyze-tests", Some("guess"), body))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_preflight_is_answered() {
    let (app, _) = app_with_project(TestKind::Unit).await;

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/functions/v1/generate-test-cases")
                .header(header::ORIGIN, "http://localhost:5173")
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn test_health_needs_no_credential() {
    let (app, _) = app_with_project(TestKind::Unit).await;

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "ok");
}

#[tokio::test]
async fn test_metrics_count_generated_rows_and_failures() {
    let (app, project_id) = app_with_project(TestKind::Performance).await;

    app.clone()
        .oneshot(post(
            "/functions/v1/generate-test-cases",
            Some("secret"),
            json!({
                "projectId": project_id,
                "projectName": "Search",
                "moduleName": "indexer",
                "testKind": "performance"
            }),
        ))
        .await
        .unwrap();
    app.clone()
        .oneshot(post(
            "/functions/v1/analyze-tests",
            Some("secret"),
            json!({ "projectId": Uuid::new_v4(), "testKind": "performance" }),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    assert!(text.contains("sentinel_generated_test_cases_total 5"));
    assert!(text.contains("sentinel_analyses_total 0"));
    assert!(text.contains("sentinel_endpoint_failures_total{endpoint=\"analyze-tests\"} 1"));
}
