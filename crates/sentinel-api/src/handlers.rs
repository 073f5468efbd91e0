//! Endpoint handlers
use crate::metrics::encode;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sentinel_core::SENTINEL_VERSION;
use sentinel_store::{analyze_into, generate_into, AnalyzeRequest, GenerateRequest};
use serde::Serialize;
use serde_json::json;
use tracing::error;

fn success<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

fn failure(state: &AppState, endpoint: &str, message: String) -> Response {
    error!(endpoint, "{}", message);
    state.metrics.failed(endpoint);
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": message }))).into_response()
}

pub async fn generate_test_cases(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    const ENDPOINT: &str = "generate-test-cases";
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return failure(&state, ENDPOINT, rejection.body_text()),
    };

    match generate_into(state.store.as_ref(), &request).await {
        Ok(rows) => {
            state.metrics.generated_test_cases.inc_by(rows.len() as u64);
            success(rows)
        }
        Err(e) => failure(&state, ENDPOINT, e.to_string()),
    }
}

pub async fn analyze_tests(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Response {
    const ENDPOINT: &str = "analyze-tests";
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => return failure(&state, ENDPOINT, rejection.body_text()),
    };

    match analyze_into(state.store.as_ref(), &request).await {
        Ok(analysis) => {
            state.metrics.analyses.inc();
            success(analysis)
        }
        Err(e) => failure(&state, ENDPOINT, e.to_string()),
    }
}

pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "version": SENTINEL_VERSION })))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match encode(state.metrics.registry()) {
        Ok(text) => (StatusCode::OK, text).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}
