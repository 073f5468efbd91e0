//! CORS and bearer-credential checks for the scoring endpoints
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tracing::warn;

pub fn cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Requires `Authorization: Bearer <token>`; the token must equal the
/// configured key when one is set
pub async fn require_bearer(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let accepted = match (token, state.api_key.as_deref()) {
        (Some(token), Some(expected)) => token == expected,
        (Some(_), None) => true,
        (None, _) => false,
    };

    if !accepted {
        warn!(path = %req.uri().path(), "rejected request without valid bearer credential");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Missing or invalid authorization header" })),
        )
            .into_response();
    }

    next.run(req).await
}
