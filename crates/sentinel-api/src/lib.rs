//! Sentinel API: the two scoring endpoints over HTTP
//!
//! - `POST /functions/v1/generate-test-cases`
//! - `POST /functions/v1/analyze-tests`
//! - `GET /health`, `GET /metrics`
pub mod handlers;
pub mod metrics;
pub mod middleware;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use metrics::ApiMetrics;
use sentinel_core::{SentinelConfig, SentinelError};
use sentinel_store::{store_from_config, ProjectStore};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProjectStore>,
    pub metrics: Arc<ApiMetrics>,
    /// Expected bearer token; any bearer token is accepted when unset
    pub api_key: Option<String>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProjectStore>, api_key: Option<String>) -> Result<Self, SentinelError> {
        let metrics = ApiMetrics::new().map_err(|e| SentinelError::Config(e.to_string()))?;
        Ok(Self {
            store,
            metrics: Arc::new(metrics),
            api_key: api_key.filter(|k| !k.is_empty()),
        })
    }
}

pub fn create_app(state: AppState) -> Router {
    let functions = Router::new()
        .route("/functions/v1/generate-test-cases", post(handlers::generate_test_cases))
        .route("/functions/v1/analyze-tests", post(handlers::analyze_tests))
        .route_layer(from_fn_with_state(state.clone(), middleware::require_bearer));

    Router::new()
        .merge(functions)
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(config: SentinelConfig) -> Result<(), SentinelError> {
    let state = AppState::new(store_from_config(&config), Some(config.anon_key.clone()))?;
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Sentinel API listening on {}", config.listen_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
