//! Property Impact Dashboard API Server
//!
//! REST endpoints for analyzing a property submission and downloading the
//! resulting report.

use analyzer::Analyzer;
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::FmtSubscriber;

pub mod config;
pub mod error;
mod routes;

pub use crate::config::{DashboardConfig, DisplayConfig, LoggingConfig, ServerConfig, CONFIG_FILE};
pub use error::ApiError;

/// Application state shared across handlers
#[derive(Debug)]
pub struct AppState {
    /// Fitted analyzer; read-only after startup
    pub analyzer: Analyzer,
    /// Display defaults for analysis responses
    pub display: DisplayConfig,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Create application state around a fitted analyzer
    pub fn new(analyzer: Analyzer, display: DisplayConfig) -> Self {
        Self {
            analyzer,
            display,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelSummary,
}

/// Fitted ensemble summary
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub models: Vec<String>,
    pub corpus_rows: usize,
    pub features: Vec<String>,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/v1/health", get(health_handler))
        .route("/api/v1/analyze", post(routes::analyze::analyze))
        .route("/api/v1/analyze/export", post(routes::analyze::export))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let predictor = state.analyzer.predictor();

    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model: ModelSummary {
            models: predictor.model_names().iter().map(|s| s.to_string()).collect(),
            corpus_rows: predictor.corpus_rows(),
            features: predictor.columns().to_vec(),
        },
    })
}

/// Initialize logging
pub fn init_logging(config: &LoggingConfig) -> Result<(), SetGlobalDefaultError> {
    let builder = FmtSubscriber::builder()
        .with_max_level(config.level())
        .with_target(true);

    if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    }
}

/// Fit the analyzer and run the server
pub async fn run_server(config: DashboardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let analyzer_config = config.analyzer.clone();
    let analyzer = tokio::task::spawn_blocking(move || Analyzer::new(&analyzer_config)).await??;
    info!(
        "Analyzer ready: {} models over {} corpus rows",
        analyzer.predictor().model_names().len(),
        analyzer.predictor().corpus_rows()
    );

    let state = Arc::new(AppState::new(analyzer, config.display));
    let app = create_router(state);

    info!("Starting API server on {}", config.server.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::{AnalyzerConfig, PredictorConfig};
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use std::sync::OnceLock;
    use tower::ServiceExt;

    fn shared_state() -> Arc<AppState> {
        static STATE: OnceLock<Arc<AppState>> = OnceLock::new();
        STATE
            .get_or_init(|| {
                let config = AnalyzerConfig {
                    predictor: PredictorConfig::lightweight(),
                    ..Default::default()
                };
                let analyzer = match Analyzer::new(&config) {
                    Ok(analyzer) => analyzer,
                    Err(e) => panic!("analyzer fit failed: {e}"),
                };
                Arc::new(AppState::new(analyzer, DisplayConfig::default()))
            })
            .clone()
    }

    fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn valid_submission() -> serde_json::Value {
        serde_json::json!({
            "size": 100.0,
            "condition": 5.0,
            "location_score": 5.0,
            "community_score": 5.0,
            "energy_score": 5.0,
            "transport_score": 5.0
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = create_router(shared_state());
        let response = app
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"]["models"].as_array().unwrap().len(), 2);
        assert_eq!(body["model"]["features"].as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_analyze_valid_submission() {
        let app = create_router(shared_state());
        let response = app
            .oneshot(post_json("/api/v1/analyze", valid_submission()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["impact_scores"].as_object().unwrap().len(), 3);
        assert_eq!(body["uncertainty"].as_array().unwrap().len(), 3);
        assert_eq!(body["features"]["renovation_potential"], 5.0);
        assert_eq!(body["charts"]["radar"]["values"].as_array().unwrap().len(), 3);
        assert_eq!(
            body["charts"]["historical"]["points"].as_array().unwrap().len(),
            100
        );
        assert_eq!(body["charts"]["importance"]["simulated"], true);
    }

    #[tokio::test]
    async fn test_analyze_display_overrides() {
        let app = create_router(shared_state());
        let response = app
            .oneshot(post_json(
                "/api/v1/analyze?show_uncertainty=false&show_historical=false",
                valid_submission(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert!(body.get("uncertainty").is_none());
        assert!(body["charts"].get("historical").is_none());
    }

    #[tokio::test]
    async fn test_analyze_rejects_invalid_submission() {
        let mut submission = valid_submission();
        submission["size"] = serde_json::json!(5.0);
        submission["transport_score"] = serde_json::json!(12.0);

        let app = create_router(shared_state());
        let response = app
            .oneshot(post_json("/api/v1/analyze", submission))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["reasons"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_analyze_rejects_missing_field() {
        let mut submission = valid_submission();
        submission.as_object_mut().unwrap().remove("condition");

        let app = create_router(shared_state());
        let response = app
            .oneshot(post_json("/api/v1/analyze", submission))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["reasons"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_rejects_mistyped_field() {
        let mut submission = valid_submission();
        submission["size"] = serde_json::json!("abc");

        let app = create_router(shared_state());
        let response = app
            .oneshot(post_json("/api/v1/analyze", submission))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = json_body(response).await;
        assert_eq!(body["error"], "validation_error");
        assert_eq!(body["reasons"].as_array().unwrap().len(), 1);
        assert!(body["reasons"][0].as_str().unwrap().contains("size"));
    }

    #[tokio::test]
    async fn test_export_rejects_malformed_json() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/analyze/export")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = create_router(shared_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_export_attachment() {
        let app = create_router(shared_state());
        let response = app
            .oneshot(post_json("/api/v1/analyze/export", valid_submission()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"impact_analysis.json\""
        );
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(text.starts_with("{\n  \"impact_scores\""));
        let report = analyzer::AnalysisReport::from_json(&text).unwrap();
        assert_eq!(report.features.renovation_potential, 5.0);
    }
}
