//! Analysis Routes

use analyzer::{
    AnalysisReport, ChartSuite, FeatureVector, ImpactScores, PropertySubmission, EXPORT_FILE_NAME,
};
use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::ApiError;
use crate::AppState;

/// Query parameters for the analyze endpoint
#[derive(Debug, Default, Deserialize)]
pub struct AnalyzeQuery {
    /// Override the configured uncertainty display
    pub show_uncertainty: Option<bool>,
    /// Override the configured historical context display
    pub show_historical: Option<bool>,
}

/// Response for the analyze endpoint
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub impact_scores: ImpactScores,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<[f64; 3]>,
    pub features: FeatureVector,
    pub charts: ChartSuite,
}

/// Run an analysis and return rounded scores with chart data
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeQuery>,
    payload: Result<Json<PropertySubmission>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(submission) = payload?;
    let show_uncertainty = params.show_uncertainty.unwrap_or(state.display.show_uncertainty);
    let show_historical = params.show_historical.unwrap_or(state.display.show_historical);

    let result = state.analyzer.analyze(&submission)?;
    let charts = ChartSuite::build(&result, &state.display.charts, show_historical)?;
    let report = result.report();

    Ok(Json(AnalyzeResponse {
        impact_scores: report.impact_scores,
        uncertainty: show_uncertainty.then_some(report.uncertainty),
        features: report.features,
        charts,
    }))
}

/// Run an analysis and return the report as a downloadable file
pub async fn export(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PropertySubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(submission) = payload?;
    let report: AnalysisReport = state.analyzer.analyze(&submission)?.report();
    let body = report.to_json_pretty()?;
    let disposition = format!("attachment; filename=\"{EXPORT_FILE_NAME}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
