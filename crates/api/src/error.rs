//! API Error Responses

use analyzer::AnalyzerError;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Analysis(#[from] AnalyzerError),
    /// Body missing, not JSON, or with wrongly typed fields
    #[error(transparent)]
    Body(#[from] JsonRejection),
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reasons: Vec<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let err = match self {
            ApiError::Analysis(err) => err,
            ApiError::Body(rejection) => {
                warn!("Rejected request body: {}", rejection.body_text());
                let body = ErrorBody {
                    error: "validation_error",
                    message: "Invalid input data".to_string(),
                    reasons: vec![rejection.body_text()],
                };
                return (rejection.status(), Json(body)).into_response();
            }
        };

        let (status, body) = match &err {
            AnalyzerError::Validation(errors) => {
                warn!("Rejected submission: {}", err);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorBody {
                        error: "validation_error",
                        message: "Invalid input data".to_string(),
                        reasons: errors.iter().map(ToString::to_string).collect(),
                    },
                )
            }
            _ => {
                error!("Analysis failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "analysis_failed",
                        message: "An error occurred during analysis".to_string(),
                        reasons: Vec::new(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
