//! Property Impact Analyzer
//!
//! Orchestrates a single analysis: validate the submission, derive features,
//! query the fitted ensemble and package the result for display and export.

pub mod analysis;
pub mod charts;
pub mod report;

pub use analysis::{AnalysisResult, Analyzer, AnalyzerConfig};
pub use charts::{ChartConfig, ChartSuite, FeatureImportance, HistoricalContext, ImpactRadar};
pub use report::{export_report, load_report, round2, AnalysisReport, EXPORT_FILE_NAME};

pub use data_validator::{PropertySubmission, RawInput, ValidationConfig, ValidationError};
pub use feature_engine::FeatureVector;
pub use inference_engine::{ImpactScores, InferenceError, PredictorConfig};

use thiserror::Error;

/// Errors surfaced by the analyzer
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Submission rejected; the caller must correct and resubmit
    #[error("Invalid input data: {}", join_reasons(.0))]
    Validation(Vec<ValidationError>),
    /// Predictor contract violation
    #[error("Predictor configuration error: {0}")]
    Configuration(#[from] InferenceError),
    #[error("Report I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Chart generation failed: {0}")]
    Chart(#[from] rand_distr::NormalError),
    #[error("Invalid chart size range [{0}, {1}]")]
    ChartSizeRange(f64, f64),
}

impl AnalyzerError {
    /// Validation reasons, if this is a validation failure
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            AnalyzerError::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn join_reasons(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
