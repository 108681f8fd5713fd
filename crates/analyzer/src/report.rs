//! Report Formatting and Export

use feature_engine::FeatureVector;
use inference_engine::{ImpactScores, IMPACT_DIMENSION};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::analysis::AnalysisResult;
use crate::AnalyzerError;

/// Default file name offered for downloads
pub const EXPORT_FILE_NAME: &str = "impact_analysis.json";

/// Nearest two-decimal value to the exact binary `value`.
///
/// Goes through fixed-point formatting so ties resolve on the stored value
/// (2.675 is stored slightly below and becomes 2.67).
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Rounded analysis output, the shape persisted by exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Social, environmental and financial scores
    pub impact_scores: ImpactScores,
    /// Uncertainty per score, same order as `impact_scores`
    pub uncertainty: [f64; IMPACT_DIMENSION],
    /// All ten features by name
    pub features: FeatureVector,
}

impl AnalysisReport {
    /// Round every value of an analysis result
    pub fn from_result(result: &AnalysisResult) -> Self {
        Self {
            impact_scores: result.prediction.scores.map_values(round2),
            uncertainty: result.prediction.uncertainty.map(round2),
            features: result.features.map_values(round2),
        }
    }

    /// Two-space indented JSON
    pub fn to_json_pretty(&self) -> Result<String, AnalyzerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a previously exported report
    pub fn from_json(json: &str) -> Result<Self, AnalyzerError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Write a report to `path` as pretty JSON
pub fn export_report(report: &AnalysisReport, path: impl AsRef<Path>) -> Result<(), AnalyzerError> {
    let path = path.as_ref();
    std::fs::write(path, report.to_json_pretty()?)?;
    info!("Exported analysis report to {}", path.display());
    Ok(())
}

/// Load a report written by [`export_report`]
pub fn load_report(path: impl AsRef<Path>) -> Result<AnalysisReport, AnalyzerError> {
    let json = std::fs::read_to_string(path)?;
    AnalysisReport::from_json(&json)
}
