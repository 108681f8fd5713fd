//! Analysis Pipeline

use data_validator::{PropertySubmission, RawInput, ValidationConfig, Validator};
use feature_engine::{FeatureEngine, FeatureVector};
use inference_engine::{ImpactPredictor, PredictionResult, PredictorConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::report::AnalysisReport;
use crate::AnalyzerError;

/// Analyzer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub validation: ValidationConfig,
    pub predictor: PredictorConfig,
}

/// Features and ensemble prediction for one property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub features: FeatureVector,
    pub prediction: PredictionResult,
}

impl AnalysisResult {
    /// Two-decimal report suitable for display and export
    pub fn report(&self) -> AnalysisReport {
        AnalysisReport::from_result(self)
    }
}

/// Validates, derives features and predicts impact.
///
/// Owns its predictor, which is fitted when the analyzer is built.
#[derive(Debug)]
pub struct Analyzer {
    validator: Validator,
    engine: FeatureEngine,
    predictor: ImpactPredictor,
}

impl Analyzer {
    /// Build an analyzer, fitting its predictor
    pub fn new(config: &AnalyzerConfig) -> Result<Self, AnalyzerError> {
        info!("Fitting impact predictor");
        let predictor = ImpactPredictor::fit(&config.predictor)?;
        Ok(Self::with_predictor(config.validation.clone(), predictor))
    }

    /// Build an analyzer around an already fitted predictor
    pub fn with_predictor(validation: ValidationConfig, predictor: ImpactPredictor) -> Self {
        Self {
            validator: Validator::new(validation),
            engine: FeatureEngine::new(),
            predictor,
        }
    }

    /// Analyze a form submission
    pub fn analyze(&self, submission: &PropertySubmission) -> Result<AnalysisResult, AnalyzerError> {
        let raw = self
            .validator
            .validate(submission)
            .into_result()
            .map_err(AnalyzerError::Validation)?;
        self.analyze_input(&raw)
    }

    /// Analyze already validated input
    pub fn analyze_input(&self, raw: &RawInput) -> Result<AnalysisResult, AnalyzerError> {
        let features = self.engine.create_features(raw);
        let prediction = self.predictor.predict_impact(&features)?;

        debug!(
            "Analysis complete: social={:.2}, environmental={:.2}, financial={:.2}",
            prediction.scores.social, prediction.scores.environmental, prediction.scores.financial
        );

        Ok(AnalysisResult {
            features,
            prediction,
        })
    }

    /// The fitted predictor
    pub fn predictor(&self) -> &ImpactPredictor {
        &self.predictor
    }

    /// Active validation rules
    pub fn validator(&self) -> &Validator {
        &self.validator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_validator::ValidationError;
    use std::sync::OnceLock;

    fn analyzer() -> &'static Analyzer {
        static ANALYZER: OnceLock<Analyzer> = OnceLock::new();
        ANALYZER.get_or_init(|| {
            let config = AnalyzerConfig {
                predictor: PredictorConfig::lightweight(),
                ..Default::default()
            };
            match Analyzer::new(&config) {
                Ok(analyzer) => analyzer,
                Err(e) => panic!("analyzer fit failed: {e}"),
            }
        })
    }

    fn all_fives() -> PropertySubmission {
        PropertySubmission::complete(100.0, 5.0, 5.0, 5.0, 5.0, 5.0)
    }

    #[test]
    fn test_end_to_end_features() {
        let result = analyzer().analyze(&all_fives()).unwrap();
        assert_eq!(result.features.accessibility_index, 2.5);
        assert_eq!(result.features.renovation_potential, 5.0);
        assert_eq!(result.features.community_impact, 2.5);
        assert_eq!(result.features.sustainability_score, 2.5);
        assert_eq!(result.prediction.individual_predictions.len(), 2);
    }

    #[test]
    fn test_validation_error_surfaces() {
        let mut submission = all_fives();
        submission.size = Some(5.0);
        submission.condition = Some(11.0);

        let err = analyzer().analyze(&submission).unwrap_err();
        let reasons = err.validation_errors().unwrap();
        assert_eq!(reasons.len(), 2);
        assert!(err.to_string().starts_with("Invalid input data"));
    }

    #[test]
    fn test_missing_field_rejected() {
        let submission = PropertySubmission {
            community_score: None,
            ..all_fives()
        };
        let err = analyzer().analyze(&submission).unwrap_err();
        assert_eq!(
            err.validation_errors(),
            Some(&[ValidationError::MissingField("community_score")][..])
        );
    }

    #[test]
    fn test_analyze_input_matches_analyze() {
        let raw = RawInput::try_new(100.0, 5.0, 5.0, 5.0, 5.0, 5.0).unwrap();
        let direct = analyzer().analyze_input(&raw).unwrap();
        let validated = analyzer().analyze(&all_fives()).unwrap();
        assert_eq!(direct, validated);
    }

    #[test]
    fn test_result_json_round_trip() {
        let result = analyzer().analyze(&all_fives()).unwrap();
        let json = serde_json::to_string(&result).unwrap();
        let back: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_custom_validation_ranges() {
        let predictor = inference_engine::ImpactPredictor::fit(&PredictorConfig::lightweight()).unwrap();
        let analyzer = Analyzer::with_predictor(
            ValidationConfig {
                size_range: (10.0, 200.0),
                ..Default::default()
            },
            predictor,
        );
        let submission = PropertySubmission {
            size: Some(500.0),
            ..all_fives()
        };
        assert!(analyzer.analyze(&submission).is_err());
    }
}
