//! Impact Predictor
//!
//! Fits the ensemble once, at construction, and answers predictions from the
//! fitted state without ever refitting.

use feature_engine::{FeatureVector, StandardScaler, FEATURE_NAMES};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::boosting::{BoostingParams, GradientBoostedRegressor};
use crate::corpus::{CorpusConfig, TrainingCorpus};
use crate::forest::{ForestParams, RandomForestRegressor};
use crate::regressor::Regressor;
use crate::InferenceError;

/// Number of impact scores per prediction
pub const IMPACT_DIMENSION: usize = 3;

/// Impact names, in prediction order
pub const IMPACT_NAMES: [&str; IMPACT_DIMENSION] = ["social", "environmental", "financial"];

/// Predictor configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub corpus: CorpusConfig,
    pub forest: ForestParams,
    pub boosting: BoostingParams,
}

impl PredictorConfig {
    /// Smaller corpus and ensembles, for quick startup
    pub fn lightweight() -> Self {
        Self {
            corpus: CorpusConfig {
                n_samples: 300,
                ..Default::default()
            },
            forest: ForestParams {
                n_estimators: 20,
                ..Default::default()
            },
            boosting: BoostingParams {
                n_estimators: 30,
                ..Default::default()
            },
        }
    }
}

/// The three impact scores
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactScores {
    pub social: f64,
    pub environmental: f64,
    pub financial: f64,
}

impl ImpactScores {
    /// Build from values in [`IMPACT_NAMES`] order
    pub fn from_array(values: [f64; IMPACT_DIMENSION]) -> Self {
        Self {
            social: values[0],
            environmental: values[1],
            financial: values[2],
        }
    }

    /// Values in [`IMPACT_NAMES`] order
    pub fn to_array(&self) -> [f64; IMPACT_DIMENSION] {
        [self.social, self.environmental, self.financial]
    }

    /// Apply `f` to every score
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        Self::from_array(self.to_array().map(f))
    }
}

/// One ensemble member's raw prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPrediction {
    pub model: String,
    pub scores: ImpactScores,
}

/// Ensemble prediction for one feature vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Element-wise mean across models
    pub scores: ImpactScores,
    /// Element-wise population standard deviation across models
    pub uncertainty: [f64; IMPACT_DIMENSION],
    /// Per-model predictions the mean and deviation were computed from
    pub individual_predictions: Vec<ModelPrediction>,
}

/// Fitted ensemble of impact regressors
pub struct ImpactPredictor {
    columns: Vec<String>,
    scaler: StandardScaler,
    models: Vec<Box<dyn Regressor>>,
    corpus_rows: usize,
}

impl std::fmt::Debug for ImpactPredictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImpactPredictor")
            .field("columns", &self.columns)
            .field("models", &self.model_names())
            .field("corpus_rows", &self.corpus_rows)
            .finish()
    }
}

impl ImpactPredictor {
    /// Fit the default two-model ensemble (random forest + gradient boosting)
    pub fn fit(config: &PredictorConfig) -> Result<Self, InferenceError> {
        let models: Vec<Box<dyn Regressor>> = vec![
            Box::new(RandomForestRegressor::new(config.forest.clone())),
            Box::new(GradientBoostedRegressor::new(config.boosting.clone())),
        ];
        Self::fit_with(&config.corpus, models)
    }

    /// Fit arbitrary regressors on a freshly synthesized corpus
    pub fn fit_with(
        corpus: &CorpusConfig,
        models: Vec<Box<dyn Regressor>>,
    ) -> Result<Self, InferenceError> {
        Self::fit_on_corpus(&TrainingCorpus::synthesize(corpus), models)
    }

    /// Fit arbitrary regressors on a given corpus
    pub fn fit_on_corpus(
        corpus: &TrainingCorpus,
        mut models: Vec<Box<dyn Regressor>>,
    ) -> Result<Self, InferenceError> {
        let start = Instant::now();

        if models.is_empty() {
            return Err(InferenceError::EmptyEnsemble);
        }
        if corpus.columns().iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(InferenceError::SchemaMismatch {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                actual: corpus.columns().to_vec(),
            });
        }
        if corpus.is_empty() {
            return Err(InferenceError::EmptyCorpus);
        }
        if corpus.targets().ncols() != IMPACT_DIMENSION {
            return Err(InferenceError::InvalidInputShape {
                expected: IMPACT_DIMENSION,
                actual: corpus.targets().ncols(),
            });
        }

        let scaler = StandardScaler::fit(corpus.inputs())?;
        let scaled = scaler.transform(corpus.inputs())?;

        for model in models.iter_mut() {
            model.fit(scaled.view(), corpus.targets())?;
            let outputs = model.n_outputs().unwrap_or(0);
            if outputs != IMPACT_DIMENSION {
                return Err(InferenceError::OutputMismatch {
                    model: model.name().to_string(),
                    expected: IMPACT_DIMENSION,
                    actual: outputs,
                });
            }
            debug!("Fitted {}", model.name());
        }

        info!(
            "Impact predictor fitted on {} synthetic rows with {} models in {}ms",
            corpus.len(),
            models.len(),
            start.elapsed().as_millis()
        );

        Ok(Self {
            columns: corpus.columns().to_vec(),
            scaler,
            models,
            corpus_rows: corpus.len(),
        })
    }

    /// Predict impact scores for a feature vector
    pub fn predict_impact(&self, features: &FeatureVector) -> Result<PredictionResult, InferenceError> {
        self.predict_values(&features.to_array())
    }

    /// Predict from raw values in schema column order
    pub fn predict_values(&self, values: &[f64]) -> Result<PredictionResult, InferenceError> {
        if values.len() != self.columns.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }

        let scaled = self.scaler.transform_row(values)?;
        let mut stacked = Array2::<f64>::zeros((self.models.len(), IMPACT_DIMENSION));
        let mut individual_predictions = Vec::with_capacity(self.models.len());

        for (model, mut slot) in self.models.iter().zip(stacked.rows_mut()) {
            let prediction = model.predict(scaled.view())?;
            if prediction.len() != IMPACT_DIMENSION {
                return Err(InferenceError::OutputMismatch {
                    model: model.name().to_string(),
                    expected: IMPACT_DIMENSION,
                    actual: prediction.len(),
                });
            }
            slot.assign(&prediction);
            individual_predictions.push(ModelPrediction {
                model: model.name().to_string(),
                scores: ImpactScores::from_array([prediction[0], prediction[1], prediction[2]]),
            });
        }

        let mean = stacked
            .mean_axis(Axis(0))
            .ok_or(InferenceError::EmptyEnsemble)?;
        let std = stacked.std_axis(Axis(0), 0.0);

        let result = PredictionResult {
            scores: ImpactScores::from_array([mean[0], mean[1], mean[2]]),
            uncertainty: [std[0], std[1], std[2]],
            individual_predictions,
        };

        debug!(
            "Prediction: social={:.3}, environmental={:.3}, financial={:.3}, uncertainty={:?}",
            result.scores.social, result.scores.environmental, result.scores.financial, result.uncertainty
        );
        Ok(result)
    }

    /// Feature columns the predictor was fitted on
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Names of the ensemble members
    pub fn model_names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// Rows in the corpus used for fitting
    pub fn corpus_rows(&self) -> usize {
        self.corpus_rows
    }

    /// Fitted scaler
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::TARGET_NAMES;
    use data_validator::RawInput;
    use feature_engine::FeatureEngine;
    use ndarray::{Array1, ArrayView1, ArrayView2};

    /// Predicts a fixed weighted sum of the first inputs for every output
    struct WeightedStub {
        name: &'static str,
        weights: [f64; 2],
        fitted: bool,
    }

    impl WeightedStub {
        fn boxed(name: &'static str, weights: [f64; 2]) -> Box<dyn Regressor> {
            Box::new(Self {
                name,
                weights,
                fitted: false,
            })
        }
    }

    impl Regressor for WeightedStub {
        fn name(&self) -> &str {
            self.name
        }

        fn fit(&mut self, _: ArrayView2<'_, f64>, _: ArrayView2<'_, f64>) -> Result<(), InferenceError> {
            self.fitted = true;
            Ok(())
        }

        fn predict(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            let v = self.weights[0] * row[0] + self.weights[1] * row[1];
            Ok(Array1::from(vec![v, v + 1.0, v - 1.0]))
        }

        fn n_outputs(&self) -> Option<usize> {
            self.fitted.then_some(IMPACT_DIMENSION)
        }
    }

    /// Fitted but reports the wrong number of outputs
    struct TwoOutputStub;

    impl Regressor for TwoOutputStub {
        fn name(&self) -> &str {
            "two_outputs"
        }

        fn fit(&mut self, _: ArrayView2<'_, f64>, _: ArrayView2<'_, f64>) -> Result<(), InferenceError> {
            Ok(())
        }

        fn predict(&self, _: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError> {
            Ok(Array1::zeros(2))
        }

        fn n_outputs(&self) -> Option<usize> {
            Some(2)
        }
    }

    fn sample_features() -> FeatureVector {
        let raw = RawInput::try_new(100.0, 5.0, 5.0, 5.0, 5.0, 5.0).unwrap();
        FeatureEngine::new().create_features(&raw)
    }

    fn small_corpus() -> CorpusConfig {
        CorpusConfig {
            n_samples: 50,
            seed: 42,
        }
    }

    #[test]
    fn test_uncertainty_is_half_difference() {
        let predictor = ImpactPredictor::fit_with(
            &small_corpus(),
            vec![
                WeightedStub::boxed("a", [1.0, 0.0]),
                WeightedStub::boxed("b", [0.0, 2.0]),
            ],
        )
        .unwrap();

        let result = predictor.predict_impact(&sample_features()).unwrap();
        let a = result.individual_predictions[0].scores.to_array();
        let b = result.individual_predictions[1].scores.to_array();

        for i in 0..IMPACT_DIMENSION {
            let expected_mean = (a[i] + b[i]) / 2.0;
            let expected_std = (a[i] - b[i]).abs() / 2.0;
            assert!((result.scores.to_array()[i] - expected_mean).abs() < 1e-12);
            assert!((result.uncertainty[i] - expected_std).abs() < 1e-12);
            assert!(result.uncertainty[i] >= 0.0);
        }
    }

    #[test]
    fn test_identical_models_have_zero_uncertainty() {
        let predictor = ImpactPredictor::fit_with(
            &small_corpus(),
            vec![
                WeightedStub::boxed("a", [1.0, 1.0]),
                WeightedStub::boxed("b", [1.0, 1.0]),
            ],
        )
        .unwrap();
        let result = predictor.predict_impact(&sample_features()).unwrap();
        assert_eq!(result.uncertainty, [0.0; IMPACT_DIMENSION]);
    }

    #[test]
    fn test_wrong_width_is_configuration_error() {
        let predictor =
            ImpactPredictor::fit_with(&small_corpus(), vec![WeightedStub::boxed("a", [1.0, 0.0])])
                .unwrap();
        let err = predictor.predict_values(&[1.0; 9]).unwrap_err();
        assert!(matches!(
            err,
            InferenceError::InvalidInputShape { expected: 10, actual: 9 }
        ));
    }

    #[test]
    fn test_empty_ensemble_rejected() {
        let err = ImpactPredictor::fit_with(&small_corpus(), Vec::new()).unwrap_err();
        assert!(matches!(err, InferenceError::EmptyEnsemble));
    }

    #[test]
    fn test_output_mismatch_rejected() {
        let err = ImpactPredictor::fit_with(&small_corpus(), vec![Box::new(TwoOutputStub)])
            .unwrap_err();
        assert!(matches!(err, InferenceError::OutputMismatch { actual: 2, .. }));
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let synthetic = TrainingCorpus::synthesize(&small_corpus());
        let mut columns = synthetic.columns().to_vec();
        columns.swap(0, 1);
        let corpus = TrainingCorpus::new(
            columns,
            synthetic.inputs().to_owned(),
            synthetic.targets().to_owned(),
        )
        .unwrap();

        let err = ImpactPredictor::fit_on_corpus(&corpus, vec![WeightedStub::boxed("a", [1.0, 0.0])])
            .unwrap_err();
        assert!(matches!(err, InferenceError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_repeated_predictions_are_identical() {
        let predictor = ImpactPredictor::fit(&PredictorConfig::lightweight()).unwrap();
        let features = sample_features();
        let first = predictor.predict_impact(&features).unwrap();
        let second = predictor.predict_impact(&features).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_same_seed_predictors_agree() {
        let config = PredictorConfig::lightweight();
        let a = ImpactPredictor::fit(&config).unwrap();
        let b = ImpactPredictor::fit(&config).unwrap();
        let features = sample_features();

        let ra = a.predict_impact(&features).unwrap();
        let rb = b.predict_impact(&features).unwrap();
        for (x, y) in ra.scores.to_array().iter().zip(rb.scores.to_array()) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_default_ensemble_tracks_synthetic_targets() {
        let predictor = ImpactPredictor::fit(&PredictorConfig::default()).unwrap();
        assert_eq!(predictor.model_names(), vec!["random_forest", "gradient_boosting"]);
        assert_eq!(predictor.corpus_rows(), 1000);

        // Synthetic targets for this property: 5.0, 5.0, 3.8
        let result = predictor.predict_impact(&sample_features()).unwrap();
        assert_eq!(result.individual_predictions.len(), 2);
        assert!((result.scores.social - 5.0).abs() < 1.0);
        assert!((result.scores.environmental - 5.0).abs() < 1.0);
        assert!((result.scores.financial - 3.8).abs() < 1.0);
        assert!(result.uncertainty.iter().all(|u| *u >= 0.0));

        // Training fit on the same synthesized corpus
        let corpus = TrainingCorpus::synthesize(&CorpusConfig::default());
        let targets = corpus.targets();
        let means = targets.mean_axis(Axis(0)).unwrap();
        let mut ss_res = [0.0; IMPACT_DIMENSION];
        let mut ss_tot = [0.0; IMPACT_DIMENSION];

        for (row, target) in corpus.inputs().rows().into_iter().zip(targets.rows()) {
            let values: Vec<f64> = row.to_vec();
            let result = predictor.predict_values(&values).unwrap();
            let rf = result.individual_predictions[0].scores.to_array();
            let gb = result.individual_predictions[1].scores.to_array();
            let scores = result.scores.to_array();

            for k in 0..IMPACT_DIMENSION {
                let spread = (rf[k] - gb[k]).abs() / 2.0;
                assert!((result.uncertainty[k] - spread).abs() < 1e-9);
                ss_res[k] += (target[k] - scores[k]).powi(2);
                ss_tot[k] += (target[k] - means[k]).powi(2);
            }
        }

        for k in 0..IMPACT_DIMENSION {
            let r2 = 1.0 - ss_res[k] / ss_tot[k];
            assert!(r2 > 0.98, "{} training R² too low: {r2}", TARGET_NAMES[k]);
        }
    }
}
