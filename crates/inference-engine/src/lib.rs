//! Impact Prediction Engine
//!
//! Fits a random forest and a gradient-boosted ensemble on a synthetic
//! corpus and combines them into mean scores with per-score uncertainty.

mod boosting;
mod corpus;
mod forest;
mod predictor;
mod regressor;
mod tree;

pub use boosting::{BoostingParams, GradientBoostedRegressor};
pub use corpus::{CorpusConfig, TrainingCorpus, TARGET_NAMES};
pub use forest::{ForestParams, RandomForestRegressor};
pub use predictor::{
    ImpactPredictor, ImpactScores, ModelPrediction, PredictionResult, PredictorConfig,
    IMPACT_DIMENSION, IMPACT_NAMES,
};
pub use regressor::Regressor;
pub use tree::{GrowerParams, RegressionTree};

use feature_engine::ScalerError;
use thiserror::Error;

/// Errors during fitting or inference.
///
/// All of these signal a contract violation between the caller and the
/// fitted schema rather than a recoverable runtime condition.
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("Invalid input shape: expected {expected}, got {actual}")]
    InvalidInputShape { expected: usize, actual: usize },
    #[error("Feature schema mismatch: expected {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },
    #[error("Model {model} produces {actual} outputs, expected {expected}")]
    OutputMismatch {
        model: String,
        expected: usize,
        actual: usize,
    },
    #[error("Ensemble has no models")]
    EmptyEnsemble,
    #[error("Model {0} used before fit")]
    NotFitted(String),
    #[error("Model {model} has invalid parameters: {reason}")]
    InvalidParams { model: String, reason: String },
    #[error("Training corpus is empty")]
    EmptyCorpus,
    #[error("Scaling failed: {0}")]
    Scaler(#[from] ScalerError),
}
