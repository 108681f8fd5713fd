//! Synthetic Training Corpus
//!
//! No observed impact data exists, so the models are trained on uniformly
//! sampled inputs labeled by fixed linear formulas. The formulas are
//! placeholders standing in for real outcomes.

use feature_engine::{FEATURE_DIMENSION, FEATURE_NAMES};
use ndarray::{Array2, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::predictor::IMPACT_DIMENSION;
use crate::InferenceError;

/// Target column names, in prediction order
pub const TARGET_NAMES: [&str; IMPACT_DIMENSION] =
    ["social_impact", "environmental_impact", "financial_impact"];

/// Sampling range `[low, high)` of each input column, in schema order.
///
/// Derived columns are sampled independently of the raw ones.
const SAMPLING_RANGES: [(f64, f64); FEATURE_DIMENSION] = [
    (10.0, 1000.0),
    (1.0, 10.0),
    (1.0, 10.0),
    (1.0, 10.0),
    (1.0, 10.0),
    (1.0, 10.0),
    (0.0, 100.0),
    (0.0, 100.0),
    (0.0, 100.0),
    (0.0, 100.0),
];

/// Corpus generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Number of rows to generate
    pub n_samples: usize,
    /// RNG seed; equal seeds give identical corpora
    pub seed: u64,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            n_samples: 1000,
            seed: 42,
        }
    }
}

/// Labeled input matrix used for a single fit
#[derive(Debug, Clone)]
pub struct TrainingCorpus {
    columns: Vec<String>,
    inputs: Array2<f64>,
    targets: Array2<f64>,
}

impl TrainingCorpus {
    /// Wrap an existing matrix pair
    pub fn new(
        columns: Vec<String>,
        inputs: Array2<f64>,
        targets: Array2<f64>,
    ) -> Result<Self, InferenceError> {
        if inputs.ncols() != columns.len() {
            return Err(InferenceError::InvalidInputShape {
                expected: columns.len(),
                actual: inputs.ncols(),
            });
        }
        if inputs.nrows() != targets.nrows() {
            return Err(InferenceError::InvalidInputShape {
                expected: inputs.nrows(),
                actual: targets.nrows(),
            });
        }
        Ok(Self {
            columns,
            inputs,
            targets,
        })
    }

    /// Generate the synthetic corpus
    pub fn synthesize(config: &CorpusConfig) -> Self {
        let n = config.n_samples;
        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut inputs = Array2::<f64>::zeros((n, FEATURE_DIMENSION));

        // Column by column, so each column's draws are a contiguous stream
        for (mut column, &(low, high)) in inputs.columns_mut().into_iter().zip(&SAMPLING_RANGES) {
            let width = high - low;
            column.mapv_inplace(|_| low + rng.gen::<f64>() * width);
        }

        let targets = synthetic_targets(inputs.view());
        debug!("Synthesized corpus: {} rows, seed {}", n, config.seed);

        Self {
            columns: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            inputs,
            targets,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn inputs(&self) -> ArrayView2<'_, f64> {
        self.inputs.view()
    }

    pub fn targets(&self) -> ArrayView2<'_, f64> {
        self.targets.view()
    }

    pub fn len(&self) -> usize {
        self.inputs.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Placeholder labels: social, environmental and financial impact as fixed
/// linear blends of the raw columns.
fn synthetic_targets(inputs: ArrayView2<'_, f64>) -> Array2<f64> {
    let mut targets = Array2::<f64>::zeros((inputs.nrows(), IMPACT_DIMENSION));

    for (x, mut y) in inputs.rows().into_iter().zip(targets.rows_mut()) {
        let (size, condition, transport, location, community, energy) =
            (x[0], x[1], x[2], x[3], x[4], x[5]);

        y[0] = 0.3 * community + 0.3 * transport + 0.4 * location;
        y[1] = 0.4 * energy + 0.3 * condition + 0.3 * transport;
        y[2] = 0.4 * location + 0.3 * condition + 0.3 * size / 100.0;
    }

    targets
}
