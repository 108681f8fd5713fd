//! Bagged Decision-Tree Ensemble

use ndarray::{Array1, ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::regressor::{check_row_width, check_training_shapes, Regressor};
use crate::tree::{GrowerParams, RegressionTree};
use crate::InferenceError;

/// Random forest parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees
    pub n_estimators: usize,
    /// Maximum tree depth (`None` = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum rows required to split a node
    pub min_samples_split: usize,
    /// Minimum rows per leaf
    pub min_samples_leaf: usize,
    /// Draw each tree's rows with replacement
    pub bootstrap: bool,
    /// Seed for row sampling
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn grower_params(&self) -> GrowerParams {
        GrowerParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
            reg_lambda: 0.0,
        }
    }
}

/// Averages multi-output CART trees grown on bootstrap samples
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl RandomForestRegressor {
    /// Create an unfitted forest
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn trees(&self) -> &[RegressionTree] {
        &self.trees
    }
}

impl Default for RandomForestRegressor {
    fn default() -> Self {
        Self::new(ForestParams::default())
    }
}

impl Regressor for RandomForestRegressor {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(
        &mut self,
        inputs: ArrayView2<'_, f64>,
        targets: ArrayView2<'_, f64>,
    ) -> Result<(), InferenceError> {
        check_training_shapes(inputs, targets)?;
        if self.params.n_estimators == 0 {
            return Err(InferenceError::InvalidParams {
                model: self.name().to_string(),
                reason: "n_estimators must be at least 1".to_string(),
            });
        }

        let n = inputs.nrows();
        let grower = self.params.grower_params();
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let mut rows = vec![0usize; n];

        self.trees = (0..self.params.n_estimators)
            .map(|_| {
                if self.params.bootstrap {
                    rows.iter_mut().for_each(|r| *r = rng.gen_range(0..n));
                } else {
                    rows.iter_mut().enumerate().for_each(|(i, r)| *r = i);
                }
                RegressionTree::grow(inputs, targets, &rows, &grower)
            })
            .collect();
        self.n_features = inputs.ncols();

        debug!(
            "Random forest fitted: {} trees, max depth {}",
            self.trees.len(),
            self.trees.iter().map(RegressionTree::depth).max().unwrap_or(0)
        );
        Ok(())
    }

    fn predict(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        let first = self
            .trees
            .first()
            .ok_or_else(|| InferenceError::NotFitted(self.name().to_string()))?;
        check_row_width(self.n_features, row)?;

        let mut sum = Array1::<f64>::zeros(first.n_outputs());
        for tree in &self.trees {
            sum += &ArrayView1::from(tree.predict(row));
        }
        Ok(sum / self.trees.len() as f64)
    }

    fn n_outputs(&self) -> Option<usize> {
        self.trees.first().map(RegressionTree::n_outputs)
    }
}
