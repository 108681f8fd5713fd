//! Gradient-Boosted Tree Ensemble
//!
//! Squared-error boosting with one tree per output per round. Under squared
//! loss the gradient is `pred - y` and the hessian is 1, so each round fits a
//! regularized tree to the current residuals.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::regressor::{check_row_width, check_training_shapes, Regressor};
use crate::tree::{GrowerParams, RegressionTree};
use crate::InferenceError;

/// Gradient boosting parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostingParams {
    /// Boosting rounds
    pub n_estimators: usize,
    /// Shrinkage applied to every tree (eta)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// L2 regularization (lambda)
    pub reg_lambda: f64,
    /// Minimum hessian sum per child; equals a row count under squared loss
    pub min_child_weight: f64,
}

impl Default for BoostingParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.3,
            max_depth: 6,
            reg_lambda: 1.0,
            min_child_weight: 1.0,
        }
    }
}

impl BoostingParams {
    fn grower_params(&self) -> GrowerParams {
        GrowerParams {
            max_depth: Some(self.max_depth),
            min_samples_split: 2,
            min_samples_leaf: self.min_child_weight.ceil().max(1.0) as usize,
            reg_lambda: self.reg_lambda,
        }
    }
}

/// Additive tree model fitted stage-wise on residuals
#[derive(Debug, Clone)]
pub struct GradientBoostedRegressor {
    params: BoostingParams,
    /// Initial prediction per output (target mean)
    base_score: Vec<f64>,
    /// Trees indexed by output, then round
    trees: Vec<Vec<RegressionTree>>,
    n_features: usize,
}

impl GradientBoostedRegressor {
    /// Create an unfitted booster
    pub fn new(params: BoostingParams) -> Self {
        Self {
            params,
            base_score: Vec::new(),
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn params(&self) -> &BoostingParams {
        &self.params
    }

    pub fn base_score(&self) -> &[f64] {
        &self.base_score
    }

    /// Trees fitted for one output
    pub fn trees_for_output(&self, output: usize) -> &[RegressionTree] {
        self.trees.get(output).map(Vec::as_slice).unwrap_or(&[])
    }

    fn fit_output(
        &self,
        inputs: ArrayView2<'_, f64>,
        target: ArrayView1<'_, f64>,
        base: f64,
    ) -> Vec<RegressionTree> {
        let n = inputs.nrows();
        let rows: Vec<usize> = (0..n).collect();
        let grower = self.params.grower_params();
        let eta = self.params.learning_rate;

        let mut pred = Array1::from_elem(n, base);
        let mut residual = Array2::<f64>::zeros((n, 1));
        let mut trees = Vec::with_capacity(self.params.n_estimators);

        for _ in 0..self.params.n_estimators {
            residual.column_mut(0).assign(&(&target - &pred));
            let tree = RegressionTree::grow(inputs, residual.view(), &rows, &grower);
            for (p, x) in pred.iter_mut().zip(inputs.rows()) {
                *p += eta * tree.predict(x)[0];
            }
            trees.push(tree);
        }

        trees
    }
}

impl Default for GradientBoostedRegressor {
    fn default() -> Self {
        Self::new(BoostingParams::default())
    }
}

impl Regressor for GradientBoostedRegressor {
    fn name(&self) -> &str {
        "gradient_boosting"
    }

    fn fit(
        &mut self,
        inputs: ArrayView2<'_, f64>,
        targets: ArrayView2<'_, f64>,
    ) -> Result<(), InferenceError> {
        check_training_shapes(inputs, targets)?;

        let base_score: Vec<f64> = targets
            .mean_axis(Axis(0))
            .ok_or(InferenceError::EmptyCorpus)?
            .to_vec();

        let trees: Vec<Vec<RegressionTree>> = targets
            .columns()
            .into_iter()
            .zip(&base_score)
            .map(|(target, &base)| self.fit_output(inputs, target, base))
            .collect();

        self.base_score = base_score;
        self.trees = trees;
        self.n_features = inputs.ncols();

        debug!(
            "Gradient boosting fitted: {} outputs x {} rounds",
            self.trees.len(),
            self.params.n_estimators
        );
        Ok(())
    }

    fn predict(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError> {
        if self.base_score.is_empty() {
            return Err(InferenceError::NotFitted(self.name().to_string()));
        }
        check_row_width(self.n_features, row)?;

        let eta = self.params.learning_rate;
        let values = self
            .base_score
            .iter()
            .zip(&self.trees)
            .map(|(base, trees)| base + eta * trees.iter().map(|t| t.predict(row)[0]).sum::<f64>())
            .collect::<Vec<_>>();
        Ok(Array1::from(values))
    }

    fn n_outputs(&self) -> Option<usize> {
        if self.base_score.is_empty() {
            None
        } else {
            Some(self.base_score.len())
        }
    }
}
