//! Standard Score Scaling
//!
//! Column-wise `(x - mean) / std` normalization with statistics fitted once
//! on a training matrix and reused for every later transform.

use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the scaler
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScalerError {
    #[error("Cannot fit scaler on an empty matrix")]
    EmptyInput,
    #[error("Expected {expected} columns, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },
}

/// Fitted z-score scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Fit on a `rows × columns` matrix.
    ///
    /// Uses the population standard deviation; columns with zero variance
    /// keep a scale of 1 so they transform to 0.
    pub fn fit(data: ArrayView2<'_, f64>) -> Result<Self, ScalerError> {
        let mean = data.mean_axis(Axis(0)).ok_or(ScalerError::EmptyInput)?;
        if data.ncols() == 0 {
            return Err(ScalerError::EmptyInput);
        }
        let scale = data
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > f64::EPSILON { s } else { 1.0 });

        Ok(Self { mean, scale })
    }

    /// Number of columns the scaler was fitted on
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Per-column means
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    /// Per-column standard deviations
    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    /// Scale a single row
    pub fn transform_row(&self, row: &[f64]) -> Result<Array1<f64>, ScalerError> {
        self.check_width(row.len())?;
        Ok((&Array1::from(row.to_vec()) - &self.mean) / &self.scale)
    }

    /// Scale every row of a matrix
    pub fn transform(&self, data: ArrayView2<'_, f64>) -> Result<Array2<f64>, ScalerError> {
        self.check_width(data.ncols())?;
        Ok((&data - &self.mean) / &self.scale)
    }

    fn check_width(&self, actual: usize) -> Result<(), ScalerError> {
        if actual != self.n_features() {
            return Err(ScalerError::WidthMismatch {
                expected: self.n_features(),
                actual,
            });
        }
        Ok(())
    }
}
