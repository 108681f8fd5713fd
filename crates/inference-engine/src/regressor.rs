//! Regressor Capability

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::InferenceError;

/// A multi-output regression model the ensemble can fit and query.
///
/// Implementations receive already-scaled inputs.
pub trait Regressor: Send + Sync {
    /// Short identifier used in logs and per-model predictions
    fn name(&self) -> &str;

    /// Fit on `rows × features` inputs and `rows × outputs` targets
    fn fit(
        &mut self,
        inputs: ArrayView2<'_, f64>,
        targets: ArrayView2<'_, f64>,
    ) -> Result<(), InferenceError>;

    /// Predict every output for one row
    fn predict(&self, row: ArrayView1<'_, f64>) -> Result<Array1<f64>, InferenceError>;

    /// Number of outputs, once fitted
    fn n_outputs(&self) -> Option<usize>;
}

/// Shape checks shared by regressor implementations
pub(crate) fn check_training_shapes(
    inputs: ArrayView2<'_, f64>,
    targets: ArrayView2<'_, f64>,
) -> Result<(), InferenceError> {
    if inputs.nrows() == 0 || inputs.ncols() == 0 || targets.ncols() == 0 {
        return Err(InferenceError::EmptyCorpus);
    }
    if inputs.nrows() != targets.nrows() {
        return Err(InferenceError::InvalidInputShape {
            expected: inputs.nrows(),
            actual: targets.nrows(),
        });
    }
    Ok(())
}

pub(crate) fn check_row_width(expected: usize, row: ArrayView1<'_, f64>) -> Result<(), InferenceError> {
    if row.len() != expected {
        return Err(InferenceError::InvalidInputShape {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}
