//! Feature Engineering Engine
//!
//! Maps validated property attributes to the ten-column feature vector the
//! impact models are trained on, and provides the scaler fitted on that schema.

mod features;
mod scaler;

pub use features::{FeatureEngine, FeatureVector, FEATURE_DIMENSION, FEATURE_NAMES};
pub use scaler::{ScalerError, StandardScaler};
