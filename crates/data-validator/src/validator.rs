//! Validator for Range Checking

use crate::error::ValidationError;
use crate::input::{PropertySubmission, RawInput};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Property size valid range (m²)
    pub size_range: (f64, f64),
    /// Valid range shared by condition and the four scores
    pub score_range: (f64, f64),
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            size_range: (10.0, 1000.0),
            score_range: (1.0, 10.0),
        }
    }
}

/// Outcome of validating a submission
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationResult {
    /// Every field present and in range
    Valid(RawInput),
    /// One entry per failing field
    Invalid(Vec<ValidationError>),
}

impl ValidationResult {
    /// Whether the submission passed
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid(_))
    }

    /// Convert into a standard result
    pub fn into_result(self) -> Result<RawInput, Vec<ValidationError>> {
        match self {
            ValidationResult::Valid(input) => Ok(input),
            ValidationResult::Invalid(errors) => Err(errors),
        }
    }
}

/// Validator for property submissions
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate a single value against a range (inclusive on both ends)
    pub fn validate_range(
        &self,
        field: &'static str,
        value: f64,
        range: (f64, f64),
    ) -> Result<(), ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite { field, value });
        }
        if value < range.0 || value > range.1 {
            Err(ValidationError::OutOfRange {
                field,
                value,
                min: range.0,
                max: range.1,
            })
        } else {
            Ok(())
        }
    }

    /// Range a given field is checked against
    pub fn range_for(&self, field: &str) -> (f64, f64) {
        if field == "size" {
            self.config.size_range
        } else {
            self.config.score_range
        }
    }

    /// Validate a submission, collecting every failing field
    pub fn validate(&self, submission: &PropertySubmission) -> ValidationResult {
        let mut errors = Vec::new();
        let mut values = [0.0; 6];

        for (slot, (field, value)) in values.iter_mut().zip(submission.fields()) {
            match value {
                None => errors.push(ValidationError::MissingField(field)),
                Some(value) => match self.validate_range(field, value, self.range_for(field)) {
                    Ok(()) => *slot = value,
                    Err(e) => errors.push(e),
                },
            }
        }

        if errors.is_empty() {
            ValidationResult::Valid(RawInput::from_checked(values))
        } else {
            debug!("Submission rejected with {} error(s)", errors.len());
            ValidationResult::Invalid(errors)
        }
    }

    /// Get the active configuration
    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}
