//! Property Input Validation
//!
//! Turns loosely-typed form submissions into validated [`RawInput`] records,
//! reporting every missing or out-of-range field.

mod error;
mod input;
mod validator;

pub use error::ValidationError;
pub use input::{PropertySubmission, RawInput, REQUIRED_FIELDS};
pub use validator::{ValidationConfig, ValidationResult, Validator};
