//! Domain error types for ComplaintPro.
//!
//! Normalization and categorization are total, so the only failure the
//! classification core can report is invalid input handed to it by a caller.

use thiserror::Error;

/// Errors surfaced by the classification and aggregation core.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClassifyError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl ClassifyError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ClassifyError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Name of the offending input.
    pub fn field(&self) -> &'static str {
        match self {
            ClassifyError::InvalidInput { field, .. } => *field,
        }
    }
}

pub type ClassifyResult<T> = Result<T, ClassifyError>;
