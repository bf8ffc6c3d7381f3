//! Calculator error types

use thiserror::Error;

/// Errors produced by the pregnancy calculators
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    #[error("Invalid date format: {0}")]
    InvalidDateFormat(String),

    #[error("Unsupported date type: {0}")]
    UnsupportedDatingMethod(String),

    #[error("Invalid input. Please enter valid numbers. ({0})")]
    InvalidMetrics(String),

    #[error("Calculation failed: {0}")]
    Computation(String),
}

pub type CalcResult<T> = Result<T, CalcError>;
