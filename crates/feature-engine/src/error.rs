//! Feature Error Types

use thiserror::Error;

/// Errors while deriving features from historical flights
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureEngineeringError {
    /// Timestamp could not be parsed
    #[error("{field} timestamp '{value}' is malformed (expected {expected})")]
    MalformedTimestamp {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Feature level identifier could not be parsed
    #[error("unknown feature level '{0}'")]
    UnknownLevel(String),

    /// Canonical order lists the same level twice
    #[error("feature level '{0}' appears more than once")]
    DuplicateLevel(String),

    /// Canonical order has the wrong number of levels
    #[error("canonical order must have {expected} levels, got {actual}")]
    OrderLength { expected: usize, actual: usize },
}
