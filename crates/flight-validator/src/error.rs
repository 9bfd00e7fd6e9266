//! Validation Error Types

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Input field a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Field {
    #[serde(rename = "operator")]
    Operator,
    #[serde(rename = "flightType")]
    FlightType,
    #[serde(rename = "month")]
    Month,
    /// The batch as a whole
    #[serde(rename = "flights")]
    Flights,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Operator => "operator",
            Field::FlightType => "flightType",
            Field::Month => "month",
            Field::Flights => "flights",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors during flight validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Operator is not one of the known airlines
    #[error("operator '{0}' is not a known airline")]
    UnknownOperator(String),

    /// Flight type is neither `I` nor `N`
    #[error("flightType must be 'I' or 'N', got '{0}'")]
    InvalidFlightType(String),

    /// Month outside 1..=12
    #[error("month must be between 1 and 12, got {0}")]
    MonthOutOfRange(i64),

    /// Month is not an integer
    #[error("month must be an integer, got '{0}'")]
    InvalidMonth(String),

    /// No flights in the request
    #[error("flights must contain at least one flight")]
    EmptyBatch,
}

impl ValidationError {
    /// Field that failed
    pub fn field(&self) -> Field {
        match self {
            ValidationError::UnknownOperator(_) => Field::Operator,
            ValidationError::InvalidFlightType(_) => Field::FlightType,
            ValidationError::MonthOutOfRange(_) | ValidationError::InvalidMonth(_) => Field::Month,
            ValidationError::EmptyBatch => Field::Flights,
        }
    }

    /// Offending value rendered as text
    pub fn value(&self) -> String {
        match self {
            ValidationError::UnknownOperator(v)
            | ValidationError::InvalidFlightType(v)
            | ValidationError::InvalidMonth(v) => v.clone(),
            ValidationError::MonthOutOfRange(v) => v.to_string(),
            ValidationError::EmptyBatch => "[]".to_string(),
        }
    }
}

/// A flight that failed validation, with its position in the batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFlight {
    pub index: usize,
    pub error: ValidationError,
}

impl fmt::Display for RejectedFlight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "flights[{}].{}: {}", self.index, self.error.field(), self.error)
    }
}
