//! Flight Validator

use crate::error::{RejectedFlight, ValidationError};
use crate::flight::{Airline, Flight, FlightType, Month, RawFlight};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Stop checking a batch at the first rejected flight
    pub fail_fast: bool,
}

impl ValidationConfig {
    /// Stop at the first invalid flight
    pub fn fail_fast() -> Self {
        Self { fail_fast: true }
    }
}

/// Result of validating a batch of flights
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Flights that passed, in input order
    pub accepted: Vec<Flight>,
    /// Flights that failed, in input order
    pub rejected: Vec<RejectedFlight>,
    /// Number of flights checked
    pub checked: usize,
}

impl ValidationResult {
    /// Whether every flight in the batch passed
    pub fn is_valid(&self) -> bool {
        self.rejected.is_empty()
    }

    /// All-or-nothing view of the batch: every flight, or every rejection
    pub fn into_result(self) -> Result<Vec<Flight>, Vec<RejectedFlight>> {
        if self.rejected.is_empty() {
            Ok(self.accepted)
        } else {
            Err(self.rejected)
        }
    }
}

/// Validator for raw flight attribute triples
#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Validate the operator against the known airline list
    pub fn validate_operator(&self, operator: &str) -> Result<Airline, ValidationError> {
        Airline::from_name(operator).ok_or_else(|| ValidationError::UnknownOperator(operator.to_string()))
    }

    /// Validate flight type (`I` or `N`)
    pub fn validate_flight_type(&self, flight_type: &str) -> Result<FlightType, ValidationError> {
        FlightType::from_code(flight_type)
            .ok_or_else(|| ValidationError::InvalidFlightType(flight_type.to_string()))
    }

    /// Validate month (1..=12)
    pub fn validate_month(&self, month: i64) -> Result<Month, ValidationError> {
        Month::new(month).ok_or(ValidationError::MonthOutOfRange(month))
    }

    /// Validate a month given as text, as read from historical records
    pub fn parse_month(&self, month: &str) -> Result<Month, ValidationError> {
        let value = month
            .trim()
            .parse::<i64>()
            .map_err(|_| ValidationError::InvalidMonth(month.to_string()))?;
        self.validate_month(value)
    }

    /// Validate a single flight; reports the first failing field
    pub fn validate(&self, raw: &RawFlight) -> Result<Flight, ValidationError> {
        Ok(Flight {
            operator: self.validate_operator(&raw.operator)?,
            flight_type: self.validate_flight_type(&raw.flight_type)?,
            month: self.validate_month(raw.month)?,
        })
    }

    /// Validate every flight of a batch independently
    pub fn validate_batch(&self, flights: &[RawFlight]) -> ValidationResult {
        if flights.is_empty() {
            return ValidationResult {
                accepted: Vec::new(),
                rejected: vec![RejectedFlight {
                    index: 0,
                    error: ValidationError::EmptyBatch,
                }],
                checked: 0,
            };
        }

        let mut accepted = Vec::with_capacity(flights.len());
        let mut rejected = Vec::new();
        let mut checked = 0;

        for (index, raw) in flights.iter().enumerate() {
            checked += 1;
            match self.validate(raw) {
                Ok(flight) => accepted.push(flight),
                Err(error) => {
                    debug!("Rejected flight {}: {}", index, error);
                    rejected.push(RejectedFlight { index, error });
                    if self.config.fail_fast {
                        break;
                    }
                }
            }
        }

        ValidationResult {
            accepted,
            rejected,
            checked,
        }
    }
}
