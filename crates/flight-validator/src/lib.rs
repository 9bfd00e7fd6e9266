//! Flight Input Validation
//!
//! Gates raw flight attribute triples (operator, flight type, month) before they
//! reach feature engineering.

mod error;
mod flight;
mod validator;

pub use error::{Field, RejectedFlight, ValidationError};
pub use flight::{Airline, Flight, FlightType, Month, RawFlight};
pub use validator::{ValidationConfig, ValidationResult, Validator};
