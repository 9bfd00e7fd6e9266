//! Categorical Feature Levels

use crate::error::FeatureEngineeringError;
use flight_validator::{Airline, Flight, FlightType, Month};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const OPERATOR_OFFSET: usize = 0;
const FLIGHT_TYPE_OFFSET: usize = OPERATOR_OFFSET + Airline::ALL.len();
const MONTH_OFFSET: usize = FLIGHT_TYPE_OFFSET + FlightType::ALL.len();

/// Number of levels in the full one-indicator-per-level expansion
pub const UNIVERSE_SIZE: usize = MONTH_OFFSET + 12;

/// One categorical level, e.g. `operator=Grupo LATAM` or `month=7`
///
/// The set of levels is fixed by the enumerated domain, so the full expansion never
/// depends on which values happen to appear in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FeatureLevel {
    Operator(Airline),
    FlightType(FlightType),
    Month(Month),
}

impl FeatureLevel {
    /// Every level in universe order: airlines, flight types, months
    pub fn universe() -> impl Iterator<Item = FeatureLevel> {
        Airline::ALL
            .into_iter()
            .map(FeatureLevel::Operator)
            .chain(FlightType::ALL.into_iter().map(FeatureLevel::FlightType))
            .chain(Month::all().map(FeatureLevel::Month))
    }

    /// Level at a universe position
    pub fn from_universe_index(index: usize) -> Option<Self> {
        Self::universe().nth(index)
    }

    /// Position of this level in the full expansion
    pub fn universe_index(&self) -> usize {
        match self {
            FeatureLevel::Operator(airline) => OPERATOR_OFFSET + airline.index(),
            FeatureLevel::FlightType(flight_type) => FLIGHT_TYPE_OFFSET + flight_type.index(),
            FeatureLevel::Month(month) => MONTH_OFFSET + month.index(),
        }
    }

    /// The three levels a flight activates
    pub fn of_flight(flight: &Flight) -> [FeatureLevel; 3] {
        [
            FeatureLevel::Operator(flight.operator),
            FeatureLevel::FlightType(flight.flight_type),
            FeatureLevel::Month(flight.month),
        ]
    }
}

impl fmt::Display for FeatureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureLevel::Operator(airline) => write!(f, "operator={}", airline),
            FeatureLevel::FlightType(flight_type) => write!(f, "flightType={}", flight_type),
            FeatureLevel::Month(month) => write!(f, "month={}", month),
        }
    }
}

impl FromStr for FeatureLevel {
    type Err = FeatureEngineeringError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || FeatureEngineeringError::UnknownLevel(s.to_string());
        let (name, value) = s.split_once('=').ok_or_else(unknown)?;

        match name {
            "operator" => Airline::from_name(value).map(FeatureLevel::Operator),
            "flightType" => FlightType::from_code(value).map(FeatureLevel::FlightType),
            "month" => value
                .parse::<i64>()
                .ok()
                .and_then(Month::new)
                .map(FeatureLevel::Month),
            _ => None,
        }
        .ok_or_else(unknown)
    }
}

impl TryFrom<String> for FeatureLevel {
    type Error = FeatureEngineeringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FeatureLevel> for String {
    fn from(level: FeatureLevel) -> String {
        level.to_string()
    }
}
