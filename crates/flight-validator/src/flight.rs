//! Flight Domain Types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Airlines operating at the airport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Airline {
    AmericanAirlines,
    AirCanada,
    AirFrance,
    Aeromexico,
    AerolineasArgentinas,
    Austral,
    Avianca,
    Alitalia,
    BritishAirways,
    CopaAir,
    DeltaAir,
    GolTrans,
    Iberia,
    Klm,
    QantasAirways,
    UnitedAirlines,
    GrupoLatam,
    SkyAirline,
    LatinAmericanWings,
    PlusUltraLineasAereas,
    JetSmartSpa,
    OceanairLinhasAereas,
    Lacsa,
}

impl Airline {
    /// Every known carrier, in index order
    pub const ALL: [Airline; 23] = [
        Airline::AmericanAirlines,
        Airline::AirCanada,
        Airline::AirFrance,
        Airline::Aeromexico,
        Airline::AerolineasArgentinas,
        Airline::Austral,
        Airline::Avianca,
        Airline::Alitalia,
        Airline::BritishAirways,
        Airline::CopaAir,
        Airline::DeltaAir,
        Airline::GolTrans,
        Airline::Iberia,
        Airline::Klm,
        Airline::QantasAirways,
        Airline::UnitedAirlines,
        Airline::GrupoLatam,
        Airline::SkyAirline,
        Airline::LatinAmericanWings,
        Airline::PlusUltraLineasAereas,
        Airline::JetSmartSpa,
        Airline::OceanairLinhasAereas,
        Airline::Lacsa,
    ];

    /// Operator name as it appears in flight records
    pub fn as_str(&self) -> &'static str {
        match self {
            Airline::AmericanAirlines => "American Airlines",
            Airline::AirCanada => "Air Canada",
            Airline::AirFrance => "Air France",
            Airline::Aeromexico => "Aeromexico",
            Airline::AerolineasArgentinas => "Aerolineas Argentinas",
            Airline::Austral => "Austral",
            Airline::Avianca => "Avianca",
            Airline::Alitalia => "Alitalia",
            Airline::BritishAirways => "British Airways",
            Airline::CopaAir => "Copa Air",
            Airline::DeltaAir => "Delta Air",
            Airline::GolTrans => "Gol Trans",
            Airline::Iberia => "Iberia",
            Airline::Klm => "K.L.M.",
            Airline::QantasAirways => "Qantas Airways",
            Airline::UnitedAirlines => "United Airlines",
            Airline::GrupoLatam => "Grupo LATAM",
            Airline::SkyAirline => "Sky Airline",
            Airline::LatinAmericanWings => "Latin American Wings",
            Airline::PlusUltraLineasAereas => "Plus Ultra Lineas Aereas",
            Airline::JetSmartSpa => "JetSmart SPA",
            Airline::OceanairLinhasAereas => "Oceanair Linhas Aereas",
            Airline::Lacsa => "Lacsa",
        }
    }

    /// Look up a carrier by its exact operator name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|a| a.as_str() == name)
    }

    /// Position in [`Airline::ALL`]
    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for Airline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Flight type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FlightType {
    /// `I`
    International,
    /// `N`
    Domestic,
}

impl FlightType {
    pub const ALL: [FlightType; 2] = [FlightType::International, FlightType::Domestic];

    /// Single-letter code used in flight records
    pub fn code(&self) -> &'static str {
        match self {
            FlightType::International => "I",
            FlightType::Domestic => "N",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "I" => Some(FlightType::International),
            "N" => Some(FlightType::Domestic),
            _ => None,
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for FlightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Calendar month, always in 1..=12
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u8")]
pub struct Month(u8);

impl Month {
    pub const MIN: i64 = 1;
    pub const MAX: i64 = 12;

    /// Build a month, `None` when outside 1..=12
    pub fn new(value: i64) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Some(Month(value as u8))
        } else {
            None
        }
    }

    /// Months January through December
    pub fn all() -> impl Iterator<Item = Month> {
        (1..=12u8).map(Month)
    }

    pub fn number(&self) -> u8 {
        self.0
    }

    /// Zero-based position (January = 0)
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }
}

impl From<Month> for u8 {
    fn from(month: Month) -> u8 {
        month.0
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unvalidated flight attributes as received at the boundary
///
/// Accepts both the descriptive field names and the historical column names
/// (`OPERA`, `TIPOVUELO`, `MES`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFlight {
    #[serde(alias = "OPERA")]
    pub operator: String,
    #[serde(rename = "flightType", alias = "TIPOVUELO")]
    pub flight_type: String,
    #[serde(alias = "MES")]
    pub month: i64,
}

impl RawFlight {
    pub fn new(operator: impl Into<String>, flight_type: impl Into<String>, month: i64) -> Self {
        Self {
            operator: operator.into(),
            flight_type: flight_type.into(),
            month,
        }
    }
}

/// A flight whose attributes passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Flight {
    pub operator: Airline,
    pub flight_type: FlightType,
    pub month: Month,
}

impl Flight {
    pub fn new(operator: Airline, flight_type: FlightType, month: Month) -> Self {
        Self {
            operator,
            flight_type,
            month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airline_names_round_trip() {
        for airline in Airline::ALL {
            assert_eq!(Airline::from_name(airline.as_str()), Some(airline));
        }
        assert_eq!(Airline::ALL.len(), 23);
    }

    #[test]
    fn test_airline_index_matches_position() {
        for (i, airline) in Airline::ALL.iter().enumerate() {
            assert_eq!(airline.index(), i);
        }
    }

    #[test]
    fn test_airline_lookup_is_exact() {
        assert_eq!(Airline::from_name("grupo latam"), None);
        assert_eq!(Airline::from_name(" Grupo LATAM"), None);
        assert_eq!(Airline::from_name("Grupo LATAM"), Some(Airline::GrupoLatam));
    }

    #[test]
    fn test_month_bounds() {
        assert!(Month::new(0).is_none());
        assert_eq!(Month::new(1).map(|m| m.index()), Some(0));
        assert_eq!(Month::new(12).map(|m| m.number()), Some(12));
        assert!(Month::new(13).is_none());
        assert_eq!(Month::all().count(), 12);
    }

    #[test]
    fn test_raw_flight_accepts_historical_names() {
        let json = r#"{"OPERA": "Aerolineas Argentinas", "TIPOVUELO": "N", "MES": 3}"#;
        let raw: RawFlight = serde_json::from_str(json).unwrap();
        assert_eq!(raw, RawFlight::new("Aerolineas Argentinas", "N", 3));

        let json = r#"{"operator": "Iberia", "flightType": "I", "month": 7}"#;
        let raw: RawFlight = serde_json::from_str(json).unwrap();
        assert_eq!(raw.flight_type, "I");
    }
}
