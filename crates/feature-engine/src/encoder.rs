//! Categorical Encoding onto the Canonical Feature Order

use crate::error::FeatureEngineeringError;
use crate::features::{FeatureVector, FEATURE_DIMENSION};
use crate::level::{FeatureLevel, UNIVERSE_SIZE};
use flight_validator::Flight;
use std::cmp::Ordering;
use tracing::{debug, info};

/// The frozen list of levels that defines the feature vector layout
///
/// Carries a universe-index lookup table so encoding never re-derives the schema
/// from incoming data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalOrder {
    levels: [FeatureLevel; FEATURE_DIMENSION],
    /// universe index -> vector position
    slots: [Option<u8>; UNIVERSE_SIZE],
}

impl CanonicalOrder {
    /// Build an order from distinct levels
    pub fn new(levels: [FeatureLevel; FEATURE_DIMENSION]) -> Result<Self, FeatureEngineeringError> {
        let mut slots = [None; UNIVERSE_SIZE];
        for (position, level) in levels.iter().enumerate() {
            let slot = &mut slots[level.universe_index()];
            if slot.is_some() {
                return Err(FeatureEngineeringError::DuplicateLevel(level.to_string()));
            }
            *slot = Some(position as u8);
        }
        Ok(Self { levels, slots })
    }

    /// Parse an order from level identifiers such as `"month=7"`
    pub fn from_identifiers<S: AsRef<str>>(identifiers: &[S]) -> Result<Self, FeatureEngineeringError> {
        if identifiers.len() != FEATURE_DIMENSION {
            return Err(FeatureEngineeringError::OrderLength {
                expected: FEATURE_DIMENSION,
                actual: identifiers.len(),
            });
        }

        let parsed = identifiers
            .iter()
            .map(|id| id.as_ref().parse::<FeatureLevel>())
            .collect::<Result<Vec<_>, _>>()?;
        let levels: [FeatureLevel; FEATURE_DIMENSION] =
            parsed
                .try_into()
                .map_err(|v: Vec<FeatureLevel>| FeatureEngineeringError::OrderLength {
                    expected: FEATURE_DIMENSION,
                    actual: v.len(),
                })?;
        Self::new(levels)
    }

    pub fn levels(&self) -> &[FeatureLevel; FEATURE_DIMENSION] {
        &self.levels
    }

    /// Level identifiers in vector order
    pub fn identifiers(&self) -> Vec<String> {
        self.levels.iter().map(|l| l.to_string()).collect()
    }

    /// Vector position of a level, `None` when the level is not canonical
    pub fn position(&self, level: &FeatureLevel) -> Option<usize> {
        self.slots[level.universe_index()].map(usize::from)
    }

    /// Vector position of a universe column
    pub fn position_of_universe_index(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten().map(usize::from)
    }
}

/// Encodes flights into feature vectors
#[derive(Debug, Clone)]
pub struct FeatureEncoder {
    order: CanonicalOrder,
}

impl FeatureEncoder {
    /// Create an encoder bound to a frozen order
    pub fn new(order: CanonicalOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> &CanonicalOrder {
        &self.order
    }

    /// One indicator per level over the whole universe
    pub fn expand(flight: &Flight) -> [f64; UNIVERSE_SIZE] {
        let mut row = [0.0; UNIVERSE_SIZE];
        Self::expand_into(flight, &mut row);
        row
    }

    /// Set the flight's three indicators in a zeroed full-expansion row
    pub fn expand_into(flight: &Flight, row: &mut [f64; UNIVERSE_SIZE]) {
        for level in FeatureLevel::of_flight(flight) {
            row[level.universe_index()] = 1.0;
        }
    }

    /// Freeze the `FEATURE_DIMENSION` most important levels as the canonical order
    ///
    /// Importance is the magnitude of each universe column's score; non-finite scores
    /// count as zero and ties keep universe order.
    pub fn fit_order(importances: &[f64; UNIVERSE_SIZE]) -> CanonicalOrder {
        let magnitude = |i: usize| {
            let v = importances[i].abs();
            if v.is_finite() {
                v
            } else {
                0.0
            }
        };

        let mut ranked: Vec<usize> = (0..UNIVERSE_SIZE).collect();
        ranked.sort_by(|&a, &b| match magnitude(b).total_cmp(&magnitude(a)) {
            Ordering::Equal => a.cmp(&b),
            other => other,
        });

        let levels: [FeatureLevel; FEATURE_DIMENSION] = std::array::from_fn(|position| {
            let index = ranked[position];
            debug!("Canonical feature {}: universe column {} ({:.4})", position, index, magnitude(index));
            universe_level(index)
        });

        let order = CanonicalOrder::new(levels)
            .unwrap_or_else(|_| unreachable!("ranked universe indices are distinct"));
        info!("Selected canonical features: {:?}", order.identifiers());
        order
    }

    /// Encode a validated flight; levels outside the canonical order contribute nothing
    pub fn encode(&self, flight: &Flight) -> FeatureVector {
        let mut features = FeatureVector::default();
        for level in FeatureLevel::of_flight(flight) {
            if let Some(position) = self.order.position(&level) {
                features.values[position] = 1.0;
            }
        }
        features
    }

    /// Encode flights in input order
    pub fn encode_batch(&self, flights: &[Flight]) -> Vec<FeatureVector> {
        flights.iter().map(|f| self.encode(f)).collect()
    }

    /// Select the canonical columns out of a full expansion row
    pub fn project(&self, row: &[f64]) -> FeatureVector {
        FeatureVector::new(std::array::from_fn(|position| {
            row.get(self.order.levels[position].universe_index())
                .copied()
                .unwrap_or(0.0)
        }))
    }
}

fn universe_level(index: usize) -> FeatureLevel {
    FeatureLevel::from_universe_index(index)
        .unwrap_or_else(|| unreachable!("universe index {} out of range", index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_validator::{Airline, FlightType, Month};
    use proptest::prelude::*;

    fn reference_order() -> CanonicalOrder {
        CanonicalOrder::from_identifiers(&[
            "operator=Latin American Wings",
            "month=7",
            "month=10",
            "operator=Grupo LATAM",
            "month=12",
            "flightType=I",
            "month=4",
            "month=11",
            "operator=Sky Airline",
            "operator=Copa Air",
        ])
        .unwrap()
    }

    fn flight(operator: Airline, flight_type: FlightType, month: i64) -> Flight {
        Flight::new(operator, flight_type, Month::new(month).unwrap())
    }

    #[test]
    fn test_encode_known_levels() {
        let encoder = FeatureEncoder::new(reference_order());
        let features = encoder.encode(&flight(Airline::GrupoLatam, FlightType::International, 7));
        assert_eq!(
            features.values,
            [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn test_unknown_levels_encode_to_zero() {
        let encoder = FeatureEncoder::new(reference_order());
        let features = encoder.encode(&flight(Airline::AerolineasArgentinas, FlightType::Domestic, 3));
        assert_eq!(features, FeatureVector::default());
    }

    #[test]
    fn test_project_matches_encode() {
        let encoder = FeatureEncoder::new(reference_order());
        let f = flight(Airline::CopaAir, FlightType::International, 12);
        assert_eq!(encoder.project(&FeatureEncoder::expand(&f)), encoder.encode(&f));
    }

    #[test]
    fn test_order_rejects_duplicates_and_bad_length() {
        let mut ids = reference_order().identifiers();
        ids[9] = "month=7".to_string();
        assert!(matches!(
            CanonicalOrder::from_identifiers(&ids),
            Err(FeatureEngineeringError::DuplicateLevel(_))
        ));

        let short = &reference_order().identifiers()[..8];
        assert_eq!(
            CanonicalOrder::from_identifiers(short),
            Err(FeatureEngineeringError::OrderLength { expected: 10, actual: 8 })
        );
    }

    #[test]
    fn test_fit_order_ranks_by_magnitude() {
        let mut importances = [0.0; UNIVERSE_SIZE];
        let month_7 = FeatureLevel::Month(Month::new(7).unwrap());
        let latam = FeatureLevel::Operator(Airline::GrupoLatam);
        importances[month_7.universe_index()] = -3.0;
        importances[latam.universe_index()] = 2.0;
        importances[0] = f64::NAN;

        let order = FeatureEncoder::fit_order(&importances);
        assert_eq!(order.levels()[0], month_7);
        assert_eq!(order.levels()[1], latam);
        // zero-importance ties fall back to universe order
        assert_eq!(order.levels()[2], FeatureLevel::from_universe_index(0).unwrap());
        assert_eq!(order.levels()[3], FeatureLevel::from_universe_index(1).unwrap());
    }

    #[test]
    fn test_position_lookup() {
        let order = reference_order();
        assert_eq!(order.position(&FeatureLevel::FlightType(FlightType::International)), Some(5));
        assert_eq!(order.position(&FeatureLevel::FlightType(FlightType::Domestic)), None);
        assert_eq!(order.position_of_universe_index(UNIVERSE_SIZE + 3), None);
    }

    fn any_flight() -> impl Strategy<Value = Flight> {
        (0..Airline::ALL.len(), 0..2usize, 1i64..=12).prop_map(|(a, t, m)| {
            Flight::new(Airline::ALL[a], FlightType::ALL[t], Month::new(m).unwrap())
        })
    }

    proptest! {
        #[test]
        fn prop_encoding_is_fixed_length_indicator(f in any_flight()) {
            let features = FeatureEncoder::new(reference_order()).encode(&f);
            prop_assert_eq!(features.values.len(), FEATURE_DIMENSION);
            prop_assert!(features.active_count() <= 3);
            prop_assert!(features.values.iter().all(|v| *v == 0.0 || *v == 1.0));
        }

        #[test]
        fn prop_full_expansion_has_three_indicators(f in any_flight()) {
            let row = FeatureEncoder::expand(&f);
            prop_assert_eq!(row.iter().filter(|v| **v == 1.0).count(), 3);

            let mut reused = [0.0; UNIVERSE_SIZE];
            FeatureEncoder::expand_into(&f, &mut reused);
            prop_assert_eq!(reused, row);
        }
    }
}
