//! Trained Model Bundle

use crate::classifier::DelayClassifier;
use crate::PredictionError;
use feature_engine::{CanonicalOrder, FeatureEncoder, FeatureVector, Label, FEATURE_DIMENSION};
use flight_validator::Flight;

/// Immutable bundle of classifier parameters and the canonical feature order
///
/// Built once per training run or artifact load; shared read-only across requests.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    classifier: DelayClassifier,
    encoder: FeatureEncoder,
    positive_class: Label,
}

impl TrainedModel {
    /// Bundle parameters with the order they were fit against
    pub fn new(coefficients: [f64; FEATURE_DIMENSION], intercept: f64, order: CanonicalOrder) -> Self {
        Self {
            classifier: DelayClassifier::from_parameters(coefficients.to_vec(), intercept),
            encoder: FeatureEncoder::new(order),
            positive_class: Label::Delayed,
        }
    }

    pub fn coefficients(&self) -> &[f64] {
        self.classifier.coefficients()
    }

    pub fn intercept(&self) -> f64 {
        self.classifier.intercept()
    }

    pub fn order(&self) -> &CanonicalOrder {
        self.encoder.order()
    }

    /// Label the classifier's positive side stands for
    pub fn positive_class(&self) -> Label {
        self.positive_class
    }

    /// Encode a validated flight against the canonical order
    pub fn encode(&self, flight: &Flight) -> FeatureVector {
        self.encoder.encode(flight)
    }

    /// Probability that the flight is delayed
    pub fn predict_proba(&self, features: &FeatureVector) -> Result<f64, PredictionError> {
        self.classifier.predict_proba(features.as_slice())
    }

    pub fn predict(&self, features: &FeatureVector) -> Result<Label, PredictionError> {
        self.classifier.predict(features.as_slice())
    }

    /// Predict each vector independently, preserving input order
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<Label>, PredictionError> {
        features.iter().map(|f| self.predict(f)).collect()
    }

    /// Encode and predict validated flights
    pub fn predict_flights(&self, flights: &[Flight]) -> Result<Vec<Label>, PredictionError> {
        flights.iter().map(|f| self.predict(&self.encode(f))).collect()
    }
}
