//! Serving Handle

use crate::ServeError;
use delay_classifier::TrainedModel;
use feature_engine::Label;
use flight_validator::{RawFlight, ValidationConfig, Validator};
use model_store::{CorruptArtifactError, ModelStore};
use tracing::{debug, info};

/// Immutable prediction handle built once at process start
///
/// Holds no mutable state, so one instance can serve any number of concurrent
/// requests by shared reference.
#[derive(Debug, Clone)]
pub struct DelayPredictor {
    model: TrainedModel,
    validator: Validator,
}

impl DelayPredictor {
    pub fn new(model: TrainedModel) -> Self {
        Self {
            model,
            validator: Validator::new(ValidationConfig::default()),
        }
    }

    /// Load the model artifact; callers treat failure as fatal
    pub fn load(store: &ModelStore) -> Result<Self, CorruptArtifactError> {
        let model = store.load()?;
        info!("Delay predictor ready ({})", store.path().display());
        Ok(Self::new(model))
    }

    pub fn model(&self) -> &TrainedModel {
        &self.model
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Validate the whole batch, then label every flight in input order
    ///
    /// Any invalid flight rejects the batch; each flight is still checked on its own so
    /// every failure is reported.
    pub fn predict(&self, flights: &[RawFlight]) -> Result<Vec<Label>, ServeError> {
        let validated = self
            .validator
            .validate_batch(flights)
            .into_result()
            .map_err(ServeError::Rejected)?;

        let labels = self.model.predict_flights(&validated)?;
        debug!("Predicted {} flights", labels.len());
        Ok(labels)
    }
}
