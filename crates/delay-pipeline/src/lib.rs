//! Flight Delay Pipeline
//!
//! Wires validation, feature engineering, encoding and classification into the offline
//! training flow and the per-request serving flow.

mod dataset;
mod report;
mod serving;
mod training;

pub use dataset::{DatasetError, FlightDataset, HistoricalFlight};
pub use report::{ClassMetrics, ClassificationReport, FeatureWeight, SegmentRate, TrainingReport};
pub use serving::DelayPredictor;
pub use training::{Trainer, TrainingConfig, TrainingOutcome};

use delay_classifier::{PredictionError, TrainingError};
use feature_engine::FeatureEngineeringError;
use flight_validator::{RejectedFlight, ValidationError};
use model_store::StoreError;
use thiserror::Error;

/// Errors of an offline training run
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: ValidationError,
    },
    #[error("row {row}: {source}")]
    FeatureEngineering {
        row: usize,
        #[source]
        source: FeatureEngineeringError,
    },
    #[error("training failed: {0}")]
    Training(#[from] TrainingError),
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
    #[error("saving model failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors while serving a prediction request
#[derive(Debug, Error)]
pub enum ServeError {
    /// At least one flight failed validation; no labels are produced
    #[error("{} flight(s) failed validation, first: {}", .0.len(), .0.first().map(|r| r.to_string()).unwrap_or_default())]
    Rejected(Vec<RejectedFlight>),
    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
}
