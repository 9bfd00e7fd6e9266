//! Delay Classifier
//!
//! Balanced logistic regression fit by Newton iterations, and the immutable trained
//! model bundle used for serving.

mod classifier;
mod model;
mod solver;

pub use classifier::{ClassWeighting, ClassifierConfig, DelayClassifier};
pub use model::TrainedModel;

use feature_engine::Label;
use thiserror::Error;

/// Errors while fitting the classifier
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("training set is empty")]
    EmptyDataset,
    #[error("training labels contain a single class ({0:?}); no separating boundary exists")]
    SingleClass(Label),
    #[error("feature matrix has {rows} rows but {labels} labels were given")]
    ShapeMismatch { rows: usize, labels: usize },
    #[error("Hessian is not positive definite at iteration {iteration}")]
    Singular { iteration: usize },
    #[error("parameters diverged to non-finite values at iteration {iteration}")]
    Diverged { iteration: usize },
}

/// Errors during inference. Signals a defect, never a user error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Invalid input shape: expected {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("decision value is not finite ({0})")]
    NonFinite(f64),
}
