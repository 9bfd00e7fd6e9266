//! Model Store
//!
//! Saves and loads trained delay models as JSON or postcard artifacts.

mod store;

pub use store::{ArtifactFormat, ModelArtifact, ModelStore};

use feature_engine::FeatureEngineeringError;
use std::path::PathBuf;
use thiserror::Error;

/// Artifact could not be turned back into a usable model
#[derive(Debug, Error)]
pub enum CorruptArtifactError {
    #[error("cannot read model artifact {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("model artifact is malformed: {0}")]
    Malformed(String),
    #[error("coefficient vector has {coefficients} entries but feature order has {order}")]
    LengthMismatch { coefficients: usize, order: usize },
    #[error("invalid feature order: {0}")]
    InvalidOrder(#[from] FeatureEngineeringError),
    #[error("{field} contains a non-finite value")]
    NonFinite { field: &'static str },
    #[error("positive class must be the delayed label (1), got {0}")]
    UnexpectedPositiveClass(u8),
}

/// Errors while writing an artifact
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Serialization error: {0}")]
    SerializationError(String),
}
