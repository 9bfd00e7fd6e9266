//! Artifact Persistence

use crate::{CorruptArtifactError, StoreError};
use delay_classifier::TrainedModel;
use feature_engine::{CanonicalOrder, Label, FEATURE_DIMENSION};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// On-disk encoding of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    Json,
    Postcard,
}

impl ArtifactFormat {
    /// `.bin` / `.postcard` select postcard, anything else JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("bin") | Some("postcard") => ArtifactFormat::Postcard,
            _ => ArtifactFormat::Json,
        }
    }
}

/// Serialized layout of a trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// One weight per canonical feature, in order
    pub coefficients: Vec<f64>,
    pub intercept: f64,
    /// Level identifiers such as `"operator=Grupo LATAM"`, bound to coefficient positions
    pub feature_order: Vec<String>,
    pub positive_class: u8,
}

impl ModelArtifact {
    pub fn from_model(model: &TrainedModel) -> Self {
        Self {
            coefficients: model.coefficients().to_vec(),
            intercept: model.intercept(),
            feature_order: model.order().identifiers(),
            positive_class: model.positive_class().as_u8(),
        }
    }

    /// Check structure and rebuild the model
    pub fn into_model(self) -> Result<TrainedModel, CorruptArtifactError> {
        if self.coefficients.len() != self.feature_order.len() {
            return Err(CorruptArtifactError::LengthMismatch {
                coefficients: self.coefficients.len(),
                order: self.feature_order.len(),
            });
        }
        if self.positive_class != Label::Delayed.as_u8() {
            return Err(CorruptArtifactError::UnexpectedPositiveClass(self.positive_class));
        }
        if self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(CorruptArtifactError::NonFinite { field: "coefficients" });
        }
        if !self.intercept.is_finite() {
            return Err(CorruptArtifactError::NonFinite { field: "intercept" });
        }

        let order = CanonicalOrder::from_identifiers(&self.feature_order)?;
        let coefficients: [f64; FEATURE_DIMENSION] =
            self.coefficients
                .try_into()
                .map_err(|c: Vec<f64>| CorruptArtifactError::LengthMismatch {
                    coefficients: c.len(),
                    order: FEATURE_DIMENSION,
                })?;

        Ok(TrainedModel::new(coefficients, self.intercept, order))
    }
}

/// Reads and writes model artifacts at a fixed path
#[derive(Debug, Clone)]
pub struct ModelStore {
    path: PathBuf,
    format: ArtifactFormat,
}

impl ModelStore {
    /// Store at `path`, format chosen from the extension
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = ArtifactFormat::from_path(&path);
        Self { path, format }
    }

    pub fn with_format(mut self, format: ArtifactFormat) -> Self {
        self.format = format;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the model, replacing any previous artifact atomically
    pub fn save(&self, model: &TrainedModel) -> Result<(), StoreError> {
        let artifact = ModelArtifact::from_model(model);
        let bytes = match self.format {
            ArtifactFormat::Json => serde_json::to_vec_pretty(&artifact)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?,
            ArtifactFormat::Postcard => postcard::to_allocvec(&artifact)
                .map_err(|e| StoreError::SerializationError(e.to_string()))?,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let staging = self.staging_path();
        if let Err(source) = write_synced(&staging, &bytes) {
            discard(&staging);
            return Err(StoreError::Io { path: staging, source });
        }
        if let Err(source) = fs::rename(&staging, &self.path) {
            discard(&staging);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        info!(
            "Saved model artifact to {} ({:?}, {} bytes)",
            self.path.display(),
            self.format,
            bytes.len()
        );
        Ok(())
    }

    /// Read and verify the artifact
    pub fn load(&self) -> Result<TrainedModel, CorruptArtifactError> {
        let bytes = fs::read(&self.path).map_err(|source| CorruptArtifactError::Unreadable {
            path: self.path.clone(),
            source,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), self.path.display());

        let artifact: ModelArtifact = match self.format {
            ArtifactFormat::Json => serde_json::from_slice(&bytes)
                .map_err(|e| CorruptArtifactError::Malformed(e.to_string()))?,
            ArtifactFormat::Postcard => postcard::from_bytes(&bytes)
                .map_err(|e| CorruptArtifactError::Malformed(e.to_string()))?,
        };

        let model = artifact.into_model()?;
        info!(
            "Loaded model artifact from {} with features {:?}",
            self.path.display(),
            model.order().identifiers()
        );
        Ok(model)
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

/// Remove a staging file left by a failed save
fn discard(staging: &Path) {
    match fs::remove_file(staging) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => warn!("Cannot remove staging file {}: {}", staging.display(), err),
    }
}
