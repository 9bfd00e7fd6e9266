//! Feature Vector

use serde::{Deserialize, Serialize};

/// Number of features the classifier sees
pub const FEATURE_DIMENSION: usize = 10;

/// Feature vector for delay inference
///
/// Position `i` is bound to the `i`-th level of the canonical order the model was
/// trained with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub values: [f64; FEATURE_DIMENSION],
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_DIMENSION]) -> Self {
        Self { values }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Number of active indicator positions
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|v| **v != 0.0).count()
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            values: [0.0; FEATURE_DIMENSION],
        }
    }
}
