//! Feature Engineering Engine
//!
//! Derives temporal signals from historical flights and encodes validated flights into
//! the fixed-length vector the delay classifier consumes.

mod encoder;
mod engineer;
mod error;
mod features;
mod level;

pub use encoder::{CanonicalOrder, FeatureEncoder};
pub use engineer::{
    is_high_season, EngineerConfig, EngineeredRecord, FeatureEngineer, Label, PeriodOfDay,
    ScheduledFlight, TIMESTAMP_FORMAT,
};
pub use error::FeatureEngineeringError;
pub use features::{FeatureVector, FEATURE_DIMENSION};
pub use level::{FeatureLevel, UNIVERSE_SIZE};
