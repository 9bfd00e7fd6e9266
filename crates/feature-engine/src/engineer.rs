//! Temporal Feature Derivation

use crate::error::FeatureEngineeringError;
use chrono::{Datelike, NaiveDateTime, Timelike};
use flight_validator::Flight;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::trace;

/// Timestamp layout of historical schedule/actual departure times
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Year-independent (month, day) ranges, inclusive on both ends
const HIGH_SEASON: [((u32, u32), (u32, u32)); 4] = [
    ((12, 15), (12, 31)),
    ((1, 1), (3, 3)),
    ((7, 15), (7, 31)),
    ((9, 11), (9, 30)),
];

/// Binary delay label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Label {
    OnTime = 0,
    Delayed = 1,
}

impl Label {
    pub fn as_u8(&self) -> u8 {
        *self as u8
    }

    pub fn as_f64(&self) -> f64 {
        self.as_u8() as f64
    }

    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Label::OnTime),
            1 => Some(Label::Delayed),
            _ => None,
        }
    }
}

impl From<Label> for u8 {
    fn from(label: Label) -> u8 {
        label.as_u8()
    }
}

impl TryFrom<u8> for Label {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Label::from_u8(value).ok_or_else(|| format!("label must be 0 or 1, got {}", value))
    }
}

/// Bucket of the scheduled departure hour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeriodOfDay {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 18:59
    Afternoon,
    /// 19:00 - 04:59
    Night,
}

impl PeriodOfDay {
    pub const ALL: [PeriodOfDay; 3] = [PeriodOfDay::Morning, PeriodOfDay::Afternoon, PeriodOfDay::Night];

    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => PeriodOfDay::Morning,
            12..=18 => PeriodOfDay::Afternoon,
            _ => PeriodOfDay::Night,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PeriodOfDay::Morning => "morning",
            PeriodOfDay::Afternoon => "afternoon",
            PeriodOfDay::Night => "night",
        }
    }
}

impl fmt::Display for PeriodOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a calendar date falls inside a high-season range
pub fn is_high_season<D: Datelike>(date: &D) -> bool {
    let key = (date.month(), date.day());
    HIGH_SEASON
        .iter()
        .any(|(start, end)| *start <= key && key <= *end)
}

/// Historical flight with known departure times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledFlight {
    pub flight: Flight,
    /// Scheduled departure, [`TIMESTAMP_FORMAT`]
    pub scheduled: String,
    /// Actual departure, [`TIMESTAMP_FORMAT`]
    pub actual: String,
}

/// Flight plus derived temporal features
#[derive(Debug, Clone, PartialEq)]
pub struct EngineeredRecord {
    pub flight: Flight,
    pub scheduled: NaiveDateTime,
    pub period_of_day: PeriodOfDay,
    pub high_season: bool,
    /// Actual minus scheduled departure, in minutes. Only used to derive the label.
    pub min_diff: f64,
}

/// Feature engineering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineerConfig {
    /// Minutes of departure delay at or above which a flight counts as delayed
    pub delay_threshold_minutes: f64,
}

impl Default for EngineerConfig {
    fn default() -> Self {
        Self {
            delay_threshold_minutes: 15.0,
        }
    }
}

/// Derives period of day, high season and delay minutes from historical flights
#[derive(Debug, Clone, Default)]
pub struct FeatureEngineer {
    config: EngineerConfig,
}

impl FeatureEngineer {
    pub fn new(config: EngineerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineerConfig {
        &self.config
    }

    /// Derive the engineered record for one historical flight
    pub fn engineer(&self, record: &ScheduledFlight) -> Result<EngineeredRecord, FeatureEngineeringError> {
        let scheduled = parse_timestamp("scheduled", &record.scheduled)?;
        let actual = parse_timestamp("actual", &record.actual)?;
        let min_diff = (actual - scheduled).num_seconds() as f64 / 60.0;

        let engineered = EngineeredRecord {
            flight: record.flight,
            scheduled,
            period_of_day: PeriodOfDay::from_hour(scheduled.hour()),
            high_season: is_high_season(&scheduled),
            min_diff,
        };
        trace!("Engineered {:?}", engineered);
        Ok(engineered)
    }

    /// Ground-truth label of an engineered record
    pub fn label(&self, record: &EngineeredRecord) -> Label {
        if record.min_diff >= self.config.delay_threshold_minutes {
            Label::Delayed
        } else {
            Label::OnTime
        }
    }
}

fn parse_timestamp(field: &'static str, value: &str) -> Result<NaiveDateTime, FeatureEngineeringError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|_| {
        FeatureEngineeringError::MalformedTimestamp {
            field,
            value: value.to_string(),
            expected: TIMESTAMP_FORMAT,
        }
    })
}
