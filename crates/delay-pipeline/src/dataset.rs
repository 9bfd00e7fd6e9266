//! Historical Flight Dataset

use flight_validator::{Flight, RawFlight, ValidationError, Validator};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors while reading the historical dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot open dataset {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset is not valid CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Columns of the historical CSV this system reads; the rest are ignored
#[derive(Debug, Deserialize)]
struct HistoricalRow {
    #[serde(rename = "Fecha-I")]
    scheduled: String,
    #[serde(rename = "Fecha-O")]
    actual: String,
    #[serde(rename = "OPERA")]
    operator: String,
    #[serde(rename = "TIPOVUELO")]
    flight_type: String,
    #[serde(rename = "MES")]
    month: String,
}

/// One historical flight with its known departure times
///
/// Categorical fields are kept as read so that bad values surface as validation
/// errors for the row rather than as a parse failure of the whole file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoricalFlight {
    pub operator: String,
    pub flight_type: String,
    pub month: String,
    pub scheduled: String,
    pub actual: String,
}

impl HistoricalFlight {
    pub fn new(raw: RawFlight, scheduled: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            operator: raw.operator,
            flight_type: raw.flight_type,
            month: raw.month.to_string(),
            scheduled: scheduled.into(),
            actual: actual.into(),
        }
    }

    /// Check the categorical fields in operator, flight type, month order
    pub fn validate(&self, validator: &Validator) -> Result<Flight, ValidationError> {
        Ok(Flight::new(
            validator.validate_operator(&self.operator)?,
            validator.validate_flight_type(&self.flight_type)?,
            validator.parse_month(&self.month)?,
        ))
    }
}

impl From<HistoricalRow> for HistoricalFlight {
    fn from(row: HistoricalRow) -> Self {
        Self {
            operator: row.operator,
            flight_type: row.flight_type,
            month: row.month,
            scheduled: row.scheduled,
            actual: row.actual,
        }
    }
}

/// Historical flights with known outcomes
#[derive(Debug, Clone, Default)]
pub struct FlightDataset {
    rows: Vec<HistoricalFlight>,
}

impl FlightDataset {
    pub fn from_rows(rows: Vec<HistoricalFlight>) -> Self {
        Self { rows }
    }

    /// Load a CSV file with a header row
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::from_reader(file)?;
        info!("Loaded {} historical flights from {}", dataset.len(), path.display());
        Ok(dataset)
    }

    /// Read CSV with a header row from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let rows = reader
            .deserialize::<HistoricalRow>()
            .map(|row| row.map(HistoricalFlight::from))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[HistoricalFlight] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
