//! Prediction Routes

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use feature_engine::Label;
use flight_validator::{RawFlight, RejectedFlight, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::error::ApiError;
use crate::AppState;

/// Batch of flights to label
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    pub flights: Vec<WireFlight>,
}

/// Flight as sent by the client, before any type checks
///
/// Fields are read as plain JSON values so a wrong type is reported against the
/// field and index it belongs to.
#[derive(Debug, Default, Deserialize)]
pub struct WireFlight {
    #[serde(default, alias = "OPERA")]
    pub operator: Value,
    #[serde(default, rename = "flightType", alias = "TIPOVUELO")]
    pub flight_type: Value,
    #[serde(default, alias = "MES")]
    pub month: Value,
}

impl WireFlight {
    /// Convert to a raw flight; the first mistyped field is reported
    pub fn into_raw(self) -> Result<RawFlight, ValidationError> {
        let operator = match self.operator {
            Value::String(operator) => operator,
            other => return Err(ValidationError::UnknownOperator(other.to_string())),
        };
        let flight_type = match self.flight_type {
            Value::String(flight_type) => flight_type,
            other => return Err(ValidationError::InvalidFlightType(other.to_string())),
        };
        let month = match &self.month {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| ValidationError::InvalidMonth(n.to_string()))?,
            other => return Err(ValidationError::InvalidMonth(other.to_string())),
        };
        Ok(RawFlight::new(operator, flight_type, month))
    }
}

/// One label per requested flight, in request order
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub predict: Vec<Label>,
}

/// Type-check every flight, reporting each failure with its index
fn collect_flights(flights: Vec<WireFlight>, validator: &Validator) -> Result<Vec<RawFlight>, ApiError> {
    let mut raw = Vec::with_capacity(flights.len());
    let mut rejected = Vec::new();

    for (index, flight) in flights.into_iter().enumerate() {
        match flight.into_raw() {
            Ok(flight) => raw.push((index, flight)),
            Err(error) => rejected.push(RejectedFlight { index, error }),
        }
    }

    if rejected.is_empty() {
        return Ok(raw.into_iter().map(|(_, flight)| flight).collect());
    }

    // Well-typed flights are still checked so the response lists every failure
    for (index, flight) in &raw {
        if let Err(error) = validator.validate(flight) {
            rejected.push(RejectedFlight { index: *index, error });
        }
    }
    rejected.sort_by_key(|r| r.index);
    Err(ApiError::InvalidFlights(rejected))
}

/// Label a batch of flights; any invalid flight rejects the whole batch
pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    debug!("Prediction request for {} flights", request.flights.len());

    let flights = collect_flights(request.flights, state.predictor.validator())?;
    let predict = state.predictor.predict(&flights)?;

    let delayed = predict.iter().filter(|l| **l == Label::Delayed).count();
    metrics::counter!("delay_api_flights_predicted_total").increment(predict.len() as u64);
    metrics::counter!("delay_api_flights_delayed_total").increment(delayed as u64);

    Ok(Json(PredictResponse { predict }))
}
