//! API Error Responses

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use delay_classifier::PredictionError;
use delay_pipeline::ServeError;
use flight_validator::{Field, RejectedFlight};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors returned by request handlers
#[derive(Debug, Error)]
pub enum ApiError {
    /// Body is not JSON or does not have the request shape
    #[error("invalid request body: {0}")]
    MalformedBody(String),

    /// At least one flight failed validation
    #[error("{} flight(s) failed validation", .0.len())]
    InvalidFlights(Vec<RejectedFlight>),

    #[error("prediction failed: {0}")]
    Prediction(#[from] PredictionError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedBody(rejection.body_text())
    }
}

impl From<ServeError> for ApiError {
    fn from(err: ServeError) -> Self {
        match err {
            ServeError::Rejected(rejected) => ApiError::InvalidFlights(rejected),
            ServeError::Prediction(err) => ApiError::Prediction(err),
        }
    }
}

/// One rejected flight
#[derive(Debug, Serialize)]
pub struct FlightErrorBody {
    pub index: usize,
    pub field: Field,
    pub value: String,
    pub message: String,
}

impl From<&RejectedFlight> for FlightErrorBody {
    fn from(rejected: &RejectedFlight) -> Self {
        Self {
            index: rejected.index,
            field: rejected.error.field(),
            value: rejected.error.value(),
            message: rejected.error.to_string(),
        }
    }
}

/// Error response body; the top-level fields describe the first failure
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub field: Option<Field>,
    pub value: Option<String>,
    pub index: Option<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FlightErrorBody>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedBody(_) | ApiError::InvalidFlights(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::InvalidFlights(rejected) => {
                let errors: Vec<FlightErrorBody> = rejected.iter().map(FlightErrorBody::from).collect();
                let first = errors.first();
                ErrorBody {
                    message: first
                        .map(|e| e.message.clone())
                        .unwrap_or_else(|| self.to_string()),
                    field: first.map(|e| e.field),
                    value: first.map(|e| e.value.clone()),
                    index: first.map(|e| e.index),
                    errors,
                }
            }
            other => ErrorBody {
                message: other.to_string(),
                field: None,
                value: None,
                index: None,
                errors: Vec::new(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Request rejected: {}", self);
            metrics::counter!("delay_api_rejected_requests_total").increment(1);
        }
        (status, Json(self.body())).into_response()
    }
}
