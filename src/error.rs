use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::models::solar::ErrorBody;

/// Input rejected by the calculation engine.
///
/// Numeric degeneracy inside the irradiance pipeline is never reported
/// here; it is absorbed by the annual aggregator's fallback.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },

    #[error("{message}")]
    InvalidInput { field: &'static str, message: String },
}

impl CalculationError {
    pub fn field(&self) -> &'static str {
        match self {
            CalculationError::NonFinite { field } | CalculationError::InvalidInput { field, .. } => field,
        }
    }
}

/// Errors returned by HTTP handlers, rendered as `{"error": "..."}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    /// Detail is logged, never sent to the client.
    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(detail) => {
                error!(%detail, "unexpected error in solar calculation");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CalculationError> for ApiError {
    fn from(err: CalculationError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
