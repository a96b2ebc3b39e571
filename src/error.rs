use crate::datasource::DataSourceError;
use crate::domain::{TickerParseError, ValidationError};
use crate::engine::EngineError;
use crate::orchestration::FundamentalsError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("Unprocessable: {0}")]
    Unprocessable(String),
    #[error("Upstream unavailable: {0}")]
    Upstream(String),
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation {
            field: err.field.to_string(),
            message: err.to_string(),
        }
    }
}

impl From<TickerParseError> for AppError {
    fn from(err: TickerParseError) -> Self {
        AppError::BadRequest(format!("Invalid ticker: {}", err))
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::MissingFundamentalData { .. } => AppError::NotFound(err.to_string()),
            EngineError::CurrencyMismatch { .. }
            | EngineError::InvalidFundamentals { .. }
            | EngineError::DivisionByZero { .. }
            | EngineError::Overflow { .. } => AppError::Unprocessable(err.to_string()),
        }
    }
}

impl From<DataSourceError> for AppError {
    fn from(err: DataSourceError) -> Self {
        if err.is_unavailable() {
            AppError::Upstream(err.to_string())
        } else {
            AppError::NotFound(err.to_string())
        }
    }
}

impl From<FundamentalsError> for AppError {
    fn from(err: FundamentalsError) -> Self {
        match err {
            FundamentalsError::Source(e) => e.into(),
            FundamentalsError::Engine(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            AppError::Validation { field, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "field": field }),
            ),
            AppError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, json!({ "error": msg }))
            }
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, json!({ "error": msg })),
        };

        (status, Json(body)).into_response()
    }
}
