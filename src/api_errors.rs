use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::errors::EstimatorError;

/// Failures surfaced to HTTP clients as plain text
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.status();
        let body = match self {
            AppError::BadRequest(s) | AppError::Internal(s) => s,
        };
        (code, body).into_response()
    }
}

impl From<EstimatorError> for AppError {
    fn from(err: EstimatorError) -> Self {
        match err {
            EstimatorError::ModelMissing | EstimatorError::SchemaUnavailable => {
                AppError::Internal(err.to_string())
            }
            EstimatorError::Scaling { message } => {
                AppError::Internal(format!("Scaling error: {message}"))
            }
            EstimatorError::Prediction { message } => {
                AppError::Internal(format!("Prediction error: {message}"))
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}
