use std::sync::Arc;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Shared handler result type.
pub type ApiResult<T> = Result<T, ApiError>;

/// Message returned for every failure whose cause stays server-side.
pub const INTERNAL_MESSAGE: &str = "An unexpected error occurred during processing.";

#[derive(Debug, Error, Clone)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("internal server error")]
    Internal(Arc<anyhow::Error>),
}

impl ApiError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn internal(err: anyhow::Error) -> Self {
        Self::Internal(Arc::new(err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text; internals are masked.
    pub fn public_message(&self) -> &str {
        match self {
            ApiError::InvalidInput(msg) => msg,
            ApiError::Internal(_) => INTERNAL_MESSAGE,
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(value: anyhow::Error) -> Self {
        Self::internal(value)
    }
}

/// JSON body of every non-2xx response.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub message: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(err) => tracing::error!(error = ?err, "request failed"),
            ApiError::InvalidInput(msg) => tracing::debug!(%msg, "rejected request"),
        }
        let body = ErrorBody {
            message: self.public_message(),
        };
        (self.status(), Json(body)).into_response()
    }
}
