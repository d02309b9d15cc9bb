// SPDX-License-Identifier: PMPL-1.0-or-later
//! Error types for the form endpoints

use crate::validator::ValidationError;
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::error;

pub const RATE_LIMITED_MESSAGE: &str = "Demasiadas solicitudes. Por favor, espere un momento.";
pub const INCOMPLETE_DATA_MESSAGE: &str = "Datos incompletos";
pub const UNKNOWN_FORM_MESSAGE: &str = "Tipo de formulario no válido";
pub const INTERNAL_ERROR_MESSAGE: &str =
    "Error al procesar el formulario. Por favor intente nuevamente.";
pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Método no permitido";

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Rate limit exceeded, retry in {}s", retry_after.as_secs())]
    RateLimited { retry_after: Duration },

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Unknown form type: {0}")]
    UnknownFormType(String),

    #[error("Internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
            retry_after_secs: None,
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::MalformedRequest(_) | Self::UnknownFormType(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Body shown to the visitor. Internal details never leave the server.
    pub fn body(&self) -> ErrorResponse {
        match self {
            Self::Validation(e) => ErrorResponse::new(e.to_string(), e.code()),
            Self::RateLimited { retry_after } => ErrorResponse {
                retry_after_secs: Some(retry_after_secs(*retry_after)),
                ..ErrorResponse::new(RATE_LIMITED_MESSAGE, "RATE_LIMITED")
            },
            Self::MalformedRequest(_) => {
                ErrorResponse::new(INCOMPLETE_DATA_MESSAGE, "MALFORMED_REQUEST")
            }
            Self::UnknownFormType(_) => {
                ErrorResponse::new(UNKNOWN_FORM_MESSAGE, "UNKNOWN_FORM_TYPE")
            }
            Self::Internal(_) => ErrorResponse::new(INTERNAL_ERROR_MESSAGE, "INTERNAL_ERROR"),
        }
    }
}

/// Round partial seconds up so clients never retry early.
fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs();
    if retry_after.subsec_nanos() > 0 {
        secs + 1
    } else {
        secs
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref err) = self {
            error!(error = %format!("{err:#}"), "Error processing form submission");
        }

        let status = self.status();
        let body = self.body();

        match body.retry_after_secs {
            Some(secs) => (
                status,
                [(header::RETRY_AFTER, secs.to_string())],
                Json(body),
            )
                .into_response(),
            None => (status, Json(body)).into_response(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
