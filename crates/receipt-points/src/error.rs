use crate::config::ConfigError;
use crate::receipts::{LookupError, SubmitError};
use crate::telemetry::TelemetryError;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Application error surfaced by the binary and by the receipt handlers.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    /// Request body that is not a receipt document.
    Payload(serde_json::Error),
    Submit(SubmitError),
    Lookup(LookupError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Payload(err) => write!(f, "malformed receipt payload: {}", err),
            AppError::Submit(err) => write!(f, "receipt admission failed: {}", err),
            AppError::Lookup(err) => write!(f, "receipt lookup failed: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Payload(err) => Some(err),
            AppError::Submit(err) => Some(err),
            AppError::Lookup(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Payload(err) => error_body(
                StatusCode::BAD_REQUEST,
                format!("malformed receipt payload: {err}"),
            ),
            AppError::Submit(err) => submit_response(err),
            AppError::Lookup(err) => lookup_response(err),
            other => error_body(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

// Validation failures are itemized for the submitter; every other admission fault stays terse.
fn submit_response(err: SubmitError) -> Response {
    match err.failure_report() {
        Some(report) => (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            report,
        )
            .into_response(),
        None => error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "failed to create receipt".to_string(),
        ),
    }
}

fn lookup_response(err: LookupError) -> Response {
    match err {
        LookupError::NotFound => error_body(StatusCode::NOT_FOUND, err.to_string()),
        LookupError::NotReady => {
            let mut response = error_body(StatusCode::SERVICE_UNAVAILABLE, err.to_string());
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, header::HeaderValue::from_static("1"));
            response
        }
        LookupError::ScoringFailed => {
            error_body(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
        LookupError::Repository(_) => error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal error".to_string(),
        ),
    }
}

fn error_body(status: StatusCode, message: String) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Payload(value)
    }
}

impl From<SubmitError> for AppError {
    fn from(value: SubmitError) -> Self {
        Self::Submit(value)
    }
}

impl From<LookupError> for AppError {
    fn from(value: LookupError) -> Self {
        Self::Lookup(value)
    }
}
