//! Maps `CrisisError` onto HTTP status codes, in `phoenix-web`'s `ApiError`
//! shape: a status plus a sanitized message, never the raw internal `Display`
//! for anything unanticipated.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use crisis_errors::CrisisError;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize)]
struct ErrorBody {
    #[serde(rename = "type")]
    kind: &'static str,
    message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    kind: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, kind: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            kind,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status).json(ErrorBody {
            kind: self.kind,
            message: self.message.clone(),
        })
    }
}

impl From<CrisisError> for ApiError {
    fn from(err: CrisisError) -> Self {
        match err {
            CrisisError::InvalidInput(e) => Self::new(StatusCode::BAD_REQUEST, "invalid_input", e.to_string()),
            CrisisError::ConfigInvalid(e) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, "config_invalid", e.to_string())
            }
            // `analyze` absorbs `NoUsableSignals` into a degraded `CrisisAssessment` before it
            // reaches this boundary; if it ever does escape, treat it as the internal failure
            // it would actually represent rather than pretend it is a client error.
            CrisisError::NoUsableSignals(failures) => {
                tracing::error!(?failures, "NoUsableSignals escaped the engine boundary");
                Self::internal("request could not be processed")
            }
            CrisisError::AlertDispatchFailed(detail) => {
                tracing::warn!(%detail, "alert dispatch failed");
                Self::internal("request could not be processed")
            }
            CrisisError::Other(detail) => {
                tracing::error!(%detail, "unanticipated internal error");
                Self::internal("request could not be processed")
            }
        }
    }
}
