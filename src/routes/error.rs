//! API error responses.
//!
//! Every API failure is rendered as `{ "code": "E_…", "message": "…" }` with
//! a status derived from the error kind: 401 without a signed-in session,
//! 403 for the wrong role, 409 for a transition the flow refuses, 422 for
//! blank input, 404 for unknown API paths.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::model::UserRole;
use crate::services::chat::ChatError;
use crate::services::driver::DriverError;
use crate::services::rider::RiderError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("sign in required")]
    Unauthorized,
    #[error("requires the {required} role")]
    Forbidden { required: UserRole },
    #[error(transparent)]
    Rider(#[from] RiderError),
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("no such endpoint")]
    NotFound,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Forbidden { .. } => "E_FORBIDDEN",
            Self::Rider(e) => e.error_code(),
            Self::Driver(e) => e.error_code(),
            Self::Chat(e) => e.error_code(),
            Self::InvalidInput(_) => "E_INVALID_INPUT",
            Self::NotFound => "E_NOT_FOUND",
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::Rider(RiderError::MissingLocations) | Self::Chat(ChatError::EmptyMessage) | Self::InvalidInput(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Rider(_) | Self::Driver(_) => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody { code: self.error_code(), message: self.to_string() };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
