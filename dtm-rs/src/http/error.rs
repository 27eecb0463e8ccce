use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::users::{ConflictField, StoreError};

/// Handler failure taxonomy. Business logic raises tags; the transport
/// mapping lives entirely in `status()` and `IntoResponse`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Incorrect email or password")]
    IncorrectCredentials,
    #[error("Inactive user")]
    InactiveUser,
    #[error("The user with this email already exists in the system")]
    EmailTaken,
    #[error("The user with this username already exists in the system")]
    UsernameTaken,
    #[error("{0}")]
    Validation(String),
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::IncorrectCredentials
            | ApiError::InactiveUser
            | ApiError::EmailTaken
            | ApiError::UsernameTaken => StatusCode::BAD_REQUEST,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(ConflictField::Email) => ApiError::EmailTaken,
            StoreError::Conflict(ConflictField::Username) => ApiError::UsernameTaken,
            other => {
                error!(error = %other, "user store failure");
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({ "detail": self.to_string() }));
        (self.status(), body).into_response()
    }
}
