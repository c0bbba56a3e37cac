use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::repositories::user_repository::RepositoryError;
use crate::services::auth_service::AuthServiceError;
use crate::services::user_service::UserServiceError;

// Type alias for Result with our AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Too many requests")]
    RateLimited { retry_after_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn contact_not_found() -> Self {
        AppError::NotFound("contact not found".to_string())
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        AppError::Unauthorized(detail.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<RepositoryError> for AppError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Database(e) => AppError::Database(e),
            RepositoryError::NotFound => AppError::NotFound("user not found".to_string()),
            RepositoryError::AlreadyExists => {
                AppError::Conflict("Account already exists".to_string())
            }
        }
    }
}

impl From<UserServiceError> for AppError {
    fn from(error: UserServiceError) -> Self {
        match error {
            UserServiceError::InvalidInput(msg) => AppError::Validation(msg),
            UserServiceError::UserNotFound => AppError::NotFound("user not found".to_string()),
            UserServiceError::EmailTaken => {
                AppError::Conflict("Account already exists".to_string())
            }
            UserServiceError::HashingError(msg) => AppError::Internal(msg),
            UserServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl From<AuthServiceError> for AppError {
    fn from(error: AuthServiceError) -> Self {
        match error {
            AuthServiceError::InvalidCredentials
            | AuthServiceError::EmailNotConfirmed
            | AuthServiceError::InvalidToken
            | AuthServiceError::RefreshTokenReused => AppError::Unauthorized(error.to_string()),
            AuthServiceError::VerificationFailed => AppError::BadRequest(error.to_string()),
            AuthServiceError::Token(e) => AppError::Internal(e.to_string()),
            AuthServiceError::RepositoryError(e) => e.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let detail = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal server error".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();

        match self {
            AppError::Unauthorized(_) => {
                response.headers_mut().insert(
                    header::WWW_AUTHENTICATE,
                    HeaderValue::from_static("Bearer"),
                );
            }
            AppError::RateLimited { retry_after_secs } => {
                if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
            }
            _ => {}
        }

        response
    }
}
