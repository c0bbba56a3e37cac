use crate::{error::AppError, models::User, AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

const CREDENTIALS_DETAIL: &str = "Could not validate credentials";

/// Extract Bearer token from Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth_header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_header.strip_prefix("Bearer ")?.trim();

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// The account behind a valid access token.
///
/// Rejects with 401 when the header is missing, the token is malformed,
/// expired, not an access token, or names an account that no longer exists.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized(CREDENTIALS_DETAIL))?;

        let user = state.auth_service.authenticate(token).await.map_err(|e| {
            tracing::debug!("Access token rejected: {}", e);
            AppError::unauthorized(CREDENTIALS_DETAIL)
        })?;

        Ok(CurrentUser(user))
    }
}
