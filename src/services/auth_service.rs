use crate::models::user::{TokenModel, User};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use crate::services::email_service::EmailService;
use crate::services::token_service::{TokenError, TokenScope, TokenService};
use crate::services::user_service::verify_password;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Email not confirmed")]
    EmailNotConfirmed,
    #[error("Could not validate credentials")]
    InvalidToken,
    #[error("Invalid refresh token")]
    RefreshTokenReused,
    #[error("Verification error")]
    VerificationFailed,
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    Confirmed,
    AlreadyConfirmed,
}

pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    tokens: Arc<TokenService>,
    email_service: Arc<dyn EmailService>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        tokens: Arc<TokenService>,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            user_repository,
            tokens,
            email_service,
        }
    }

    /// Checks credentials and issues a fresh token pair.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenModel, AuthServiceError> {
        let user = self
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(AuthServiceError::InvalidCredentials)?;

        if !user.confirmed {
            return Err(AuthServiceError::EmailNotConfirmed);
        }

        if !verify_password(password, &user.password_hash) {
            return Err(AuthServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = user.id, "User logged in");
        self.issue_pair(&user).await
    }

    /// Rotates the token pair. A refresh token that no longer matches the
    /// stored one revokes the session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenModel, AuthServiceError> {
        let email = self
            .tokens
            .decode(refresh_token, TokenScope::RefreshToken)
            .map_err(|_| AuthServiceError::InvalidToken)?;

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidToken)?;

        if user.refresh_token.as_deref() != Some(refresh_token) {
            tracing::warn!(user_id = user.id, "Refresh token mismatch, revoking session");
            self.user_repository
                .update_refresh_token(user.id, None)
                .await?;
            return Err(AuthServiceError::RefreshTokenReused);
        }

        self.issue_pair(&user).await
    }

    /// Resolves the caller of an access token.
    pub async fn authenticate(&self, access_token: &str) -> Result<User, AuthServiceError> {
        let email = self
            .tokens
            .decode(access_token, TokenScope::AccessToken)
            .map_err(|_| AuthServiceError::InvalidToken)?;

        self.user_repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::InvalidToken)
    }

    pub async fn confirm_email(
        &self,
        email_token: &str,
    ) -> Result<ConfirmationOutcome, AuthServiceError> {
        let email = self
            .tokens
            .decode(email_token, TokenScope::EmailToken)
            .map_err(|_| AuthServiceError::VerificationFailed)?;

        let user = self
            .user_repository
            .find_by_email(&email)
            .await?
            .ok_or(AuthServiceError::VerificationFailed)?;

        if user.confirmed {
            return Ok(ConfirmationOutcome::AlreadyConfirmed);
        }

        self.user_repository.confirm_email(&email).await?;
        tracing::info!(user_id = user.id, "Email confirmed");
        Ok(ConfirmationOutcome::Confirmed)
    }

    /// Re-sends the confirmation email for an unconfirmed account. Unknown
    /// addresses are reported the same way as known ones.
    pub async fn request_confirmation(
        &self,
        email: &str,
    ) -> Result<ConfirmationOutcome, AuthServiceError> {
        match self.user_repository.find_by_email(email).await? {
            Some(user) if user.confirmed => Ok(ConfirmationOutcome::AlreadyConfirmed),
            Some(user) => {
                self.send_confirmation(&user).await?;
                Ok(ConfirmationOutcome::Confirmed)
            }
            None => Ok(ConfirmationOutcome::Confirmed),
        }
    }

    /// Sends the confirmation email on a background task.
    pub fn spawn_confirmation(self: &Arc<Self>, user: User) {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.send_confirmation(&user).await {
                tracing::error!(user_id = user.id, "Failed to send confirmation email: {}", e);
            }
        });
    }

    async fn send_confirmation(&self, user: &User) -> Result<(), AuthServiceError> {
        let token = self.tokens.create_email_token(&user.email)?;
        if let Err(e) = self
            .email_service
            .send_confirmation_email(&user.email, &user.username, &token)
            .await
        {
            tracing::error!(user_id = user.id, "Confirmation email failed: {}", e);
        }
        Ok(())
    }

    async fn issue_pair(&self, user: &User) -> Result<TokenModel, AuthServiceError> {
        let access_token = self.tokens.create_access_token(&user.email)?;
        let refresh_token = self.tokens.create_refresh_token(&user.email)?;

        self.user_repository
            .update_refresh_token(user.id, Some(refresh_token.clone()))
            .await?;

        Ok(TokenModel::bearer(access_token, refresh_token))
    }
}
