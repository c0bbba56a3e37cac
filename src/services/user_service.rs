use crate::models::user::{User, UserSignup};
use crate::repositories::user_repository::{RepositoryError, UserRepository};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString},
    Argon2, PasswordVerifier,
};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Invalid signup data: {0}")]
    InvalidInput(String),
    #[error("User not found")]
    UserNotFound,
    #[error("Account already exists")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    HashingError(String),
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

pub struct UserService {
    repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn create_user(&self, signup: UserSignup) -> Result<User, UserServiceError> {
        self.create_user_with_status(signup, false).await
    }

    /// Registers a user, optionally already confirmed (admin CLI).
    pub async fn create_user_with_status(
        &self,
        signup: UserSignup,
        confirmed: bool,
    ) -> Result<User, UserServiceError> {
        signup
            .validate()
            .map_err(|e| UserServiceError::InvalidInput(e.to_string()))?;

        if self.repository.find_by_email(&signup.email).await?.is_some()
            || self
                .repository
                .find_by_username(&signup.username)
                .await?
                .is_some()
        {
            return Err(UserServiceError::EmailTaken);
        }

        let password_hash = self.hash_password(&signup.password)?;

        match self
            .repository
            .create_user(&signup.username, &signup.email, &password_hash, confirmed)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = user.id, "Registered user {}", user.email);
                Ok(user)
            }
            Err(RepositoryError::AlreadyExists) => Err(UserServiceError::EmailTaken),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, UserServiceError> {
        Ok(self.repository.find_by_email(email).await?)
    }

    pub async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<User>, UserServiceError> {
        Ok(self.repository.list_users(limit, offset).await?)
    }

    pub async fn delete_user(&self, id: i64) -> Result<(), UserServiceError> {
        match self.repository.delete_user(id).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn confirm_email(&self, email: &str) -> Result<(), UserServiceError> {
        match self.repository.confirm_email(email).await {
            Ok(()) => Ok(()),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    pub async fn update_avatar(
        &self,
        user_id: i64,
        avatar_url: &str,
    ) -> Result<User, UserServiceError> {
        match self.repository.update_avatar(user_id, avatar_url).await {
            Ok(user) => Ok(user),
            Err(RepositoryError::NotFound) => Err(UserServiceError::UserNotFound),
            Err(e) => Err(UserServiceError::RepositoryError(e)),
        }
    }

    fn hash_password(&self, password: &str) -> Result<String, UserServiceError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| UserServiceError::HashingError(e.to_string()))
    }
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    if let Ok(parsed_hash) = PasswordHash::new(password_hash) {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    } else {
        false
    }
}
