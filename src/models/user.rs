use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub avatar: Option<String>,
    pub confirmed: bool,
    pub created_at: String,
}

/// Signup payload.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UserSignup {
    #[validate(length(min = 5, max = 16))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 10))]
    pub password: String,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDb {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
}

impl From<User> for UserDb {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub user: UserDb,
    pub detail: String,
}

impl UserResponse {
    pub fn created(user: User) -> Self {
        Self {
            user: user.into(),
            detail: "User successfully created. Check your email for confirmation.".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenModel {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

impl TokenModel {
    pub fn bearer(access_token: String, refresh_token: String) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// OAuth2-style password form; `username` carries the account email.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestEmail {
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AvatarUpdate {
    #[validate(url, length(max = 255))]
    pub avatar_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
