use crate::config::SecurityConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
    #[error("Invalid scope for token")]
    WrongScope,
    #[error("Token generation failed: {0}")]
    Generation(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenScope {
    AccessToken,
    RefreshToken,
    EmailToken,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub scope: TokenScope,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Issues and verifies HS256 tokens. The subject is the account email.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
    email_ttl: Duration,
}

impl TokenService {
    pub fn new(config: &SecurityConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            access_ttl: Duration::minutes(config.access_token_minutes),
            refresh_ttl: Duration::days(config.refresh_token_days),
            email_ttl: Duration::days(config.email_token_days),
        }
    }

    pub fn create_access_token(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenScope::AccessToken, self.access_ttl)
    }

    pub fn create_refresh_token(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenScope::RefreshToken, self.refresh_ttl)
    }

    pub fn create_email_token(&self, email: &str) -> Result<String, TokenError> {
        self.issue(email, TokenScope::EmailToken, self.email_ttl)
    }

    /// Returns the subject email if the token is valid and carries `scope`.
    pub fn decode(&self, token: &str, scope: TokenScope) -> Result<String, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;

        if data.claims.scope != scope {
            return Err(TokenError::WrongScope);
        }

        Ok(data.claims.sub)
    }

    fn issue(&self, email: &str, scope: TokenScope, ttl: Duration) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            scope,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: format!("{:032x}", rand::thread_rng().gen::<u128>()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Generation(e.to_string()))
    }
}
