use std::env;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("JWT_SECRET must be set in production")]
    MissingJwtSecret,
    #[error("JWT_SECRET must be at least 32 bytes in production")]
    WeakJwtSecret,
    #[error("JWT_SECRET appears to be a default value. Generate a secure secret!")]
    DefaultJwtSecret,
}

const DEVELOPMENT_JWT_SECRET: &str = "development-only-jwt-secret-changeme";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    pub email_token_days: i64,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub enabled: bool,
    /// Key clients by `X-Forwarded-For` when running behind a reverse proxy.
    pub trust_proxy: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("ENVIRONMENT").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        let config = Self {
            environment,
            server: ServerConfig {
                host: env_or("HOST", "127.0.0.1"),
                port: parse_env("PORT", 8000)?,
                base_url: env_or("BASE_URL", "http://localhost:8000"),
            },
            database: DatabaseConfig {
                url: env_or("DATABASE_URL", "sqlite://data/contacts.db"),
                max_connections: parse_env("DATABASE_MAX_CONNECTIONS", 5)?,
            },
            security: SecurityConfig {
                jwt_secret: env::var("JWT_SECRET").unwrap_or_default(),
                access_token_minutes: parse_env("ACCESS_TOKEN_MINUTES", 15)?,
                refresh_token_days: parse_env("REFRESH_TOKEN_DAYS", 7)?,
                email_token_days: parse_env("EMAIL_TOKEN_DAYS", 7)?,
                cors_origins: parse_origins(&env_or("CORS_ORIGINS", "http://localhost:3000")),
            },
            rate_limit: RateLimitConfig {
                enabled: parse_env("RATE_LIMIT_ENABLED", true)?,
                trust_proxy: parse_env("RATE_LIMIT_TRUST_PROXY", false)?,
            },
        };

        config.validated()
    }

    /// Fills in the development secret or rejects a weak one in production.
    fn validated(mut self) -> Result<Self, ConfigError> {
        if self.environment == Environment::Production {
            validate_production_secret(&self.security.jwt_secret)?;
        } else if self.security.jwt_secret.is_empty() {
            tracing::warn!("JWT_SECRET not set; using development secret (development only)");
            self.security.jwt_secret = DEVELOPMENT_JWT_SECRET.to_string();
        }
        Ok(self)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

pub fn validate_production_secret(secret: &str) -> Result<(), ConfigError> {
    if secret.is_empty() {
        return Err(ConfigError::MissingJwtSecret);
    }
    if secret.len() < 32 {
        return Err(ConfigError::WeakJwtSecret);
    }

    let lowered = secret.to_ascii_lowercase();
    if lowered.contains("example") || lowered.contains("changeme") || lowered.contains("default") {
        return Err(ConfigError::DefaultJwtSecret);
    }
    Ok(())
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
