pub mod test_helpers {
    use crate::config::{
        AppConfig, DatabaseConfig, Environment, RateLimitConfig, SecurityConfig, ServerConfig,
    };
    use crate::models::ContactBody;
    use crate::services::token_service::TokenError;
    use crate::services::MockEmailService;
    use crate::AppState;
    use chrono::NaiveDate;
    use sqlx::{
        sqlite::{SqliteConnectOptions, SqlitePoolOptions},
        SqlitePool,
    };
    use std::str::FromStr;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    pub const TEST_PASSWORD: &str = "secret1";

    /// Create a new in-memory SQLite database for testing
    pub async fn create_test_db() -> Result<SqlitePool, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Create a temporary file-based SQLite database for testing
    /// Useful when a test needs to reopen the same database
    pub async fn create_test_db_file() -> Result<(SqlitePool, NamedTempFile), sqlx::Error> {
        let temp_file = NamedTempFile::new().map_err(sqlx::Error::Io)?;
        let db_path = temp_file
            .path()
            .to_str()
            .ok_or_else(|| sqlx::Error::Configuration("Invalid database path".into()))?;
        let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok((pool, temp_file))
    }

    pub fn test_config() -> AppConfig {
        AppConfig {
            environment: Environment::Development,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                base_url: "http://localhost:8000".to_string(),
            },
            database: DatabaseConfig {
                url: "sqlite::memory:".to_string(),
                max_connections: 1,
            },
            security: SecurityConfig {
                jwt_secret: "integration-test-secret-0123456789abcdef".to_string(),
                access_token_minutes: 15,
                refresh_token_days: 7,
                email_token_days: 7,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            rate_limit: RateLimitConfig {
                enabled: false,
                trust_proxy: false,
            },
        }
    }

    /// Application state over `pool` with rate limiting off and logged emails.
    pub fn create_test_state(pool: SqlitePool) -> AppState {
        create_test_state_with_config(pool, test_config())
    }

    pub fn create_test_state_with_config(pool: SqlitePool, config: AppConfig) -> AppState {
        let email_service = Arc::new(MockEmailService::new(config.server.base_url.clone()));
        AppState::new(pool, config, email_service)
    }

    /// Insert a test user with hashed password
    pub async fn insert_test_user(
        pool: &SqlitePool,
        username: &str,
        email: &str,
        password: &str,
        confirmed: bool,
    ) -> Result<i64, sqlx::Error> {
        use argon2::{
            password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
            Argon2,
        };

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                sqlx::Error::Configuration(format!("Password hashing failed: {}", e).into())
            })?
            .to_string();

        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, confirmed) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(confirmed)
        .execute(pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Access token for `email`, signed with the state's secret.
    pub fn access_token_for(state: &AppState, email: &str) -> Result<String, TokenError> {
        state.token_service.create_access_token(email)
    }

    pub fn contact_body(name: &str, surname: &str, email: &str, birthday: NaiveDate) -> ContactBody {
        ContactBody {
            name: name.to_string(),
            surname: surname.to_string(),
            email: email.to_string(),
            phone: "555-0100".to_string(),
            birthday,
            additional_info: None,
        }
    }
}
