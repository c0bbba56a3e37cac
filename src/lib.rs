pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod router;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use config::AppConfig;
use middleware::RateLimiter;
use repositories::{SqliteContactRepository, SqliteUserRepository};
use services::{AuthService, ContactService, EmailService, TokenService, UserService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub user_service: Arc<UserService>,
    pub auth_service: Arc<AuthService>,
    pub contact_service: Arc<ContactService>,
    pub token_service: Arc<TokenService>,
    pub rate_limiter: Arc<RateLimiter>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wires repositories and services over `pool`.
    pub fn new(
        pool: sqlx::SqlitePool,
        config: AppConfig,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let contact_repository = Arc::new(SqliteContactRepository::new(pool.clone()));

        let token_service = Arc::new(TokenService::new(&config.security));
        let user_service = Arc::new(UserService::new(user_repository.clone()));
        let auth_service = Arc::new(AuthService::new(
            user_repository,
            token_service.clone(),
            email_service,
        ));
        let contact_service = Arc::new(ContactService::new(contact_repository));
        let rate_limiter = Arc::new(
            RateLimiter::new(config.rate_limit.enabled)
                .trusting_proxy(config.rate_limit.trust_proxy),
        );

        Self {
            config: Arc::new(config),
            user_service,
            auth_service,
            contact_service,
            token_service,
            rate_limiter,
            pool,
        }
    }
}
