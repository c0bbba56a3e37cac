use std::{collections::HashMap, env};

use contacts_api::config::{AppConfig, ConfigError, Environment};
use serial_test::serial;

#[derive(Default)]
struct EnvGuard {
    original: HashMap<String, Option<String>>,
}

impl EnvGuard {
    fn set(&mut self, key: &str, value: impl Into<String>) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::set_var(key, value.into());
    }

    fn remove(&mut self, key: &str) {
        self.original
            .entry(key.to_string())
            .or_insert_with(|| env::var(key).ok());
        env::remove_var(key);
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.original.drain() {
            match value {
                Some(v) => env::set_var(&key, v),
                None => env::remove_var(&key),
            }
        }
    }
}

const CONFIG_KEYS: &[&str] = &[
    "ENVIRONMENT",
    "HOST",
    "PORT",
    "BASE_URL",
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "JWT_SECRET",
    "ACCESS_TOKEN_MINUTES",
    "REFRESH_TOKEN_DAYS",
    "EMAIL_TOKEN_DAYS",
    "CORS_ORIGINS",
    "RATE_LIMIT_ENABLED",
    "RATE_LIMIT_TRUST_PROXY",
];

fn clean_env() -> EnvGuard {
    let mut guard = EnvGuard::default();
    for key in CONFIG_KEYS {
        guard.remove(key);
    }
    guard
}

#[test]
#[serial]
fn defaults_apply_in_development() {
    let _guard = clean_env();

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8000);
    assert_eq!(config.database.url, "sqlite://data/contacts.db");
    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.security.access_token_minutes, 15);
    assert_eq!(config.security.refresh_token_days, 7);
    assert_eq!(config.security.cors_origins, vec!["http://localhost:3000"]);
    assert!(config.rate_limit.enabled);
    assert!(!config.rate_limit.trust_proxy);
    assert!(!config.security.jwt_secret.is_empty());
}

#[test]
#[serial]
fn overrides_are_read_from_environment() {
    let mut guard = clean_env();
    guard.set("PORT", "9090");
    guard.set("ACCESS_TOKEN_MINUTES", "30");
    guard.set("CORS_ORIGINS", "https://a.test,https://b.test");
    guard.set("RATE_LIMIT_ENABLED", "false");
    guard.set("RATE_LIMIT_TRUST_PROXY", "true");

    let config = AppConfig::from_env().unwrap();

    assert_eq!(config.server.port, 9090);
    assert_eq!(config.security.access_token_minutes, 30);
    assert_eq!(
        config.security.cors_origins,
        vec!["https://a.test", "https://b.test"]
    );
    assert!(!config.rate_limit.enabled);
    assert!(config.rate_limit.trust_proxy);
}

#[test]
#[serial]
fn invalid_number_is_rejected() {
    let mut guard = clean_env();
    guard.set("PORT", "not-a-port");

    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::InvalidValue { key: "PORT", .. })
    ));
}

#[test]
#[serial]
fn production_requires_strong_secret() {
    let mut guard = clean_env();
    guard.set("ENVIRONMENT", "production");

    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::MissingJwtSecret)
    ));

    guard.set("JWT_SECRET", "changeme-changeme-changeme-changeme");
    assert!(matches!(
        AppConfig::from_env(),
        Err(ConfigError::DefaultJwtSecret)
    ));

    guard.set("JWT_SECRET", "Qm7tX2vL9pK4wR8zN3bH6cJ1yF5gD0sA");
    let config = AppConfig::from_env().unwrap();
    assert!(config.is_production());
}
