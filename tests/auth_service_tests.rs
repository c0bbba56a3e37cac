use contacts_api::{
    repositories::SqliteUserRepository,
    services::{AuthService, AuthServiceError, ConfirmationOutcome, MockEmailService, TokenService},
    test_utils::test_helpers::{self, TEST_PASSWORD},
};
use std::sync::Arc;

async fn auth_service(pool: sqlx::SqlitePool) -> (AuthService, Arc<TokenService>) {
    let config = test_helpers::test_config();
    let tokens = Arc::new(TokenService::new(&config.security));
    let service = AuthService::new(
        Arc::new(SqliteUserRepository::new(pool)),
        tokens.clone(),
        Arc::new(MockEmailService::new(config.server.base_url)),
    );
    (service, tokens)
}

#[tokio::test]
async fn test_login_success() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "tester", "test@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();
    let (service, _) = auth_service(pool).await;

    let tokens = service
        .login("test@example.com", TEST_PASSWORD)
        .await
        .unwrap();
    assert_eq!(tokens.token_type, "bearer");

    let user = service.authenticate(&tokens.access_token).await.unwrap();
    assert_eq!(user.email, "test@example.com");
    assert_eq!(user.refresh_token.as_deref(), Some(tokens.refresh_token.as_str()));
}

#[tokio::test]
async fn test_login_wrong_password() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "tester", "test@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();
    let (service, _) = auth_service(pool).await;

    let result = service.login("test@example.com", "wrongpass").await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
}

#[tokio::test]
async fn test_login_nonexistent_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let (service, _) = auth_service(pool).await;

    let result = service.login("nobody@example.com", TEST_PASSWORD).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidCredentials)));
}

#[tokio::test]
async fn test_authenticate_deleted_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let (service, tokens) = auth_service(pool).await;

    let token = tokens.create_access_token("gone@example.com").unwrap();
    let result = service.authenticate(&token).await;
    assert!(matches!(result, Err(AuthServiceError::InvalidToken)));
}

#[tokio::test]
async fn test_confirm_email_flow() {
    let pool = test_helpers::create_test_db().await.unwrap();
    test_helpers::insert_test_user(&pool, "tester", "test@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    let (service, tokens) = auth_service(pool).await;

    assert!(matches!(
        service.login("test@example.com", TEST_PASSWORD).await,
        Err(AuthServiceError::EmailNotConfirmed)
    ));

    let email_token = tokens.create_email_token("test@example.com").unwrap();
    assert_eq!(
        service.confirm_email(&email_token).await.unwrap(),
        ConfirmationOutcome::Confirmed
    );
    assert_eq!(
        service.confirm_email(&email_token).await.unwrap(),
        ConfirmationOutcome::AlreadyConfirmed
    );

    // An access token is not a confirmation token
    let access = tokens.create_access_token("test@example.com").unwrap();
    assert!(matches!(
        service.confirm_email(&access).await,
        Err(AuthServiceError::VerificationFailed)
    ));

    assert!(service.login("test@example.com", TEST_PASSWORD).await.is_ok());
}
