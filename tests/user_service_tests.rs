use contacts_api::{
    models::UserSignup,
    repositories::SqliteUserRepository,
    services::{UserService, UserServiceError},
    test_utils::test_helpers,
};
use std::sync::Arc;

fn signup(username: &str, email: &str) -> UserSignup {
    UserSignup {
        username: username.to_string(),
        email: email.to_string(),
        password: "password1".to_string(),
    }
}

#[tokio::test]
async fn test_create_user_success() {
    // Create isolated test database
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool));
    let service = UserService::new(repository);

    let result = service
        .create_user(signup("tester", "test@example.com"))
        .await;
    assert!(result.is_ok());

    let user = result.unwrap();
    assert_eq!(user.email, "test@example.com");
    assert_eq!(user.username, "tester");
    assert!(!user.confirmed);
    assert!(user.password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn test_create_user_duplicate_email() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let repository = Arc::new(SqliteUserRepository::new(pool.clone()));
    let service = UserService::new(repository);

    let result1 = service
        .create_user(signup("first", "duplicate@example.com"))
        .await;
    assert!(result1.is_ok());

    let result2 = service
        .create_user(signup("second", "duplicate@example.com"))
        .await;
    assert!(matches!(result2, Err(UserServiceError::EmailTaken)));
}

#[tokio::test]
async fn test_create_user_duplicate_username() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    service
        .create_user(signup("tester", "one@example.com"))
        .await
        .unwrap();

    let result = service
        .create_user(signup("tester", "two@example.com"))
        .await;
    assert!(matches!(result, Err(UserServiceError::EmailTaken)));
}

#[tokio::test]
async fn test_create_confirmed_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    let user = service
        .create_user_with_status(signup("admin", "admin@example.com"), true)
        .await
        .unwrap();
    assert!(user.confirmed);
}

#[tokio::test]
async fn test_confirm_email_and_update_avatar() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    let user = service
        .create_user(signup("tester", "test@example.com"))
        .await
        .unwrap();

    service.confirm_email("test@example.com").await.unwrap();
    let confirmed = service
        .find_user_by_email("test@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(confirmed.confirmed);

    let updated = service
        .update_avatar(user.id, "https://cdn.example.com/a.png")
        .await
        .unwrap();
    assert_eq!(updated.avatar.as_deref(), Some("https://cdn.example.com/a.png"));

    assert!(matches!(
        service.confirm_email("missing@example.com").await,
        Err(UserServiceError::UserNotFound)
    ));
}

#[tokio::test]
async fn test_list_users() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    for (username, email) in [
        ("user_one", "one@example.com"),
        ("user_two", "two@example.com"),
        ("user_three", "three@example.com"),
    ] {
        service.create_user(signup(username, email)).await.unwrap();
    }

    let all = service.list_users(None, None).await.unwrap();
    assert_eq!(all.len(), 3);

    let page = service.list_users(Some(2), Some(1)).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page[0].email, "two@example.com");
}

#[tokio::test]
async fn test_delete_user() {
    let pool = test_helpers::create_test_db().await.unwrap();
    let service = UserService::new(Arc::new(SqliteUserRepository::new(pool)));

    let user = service
        .create_user(signup("tester", "test@example.com"))
        .await
        .unwrap();

    service.delete_user(user.id).await.unwrap();
    assert!(service
        .find_user_by_email("test@example.com")
        .await
        .unwrap()
        .is_none());

    assert!(matches!(
        service.delete_user(user.id).await,
        Err(UserServiceError::UserNotFound)
    ));
}
