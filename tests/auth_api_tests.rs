use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use contacts_api::{
    repositories::{SqliteUserRepository, UserRepository},
    router::build_router,
    test_utils::test_helpers::{self, TEST_PASSWORD},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn setup() -> (Router, AppState) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let state = test_helpers::create_test_state(pool);
    (build_router(state.clone()), state)
}

async fn call(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn bearer_request(method: Method, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={}&password={}", email, password)))
        .unwrap()
}

fn signup_body() -> Value {
    json!({
        "username": "alice",
        "email": "alice@example.com",
        "password": TEST_PASSWORD
    })
}

#[tokio::test]
async fn test_signup_creates_unconfirmed_user() {
    let (router, state) = setup().await;

    let (status, body) = call(
        &router,
        json_request(Method::POST, "/api/auth/signup", signup_body()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "alice@example.com");
    assert!(body["user"].get("password_hash").is_none());
    assert!(body["detail"].is_string());

    let user = SqliteUserRepository::new(state.pool.clone())
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!user.confirmed);
    assert_ne!(user.password_hash, TEST_PASSWORD);
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let (router, _state) = setup().await;

    let (status, _) = call(
        &router,
        json_request(Method::POST, "/api/auth/signup", signup_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        &router,
        json_request(Method::POST, "/api/auth/signup", signup_body()),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Account already exists");
}

#[tokio::test]
async fn test_signup_validation() {
    let (router, _state) = setup().await;

    let mut body = signup_body();
    body["email"] = json!("not-an-email");

    let (status, _) = call(&router, json_request(Method::POST, "/api/auth/signup", body)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_requires_confirmed_email() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();

    let (status, body) = call(&router, login_request("alice@example.com", TEST_PASSWORD)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Email not confirmed");
}

#[tokio::test]
async fn test_login_rejects_bad_password() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();

    let (status, _) = call(&router, login_request("alice@example.com", "wrong1")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&router, login_request("nobody@example.com", TEST_PASSWORD)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_confirm_email_then_login() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();

    let email_token = state
        .token_service
        .create_email_token("alice@example.com")
        .unwrap();
    let uri = format!("/api/auth/confirmed_email/{}", email_token);

    let (status, body) = call(
        &router,
        Request::builder().uri(&uri).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Email confirmed");

    let (status, body) = call(
        &router,
        Request::builder().uri(&uri).body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Your email is already confirmed");

    let (status, tokens) = call(&router, login_request("alice@example.com", TEST_PASSWORD)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(tokens["token_type"], "bearer");
    assert!(tokens["access_token"].is_string());
    assert!(tokens["refresh_token"].is_string());
}

#[tokio::test]
async fn test_confirm_email_for_unknown_user() {
    let (router, state) = setup().await;

    let email_token = state
        .token_service
        .create_email_token("ghost@example.com")
        .unwrap();

    let (status, body) = call(
        &router,
        Request::builder()
            .uri(format!("/api/auth/confirmed_email/{}", email_token))
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Verification error");
}

#[tokio::test]
async fn test_refresh_rotation_and_reuse_detection() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();

    let (_, first) = call(&router, login_request("alice@example.com", TEST_PASSWORD)).await;
    let first_refresh = first["refresh_token"].as_str().unwrap().to_string();

    let (status, second) = call(
        &router,
        bearer_request(Method::GET, "/api/auth/refresh_token", &first_refresh),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second_refresh = second["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first_refresh, second_refresh);

    // Replaying the rotated token revokes the session
    let (status, _) = call(
        &router,
        bearer_request(Method::GET, "/api/auth/refresh_token", &first_refresh),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let user = SqliteUserRepository::new(state.pool.clone())
        .find_by_email("alice@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(user.refresh_token.is_none());

    let (status, _) = call(
        &router,
        bearer_request(Method::GET, "/api/auth/refresh_token", &second_refresh),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_access_token_cannot_refresh() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();

    let (_, tokens) = call(&router, login_request("alice@example.com", TEST_PASSWORD)).await;
    let access = tokens["access_token"].as_str().unwrap();

    let (status, _) = call(
        &router,
        bearer_request(Method::GET, "/api/auth/refresh_token", access),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_email() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, false)
        .await
        .unwrap();
    test_helpers::insert_test_user(&state.pool, "bobby", "bob@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();

    let (status, body) = call(
        &router,
        json_request(
            Method::POST,
            "/api/auth/request_email",
            json!({ "email": "alice@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Check your email for confirmation.");

    let (status, body) = call(
        &router,
        json_request(
            Method::POST,
            "/api/auth/request_email",
            json!({ "email": "bob@example.com" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Your email is already confirmed");
}

#[tokio::test]
async fn test_me_and_avatar() {
    let (router, state) = setup().await;
    test_helpers::insert_test_user(&state.pool, "alice", "alice@example.com", TEST_PASSWORD, true)
        .await
        .unwrap();
    let token = test_helpers::access_token_for(&state, "alice@example.com").unwrap();

    let (status, me) = call(&router, bearer_request(Method::GET, "/api/users/me/", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert!(me["avatar"].is_null());

    let request = Request::builder()
        .method(Method::PATCH)
        .uri("/api/users/avatar")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "avatar_url": "https://cdn.example.com/alice.png" }).to_string(),
        ))
        .unwrap();
    let (status, updated) = call(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["avatar"], "https://cdn.example.com/alice.png");

    let (status, _) = call(&router, bearer_request(Method::GET, "/api/users/me/", "garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
