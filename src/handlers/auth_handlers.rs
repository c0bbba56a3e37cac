use crate::auth::extract_bearer_token;
use crate::error::{AppError, Result};
use crate::handlers::validation::ValidatedJson;
use crate::models::{LoginForm, MessageResponse, RequestEmail, TokenModel, UserResponse, UserSignup};
use crate::services::ConfirmationOutcome;
use crate::AppState;
use axum::{
    extract::{rejection::FormRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Form, Json,
};

const ALREADY_CONFIRMED: &str = "Your email is already confirmed";

pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(signup): ValidatedJson<UserSignup>,
) -> Result<(StatusCode, Json<UserResponse>)> {
    let user = state.user_service.create_user(signup).await?;

    state.auth_service.spawn_confirmation(user.clone());

    Ok((StatusCode::CREATED, Json(UserResponse::created(user))))
}

/// Password login. The form's `username` field carries the account email.
pub async fn login(
    State(state): State<AppState>,
    form: std::result::Result<Form<LoginForm>, FormRejection>,
) -> Result<Json<TokenModel>> {
    let Form(form) = form.map_err(|e| AppError::Validation(e.body_text()))?;

    let tokens = state
        .auth_service
        .login(&form.username, &form.password)
        .await?;

    Ok(Json(tokens))
}

pub async fn refresh_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<TokenModel>> {
    let token = extract_bearer_token(&headers)
        .ok_or_else(|| AppError::unauthorized("Could not validate credentials"))?;

    let tokens = state.auth_service.refresh(token).await?;
    Ok(Json(tokens))
}

pub async fn confirmed_email(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Json<MessageResponse>> {
    let message = match state.auth_service.confirm_email(&token).await? {
        ConfirmationOutcome::AlreadyConfirmed => ALREADY_CONFIRMED,
        ConfirmationOutcome::Confirmed => "Email confirmed",
    };

    Ok(Json(MessageResponse::new(message)))
}

pub async fn request_email(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<RequestEmail>,
) -> Result<Json<MessageResponse>> {
    let message = match state.auth_service.request_confirmation(&body.email).await? {
        ConfirmationOutcome::AlreadyConfirmed => ALREADY_CONFIRMED,
        ConfirmationOutcome::Confirmed => "Check your email for confirmation.",
    };

    Ok(Json(MessageResponse::new(message)))
}
