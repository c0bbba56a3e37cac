use crate::auth::CurrentUser;
use crate::error::Result;
use crate::handlers::validation::ValidatedJson;
use crate::models::{AvatarUpdate, UserDb};
use crate::AppState;
use axum::{extract::State, Json};

pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserDb> {
    Json(user.into())
}

pub async fn update_avatar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<AvatarUpdate>,
) -> Result<Json<UserDb>> {
    let user = state
        .user_service
        .update_avatar(user.id, &body.avatar_url)
        .await?;

    Ok(Json(user.into()))
}
