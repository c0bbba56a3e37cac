pub mod auth_handlers;
pub mod contact_handlers;
pub mod user_handlers;
pub mod validation;

use crate::models::MessageResponse;
use axum::Json;

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse::new("Contacts API"))
}
