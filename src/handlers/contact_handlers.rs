use crate::auth::CurrentUser;
use crate::error::{AppError, Result};
use crate::handlers::validation::ValidatedJson;
use crate::models::{Contact, ContactBody, ContactField, Pagination};
use crate::AppState;
use axum::{
    extract::{
        rejection::{PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Local;

pub async fn list_contacts(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    page: std::result::Result<Query<Pagination>, QueryRejection>,
) -> Result<Json<Vec<Contact>>> {
    let Query(page) = page.map_err(|e| AppError::Validation(e.body_text()))?;
    let contacts = state.contact_service.list(user.id, page).await?;
    Ok(Json(contacts))
}

pub async fn get_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    contact_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Contact>> {
    let Path(contact_id) = contact_id?;
    let contact = state.contact_service.get(user.id, contact_id).await?;
    Ok(Json(contact))
}

pub async fn create_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(body): ValidatedJson<ContactBody>,
) -> Result<(StatusCode, Json<Contact>)> {
    let contact = state.contact_service.create(user.id, body).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

pub async fn update_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    contact_id: std::result::Result<Path<i64>, PathRejection>,
    ValidatedJson(body): ValidatedJson<ContactBody>,
) -> Result<Json<Contact>> {
    let Path(contact_id) = contact_id?;
    let contact = state
        .contact_service
        .update(user.id, contact_id, body)
        .await?;
    Ok(Json(contact))
}

pub async fn delete_contact(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    contact_id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<Json<Contact>> {
    let Path(contact_id) = contact_id?;
    let contact = state.contact_service.delete(user.id, contact_id).await?;
    Ok(Json(contact))
}

async fn search(
    state: &AppState,
    owner_id: i64,
    field: ContactField,
    value: &str,
) -> Result<Json<Vec<Contact>>> {
    let contacts = state.contact_service.search(owner_id, field, value).await?;
    Ok(Json(contacts))
}

pub async fn contacts_by_name(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(name): Path<String>,
) -> Result<Json<Vec<Contact>>> {
    search(&state, user.id, ContactField::Name, &name).await
}

pub async fn contacts_by_surname(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(surname): Path<String>,
) -> Result<Json<Vec<Contact>>> {
    search(&state, user.id, ContactField::Surname, &surname).await
}

pub async fn contacts_by_email(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(email): Path<String>,
) -> Result<Json<Vec<Contact>>> {
    search(&state, user.id, ContactField::Email, &email).await
}

/// Contacts with a birthday in the next seven days, today included.
pub async fn next_week_birthdays(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Contact>>> {
    let today = Local::now().date_naive();
    let contacts = state
        .contact_service
        .upcoming_birthdays(user.id, today)
        .await?;
    Ok(Json(contacts))
}
