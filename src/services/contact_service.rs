use crate::error::{AppError, Result};
use crate::models::{BirthdayWindow, Contact, ContactBody, ContactField, Pagination};
use crate::repositories::ContactRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use validator::Validate;

/// Contact book operations for a single owner.
pub struct ContactService {
    repository: Arc<dyn ContactRepository>,
}

impl ContactService {
    pub fn new(repository: Arc<dyn ContactRepository>) -> Self {
        Self { repository }
    }

    pub async fn list(&self, owner_id: i64, page: Pagination) -> Result<Vec<Contact>> {
        let page = page.normalized();
        self.repository.list(owner_id, page.skip, page.limit).await
    }

    pub async fn get(&self, owner_id: i64, id: i64) -> Result<Contact> {
        self.repository
            .get(owner_id, id)
            .await?
            .ok_or_else(AppError::contact_not_found)
    }

    pub async fn create(&self, owner_id: i64, body: ContactBody) -> Result<Contact> {
        body.validate()?;
        let contact = self.repository.create(owner_id, body).await?;
        tracing::info!(owner_id, contact_id = contact.id, "Contact created");
        Ok(contact)
    }

    pub async fn update(&self, owner_id: i64, id: i64, body: ContactBody) -> Result<Contact> {
        body.validate()?;
        let contact = self
            .repository
            .update(owner_id, id, body)
            .await?
            .ok_or_else(AppError::contact_not_found)?;
        tracing::info!(owner_id, contact_id = id, "Contact updated");
        Ok(contact)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<Contact> {
        let contact = self
            .repository
            .delete(owner_id, id)
            .await?
            .ok_or_else(AppError::contact_not_found)?;
        tracing::info!(owner_id, contact_id = id, "Contact deleted");
        Ok(contact)
    }

    /// Exact-match search. An empty result is reported as not found.
    pub async fn search(
        &self,
        owner_id: i64,
        field: ContactField,
        value: &str,
    ) -> Result<Vec<Contact>> {
        let contacts = self
            .repository
            .search_by_field(owner_id, field, value.to_string())
            .await?;

        if contacts.is_empty() {
            return Err(AppError::contact_not_found());
        }
        Ok(contacts)
    }

    /// Contacts whose birthday falls within the week starting at `today`.
    pub async fn upcoming_birthdays(&self, owner_id: i64, today: NaiveDate) -> Result<Vec<Contact>> {
        let window = BirthdayWindow::upcoming_week(today);
        tracing::debug!(owner_id, start = %window.start, end = %window.end, "Birthday window");

        let contacts = self.repository.upcoming_birthdays(owner_id, window).await?;
        if contacts.is_empty() {
            return Err(AppError::contact_not_found());
        }
        Ok(contacts)
    }
}
