use crate::error::Result;
use crate::models::{BirthdayWindow, Contact, ContactBody, ContactField};
use async_trait::async_trait;
use sqlx::{Sqlite, SqlitePool, Transaction};

const CONTACT_COLUMNS: &str =
    "id, name, surname, email, phone, birthday, additional_info, user_id";

/// Owner-scoped contact storage. Every method filters on `user_id`.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait ContactRepository: Send + Sync {
    async fn list(&self, user_id: i64, skip: i64, limit: i64) -> Result<Vec<Contact>>;
    async fn get(&self, user_id: i64, id: i64) -> Result<Option<Contact>>;
    async fn create(&self, user_id: i64, body: ContactBody) -> Result<Contact>;
    async fn update(&self, user_id: i64, id: i64, body: ContactBody) -> Result<Option<Contact>>;
    async fn delete(&self, user_id: i64, id: i64) -> Result<Option<Contact>>;
    async fn search_by_field(
        &self,
        user_id: i64,
        field: ContactField,
        value: String,
    ) -> Result<Vec<Contact>>;
    async fn upcoming_birthdays(
        &self,
        user_id: i64,
        window: BirthdayWindow,
    ) -> Result<Vec<Contact>>;
}

pub struct SqliteContactRepository {
    pool: SqlitePool,
}

impl SqliteContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_owned(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: i64,
        id: i64,
    ) -> Result<Option<Contact>> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE id = ? AND user_id = ?",
            CONTACT_COLUMNS
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&mut **tx)
            .await?;
        Ok(contact)
    }
}

#[async_trait]
impl ContactRepository for SqliteContactRepository {
    async fn list(&self, user_id: i64, skip: i64, limit: i64) -> Result<Vec<Contact>> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE user_id = ? ORDER BY id LIMIT ? OFFSET ?",
            CONTACT_COLUMNS
        );
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(user_id)
            .bind(limit)
            .bind(skip)
            .fetch_all(&self.pool)
            .await?;

        Ok(contacts)
    }

    async fn get(&self, user_id: i64, id: i64) -> Result<Option<Contact>> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE id = ? AND user_id = ?",
            CONTACT_COLUMNS
        );
        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contact)
    }

    async fn create(&self, user_id: i64, body: ContactBody) -> Result<Contact> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r#"
            INSERT INTO contacts (name, surname, email, phone, birthday, additional_info, user_id)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&body.name)
        .bind(&body.surname)
        .bind(&body.email)
        .bind(&body.phone)
        .bind(body.birthday)
        .bind(&body.additional_info)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        let contact = Self::fetch_owned(&mut tx, user_id, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        tx.commit().await?;

        Ok(contact)
    }

    async fn update(&self, user_id: i64, id: i64, body: ContactBody) -> Result<Option<Contact>> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE contacts
            SET name = ?, surname = ?, email = ?, phone = ?, birthday = ?, additional_info = ?
            WHERE id = ? AND user_id = ?
            "#,
        )
        .bind(&body.name)
        .bind(&body.surname)
        .bind(&body.email)
        .bind(&body.phone)
        .bind(body.birthday)
        .bind(&body.additional_info)
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let contact = Self::fetch_owned(&mut tx, user_id, id).await?;
        tx.commit().await?;

        Ok(contact)
    }

    async fn delete(&self, user_id: i64, id: i64) -> Result<Option<Contact>> {
        let mut tx = self.pool.begin().await?;

        let Some(contact) = Self::fetch_owned(&mut tx, user_id, id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM contacts WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(contact))
    }

    async fn search_by_field(
        &self,
        user_id: i64,
        field: ContactField,
        value: String,
    ) -> Result<Vec<Contact>> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE user_id = ? AND {} = ? ORDER BY id",
            CONTACT_COLUMNS,
            field.column()
        );
        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(user_id)
            .bind(value)
            .fetch_all(&self.pool)
            .await?;

        Ok(contacts)
    }

    async fn upcoming_birthdays(
        &self,
        user_id: i64,
        window: BirthdayWindow,
    ) -> Result<Vec<Contact>> {
        let range = if window.wraps_year() {
            "(strftime('%m-%d', birthday) >= ? OR strftime('%m-%d', birthday) <= ?)"
        } else {
            "strftime('%m-%d', birthday) BETWEEN ? AND ?"
        };

        // Soonest first: dates on or after the start come before wrapped ones
        let sql = format!(
            r#"
            SELECT {}
            FROM contacts
            WHERE user_id = ? AND {}
            ORDER BY
                CASE WHEN strftime('%m-%d', birthday) >= ? THEN 0 ELSE 1 END,
                strftime('%m-%d', birthday),
                id
            "#,
            CONTACT_COLUMNS, range
        );

        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(user_id)
            .bind(&window.start)
            .bind(&window.end)
            .bind(&window.start)
            .fetch_all(&self.pool)
            .await?;

        Ok(contacts)
    }
}
