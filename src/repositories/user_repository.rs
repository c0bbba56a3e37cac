use crate::models::user::User;
use async_trait::async_trait;
use sqlx::SqlitePool;

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("User not found")]
    NotFound,
    #[error("User already exists")]
    AlreadyExists,
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

const USER_COLUMNS: &str =
    "id, username, email, password_hash, refresh_token, avatar, confirmed, created_at";

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        confirmed: bool,
    ) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>>;
    async fn update_refresh_token(&self, id: i64, token: Option<String>) -> RepositoryResult<()>;
    async fn confirm_email(&self, email: &str) -> RepositoryResult<()>;
    async fn update_avatar(&self, id: i64, avatar_url: &str) -> RepositoryResult<User>;
    async fn delete_user(&self, id: i64) -> RepositoryResult<()>;
    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>>;
}

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, filter: &str, value: &str) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, filter);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        confirmed: bool,
    ) -> RepositoryResult<User> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash, confirmed) VALUES (?, ?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(confirmed)
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => {
                let id = res.last_insert_rowid();
                self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
            }
            Err(e) if is_unique_violation(&e) => Err(RepositoryError::AlreadyExists),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.find_one("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> RepositoryResult<Option<User>> {
        self.find_one("username", username).await
    }

    async fn find_by_id(&self, id: i64) -> RepositoryResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn update_refresh_token(&self, id: i64, token: Option<String>) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET refresh_token = ? WHERE id = ?")
            .bind(token)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn confirm_email(&self, email: &str) -> RepositoryResult<()> {
        let result = sqlx::query("UPDATE users SET confirmed = 1 WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn update_avatar(&self, id: i64, avatar_url: &str) -> RepositoryResult<User> {
        let result = sqlx::query("UPDATE users SET avatar = ? WHERE id = ?")
            .bind(avatar_url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        self.find_by_id(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn delete_user(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_users(
        &self,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> RepositoryResult<Vec<User>> {
        let limit = limit.unwrap_or(100);
        let offset = offset.unwrap_or(0);

        let sql = format!(
            "SELECT {} FROM users ORDER BY id LIMIT ? OFFSET ?",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, User>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }
}
