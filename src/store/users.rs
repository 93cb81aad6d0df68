//! Admin accounts
//!
//! Only the bcrypt hash is stored. Emails are expected to be normalised
//! by the caller (see `auth::normalize_email`).

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::helpers::{new_id, now_rfc3339, StoreError};
use super::Store;

const USER_COLUMNS: &str = "id, email, password_hash, created_at, last_login";

#[derive(Debug, Clone, Serialize)]
pub struct AdminUser {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: String,
    pub last_login: Option<String>,
}

fn user_from_row(row: &SqliteRow) -> Result<AdminUser, StoreError> {
    Ok(AdminUser {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        created_at: row.try_get("created_at")?,
        last_login: row.try_get("last_login")?,
    })
}

impl Store {
    pub async fn create_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<AdminUser, StoreError> {
        let id = new_id();
        sqlx::query(
            "INSERT INTO admin_users (id, email, password_hash, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "Email already exists"))?;

        tracing::info!(user_id = %id, "Admin account created");

        self.get_admin(&id)
            .await?
            .ok_or(StoreError::NotFound("Admin"))
    }

    /// Create the first admin account, only while none exists
    ///
    /// The emptiness check and the insert are one statement, so of two
    /// concurrent bootstrap requests exactly one gets `Some`.
    pub async fn create_first_admin(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<AdminUser>, StoreError> {
        let id = new_id();
        let result = sqlx::query(
            "INSERT INTO admin_users (id, email, password_hash, created_at) \
             SELECT ?1, ?2, ?3, ?4 WHERE NOT EXISTS (SELECT 1 FROM admin_users)",
        )
        .bind(&id)
        .bind(email)
        .bind(password_hash)
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "Email already exists"))?;

        if result.rows_affected() == 0 {
            tracing::warn!("First admin already exists, bootstrap refused");
            return Ok(None);
        }
        tracing::info!(user_id = %id, "First admin account created");
        self.get_admin(&id).await
    }

    pub async fn find_admin_by_email(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE email = ?1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    pub async fn get_admin(&self, id: &str) -> Result<Option<AdminUser>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(user_from_row).transpose()
    }

    /// Record a successful login
    pub async fn touch_last_login(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE admin_users SET last_login = ?1 WHERE id = ?2")
            .bind(now_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Admin"));
        }
        Ok(())
    }

    pub async fn set_admin_password(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE admin_users SET password_hash = ?1 WHERE email = ?2")
            .bind(password_hash)
            .bind(email)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Admin"));
        }
        tracing::info!("Admin password changed");
        Ok(())
    }

    pub async fn list_admins(&self) -> Result<Vec<AdminUser>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM admin_users ORDER BY created_at ASC");
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(user_from_row).collect()
    }

    pub async fn admin_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM admin_users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
