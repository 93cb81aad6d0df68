//! Contact form inbox

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::helpers::{new_id, now_rfc3339, StoreError};
use super::Store;

const MESSAGE_COLUMNS: &str = "id, name, email, phone, message, is_read, created_at";

#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub read: bool,
    pub created_at: String,
}

/// A message as submitted through the contact form
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

fn message_from_row(row: &SqliteRow) -> Result<ContactMessage, StoreError> {
    let is_read: i64 = row.try_get("is_read")?;
    Ok(ContactMessage {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        message: row.try_get("message")?,
        read: is_read != 0,
        created_at: row.try_get("created_at")?,
    })
}

impl Store {
    /// Store a contact message
    ///
    /// Fields are stored trimmed; validation is the caller's job.
    pub async fn create_message(&self, msg: &NewMessage) -> Result<ContactMessage, StoreError> {
        let id = new_id();
        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, phone, message, is_read, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
        )
        .bind(&id)
        .bind(msg.name.trim())
        .bind(msg.email.trim())
        .bind(msg.phone.trim())
        .bind(msg.message.trim())
        .bind(now_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(message_id = %id, "Contact message received");

        self.get_message(&id)
            .await?
            .ok_or(StoreError::NotFound("Message"))
    }

    pub async fn get_message(&self, id: &str) -> Result<Option<ContactMessage>, StoreError> {
        let sql = format!("SELECT {MESSAGE_COLUMNS} FROM contact_messages WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(message_from_row).transpose()
    }

    /// List messages, newest first
    pub async fn list_messages(&self, unread_only: bool) -> Result<Vec<ContactMessage>, StoreError> {
        let filter = if unread_only { "WHERE is_read = 0" } else { "" };
        let sql = format!(
            "SELECT {MESSAGE_COLUMNS} FROM contact_messages {filter} ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(message_from_row).collect()
    }

    /// Mark a message read or unread
    pub async fn set_message_read(
        &self,
        id: &str,
        read: bool,
    ) -> Result<ContactMessage, StoreError> {
        let result = sqlx::query("UPDATE contact_messages SET is_read = ?1 WHERE id = ?2")
            .bind(read)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Message"));
        }
        self.get_message(id)
            .await?
            .ok_or(StoreError::NotFound("Message"))
    }

    pub async fn delete_message(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM contact_messages WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Message"));
        }
        tracing::info!(message_id = %id, "Contact message deleted");
        Ok(())
    }

    pub async fn unread_message_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM contact_messages WHERE is_read = 0")
                .fetch_one(&self.pool)
                .await?;
        Ok(count as u64)
    }
}
