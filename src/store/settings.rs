//! Key/value site settings
//!
//! Values are arbitrary JSON. Two keys have a known shape and typed
//! accessors: `contact_info` and `hero_section`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::helpers::{now_rfc3339, StoreError};
use super::Store;

pub const CONTACT_INFO_KEY: &str = "contact_info";
pub const HERO_SECTION_KEY: &str = "hero_section";

#[derive(Debug, Clone, Serialize)]
pub struct SiteSetting {
    pub key: String,
    pub value: Value,
    pub updated_at: String,
}

/// Company contact details shown in the navbar, contact section and footer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
    pub hours: String,
}

impl Default for ContactInfo {
    fn default() -> Self {
        Self {
            phone: "04 95 XX XX XX".to_string(),
            email: "contact@insectelim.fr".to_string(),
            address: "Porto-Vecchio, Corse-du-Sud".to_string(),
            hours: "Lundi - Samedi : 8h - 19h".to_string(),
        }
    }
}

/// Home page hero copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeroSection {
    pub title: String,
    pub subtitle: String,
    pub logo_url: Option<String>,
}

impl Default for HeroSection {
    fn default() -> Self {
        Self {
            title: "INSECTELIM".to_string(),
            subtitle: "Techniciens experts en lutte anti-nuisibles à Porto-Vecchio".to_string(),
            logo_url: None,
        }
    }
}

fn decode_value(key: &str, raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "Setting is not valid JSON, returning it as a string");
        Value::String(raw.to_string())
    })
}

impl Store {
    /// All settings as a key → value map
    pub async fn all_settings(&self) -> Result<Map<String, Value>, StoreError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM site_settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows
            .into_iter()
            .map(|(key, raw)| {
                let value = decode_value(&key, &raw);
                (key, value)
            })
            .collect())
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<SiteSetting>, StoreError> {
        let row: Option<(String, String, String)> =
            sqlx::query_as("SELECT key, value, updated_at FROM site_settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(key, raw, updated_at)| SiteSetting {
            value: decode_value(&key, &raw),
            key,
            updated_at,
        }))
    }

    /// Insert or replace a setting
    pub async fn upsert_setting(&self, key: &str, value: &Value) -> Result<SiteSetting, StoreError> {
        let now = now_rfc3339();
        sqlx::query(
            "INSERT INTO site_settings (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(serde_json::to_string(value)?)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::info!(key, "Setting updated");

        Ok(SiteSetting {
            key: key.to_string(),
            value: value.clone(),
            updated_at: now,
        })
    }

    /// Contact details, falling back to the defaults when missing or malformed
    pub async fn contact_info(&self) -> Result<ContactInfo, StoreError> {
        self.typed_setting(CONTACT_INFO_KEY).await
    }

    /// Hero copy, falling back to the defaults when missing or malformed
    pub async fn hero_section(&self) -> Result<HeroSection, StoreError> {
        self.typed_setting(HERO_SECTION_KEY).await
    }

    async fn typed_setting<T>(&self, key: &str) -> Result<T, StoreError>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let Some(setting) = self.get_setting(key).await? else {
            return Ok(T::default());
        };
        Ok(serde_json::from_value(setting.value).unwrap_or_else(|e| {
            tracing::warn!(key, error = %e, "Setting has unexpected shape, using defaults");
            T::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_info_partial_fills_defaults() {
        let info: ContactInfo =
            serde_json::from_value(serde_json::json!({"phone": "06 12 34 56 78"})).unwrap();
        assert_eq!(info.phone, "06 12 34 56 78");
        assert_eq!(info.email, "contact@insectelim.fr");
    }

    #[test]
    fn test_decode_value_keeps_garbage_as_string() {
        assert_eq!(decode_value("k", "{oops"), Value::String("{oops".into()));
        assert_eq!(decode_value("k", "42"), Value::from(42));
    }
}
