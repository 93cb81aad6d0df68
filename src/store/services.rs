//! Service CRUD and display ordering

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::helpers::{decode_string_list, new_id, non_empty, now_rfc3339, StoreError};
use super::{Store, Visibility};

const SERVICE_COLUMNS: &str = "id, title, slug, description, icon, image_url, position, active, \
     detailed_content, pricing_info, features, benefits, created_at, updated_at";

/// Pricing box shown on a service detail page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starting_price: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default = "default_true")]
    pub free_quote: bool,
}

impl Default for PricingInfo {
    fn default() -> Self {
        Self {
            starting_price: None,
            price_range: None,
            note: None,
            free_quote: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// An offered treatment (rodent control, insect control, ...)
#[derive(Debug, Clone, Serialize)]
pub struct Service {
    pub id: String,
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    /// Icon name understood by the front end (`bug`, `bird`, `shield-check`, `home`, `rat`)
    pub icon: String,
    pub image_url: Option<String>,
    /// Display position, ascending
    #[serde(rename = "order")]
    pub position: i64,
    pub active: bool,
    /// Markdown body of the detail page
    pub detailed_content: Option<String>,
    pub pricing_info: Option<PricingInfo>,
    pub features: Vec<String>,
    pub benefits: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable fields of a service (create and full update)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// `None` appends the service at the end of the list
    #[serde(default, rename = "order")]
    pub position: Option<i64>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub detailed_content: Option<String>,
    #[serde(default)]
    pub pricing_info: Option<PricingInfo>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
}

impl ServiceInput {
    /// Trim list entries and drop blank ones
    fn clean_list(items: &[String]) -> Vec<String> {
        items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Direction for reordering a service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

fn service_from_row(row: &SqliteRow) -> Result<Service, StoreError> {
    let id: String = row.try_get("id")?;
    let pricing_raw: Option<String> = row.try_get("pricing_info")?;
    let pricing_info = pricing_raw.and_then(|raw| {
        serde_json::from_str(&raw)
            .map_err(|e| {
                tracing::warn!(service_id = %id, error = %e, "Invalid pricing_info JSON, ignoring");
            })
            .ok()
    });
    let features: String = row.try_get("features")?;
    let benefits: String = row.try_get("benefits")?;
    let active: i64 = row.try_get("active")?;

    Ok(Service {
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        description: row.try_get("description")?,
        icon: row.try_get("icon")?,
        image_url: row.try_get("image_url")?,
        position: row.try_get("position")?,
        active: active != 0,
        detailed_content: row.try_get("detailed_content")?,
        pricing_info,
        features: decode_string_list(&features, "features", &id),
        benefits: decode_string_list(&benefits, "benefits", &id),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        id,
    })
}

impl Store {
    /// List services in display order (position, then creation time)
    pub async fn list_services(&self, visibility: Visibility) -> Result<Vec<Service>, StoreError> {
        let filter = match visibility {
            Visibility::All => "",
            Visibility::Public => "WHERE active = 1",
        };
        let sql = format!(
            "SELECT {SERVICE_COLUMNS} FROM services {filter} ORDER BY position ASC, created_at ASC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(service_from_row).collect()
    }

    pub async fn get_service(&self, id: &str) -> Result<Option<Service>, StoreError> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(service_from_row).transpose()
    }

    pub async fn get_service_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Service>, StoreError> {
        let sql = format!("SELECT {SERVICE_COLUMNS} FROM services WHERE slug = ?1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        let service = row.as_ref().map(service_from_row).transpose()?;
        Ok(service.filter(|s| visibility == Visibility::All || s.active))
    }

    /// Position one past the last service
    pub async fn next_service_position(&self) -> Result<i64, StoreError> {
        let (max,): (Option<i64>,) = sqlx::query_as("SELECT MAX(position) FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(max.map(|m| m + 1).unwrap_or(0))
    }

    pub async fn create_service(&self, input: &ServiceInput) -> Result<Service, StoreError> {
        let id = new_id();
        let now = now_rfc3339();
        let position = match input.position {
            Some(p) => p,
            None => self.next_service_position().await?,
        };
        let pricing = input
            .pricing_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "INSERT INTO services (id, title, slug, description, icon, image_url, position, active,
                 detailed_content, pricing_info, features, benefits, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?13)",
        )
        .bind(&id)
        .bind(input.title.trim())
        .bind(non_empty(input.slug.as_deref()))
        .bind(input.description.trim())
        .bind(input.icon.trim())
        .bind(non_empty(input.image_url.as_deref()))
        .bind(position)
        .bind(input.active.unwrap_or(true))
        .bind(non_empty(input.detailed_content.as_deref()))
        .bind(pricing)
        .bind(serde_json::to_string(&ServiceInput::clean_list(&input.features))?)
        .bind(serde_json::to_string(&ServiceInput::clean_list(&input.benefits))?)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "A service with this slug already exists"))?;

        tracing::info!(service_id = %id, title = %input.title.trim(), "Service created");

        self.get_service(&id)
            .await?
            .ok_or(StoreError::NotFound("Service"))
    }

    /// Replace all editable fields of a service
    pub async fn update_service(
        &self,
        id: &str,
        input: &ServiceInput,
    ) -> Result<Service, StoreError> {
        let Some(existing) = self.get_service(id).await? else {
            return Err(StoreError::NotFound("Service"));
        };
        let pricing = input
            .pricing_info
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "UPDATE services SET title = ?1, slug = ?2, description = ?3, icon = ?4, image_url = ?5,
                 position = ?6, active = ?7, detailed_content = ?8, pricing_info = ?9,
                 features = ?10, benefits = ?11, updated_at = ?12
             WHERE id = ?13",
        )
        .bind(input.title.trim())
        .bind(non_empty(input.slug.as_deref()))
        .bind(input.description.trim())
        .bind(input.icon.trim())
        .bind(non_empty(input.image_url.as_deref()))
        .bind(input.position.unwrap_or(existing.position))
        .bind(input.active.unwrap_or(existing.active))
        .bind(non_empty(input.detailed_content.as_deref()))
        .bind(pricing)
        .bind(serde_json::to_string(&ServiceInput::clean_list(&input.features))?)
        .bind(serde_json::to_string(&ServiceInput::clean_list(&input.benefits))?)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "A service with this slug already exists"))?;

        tracing::info!(service_id = %id, "Service updated");

        self.get_service(id)
            .await?
            .ok_or(StoreError::NotFound("Service"))
    }

    pub async fn delete_service(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM services WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Service"));
        }
        tracing::info!(service_id = %id, "Service deleted");
        Ok(())
    }

    /// Swap a service with its neighbour and renumber positions 0..n-1
    ///
    /// Moving the first service up or the last one down leaves the order
    /// untouched. Returns the full list in its new order.
    pub async fn move_service(
        &self,
        id: &str,
        direction: MoveDirection,
    ) -> Result<Vec<Service>, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut ids: Vec<String> =
            sqlx::query_as::<_, (String,)>("SELECT id FROM services ORDER BY position ASC, created_at ASC")
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .map(|(id,)| id)
                .collect();

        let Some(index) = ids.iter().position(|s| s == id) else {
            return Err(StoreError::NotFound("Service"));
        };

        let target = match direction {
            MoveDirection::Up if index > 0 => Some(index - 1),
            MoveDirection::Down if index + 1 < ids.len() => Some(index + 1),
            _ => None,
        };

        if let Some(target) = target {
            ids.swap(index, target);
            let now = now_rfc3339();
            for (position, service_id) in ids.iter().enumerate() {
                sqlx::query("UPDATE services SET position = ?1, updated_at = ?2 WHERE id = ?3")
                    .bind(position as i64)
                    .bind(&now)
                    .bind(service_id)
                    .execute(&mut *tx)
                    .await?;
            }
            tracing::info!(service_id = %id, from = index, to = target, "Service moved");
        } else {
            tracing::debug!(service_id = %id, ?direction, "Service already at the edge, not moved");
        }

        tx.commit().await?;
        self.list_services(Visibility::All).await
    }

    pub async fn service_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
