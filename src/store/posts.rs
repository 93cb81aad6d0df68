//! Blog post CRUD

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::helpers::{new_id, non_empty, now_rfc3339, StoreError};
use super::{Store, Visibility};
use crate::format::slugify;

/// Category assigned when none is given
pub const DEFAULT_CATEGORY: &str = "prévention";

const POST_COLUMNS: &str =
    "id, title, slug, excerpt, content, category, image_url, published, created_at, updated_at";

#[derive(Debug, Clone, Serialize)]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub excerpt: String,
    /// Markdown body
    pub content: String,
    pub category: String,
    pub image_url: Option<String>,
    pub published: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// Editable fields of a blog post
///
/// A missing slug is derived from the title.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlogPostInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub published: bool,
}

impl BlogPostInput {
    fn resolved_slug(&self) -> String {
        match non_empty(self.slug.as_deref()) {
            Some(slug) => slugify(&slug),
            None => slugify(&self.title),
        }
    }

    fn resolved_category(&self) -> String {
        non_empty(self.category.as_deref()).unwrap_or_else(|| DEFAULT_CATEGORY.to_string())
    }
}

fn post_from_row(row: &SqliteRow) -> Result<BlogPost, StoreError> {
    let published: i64 = row.try_get("published")?;
    Ok(BlogPost {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        slug: row.try_get("slug")?,
        excerpt: row.try_get("excerpt")?,
        content: row.try_get("content")?,
        category: row.try_get("category")?,
        image_url: row.try_get("image_url")?,
        published: published != 0,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl Store {
    /// List posts, newest first
    pub async fn list_posts(&self, visibility: Visibility) -> Result<Vec<BlogPost>, StoreError> {
        let filter = match visibility {
            Visibility::All => "",
            Visibility::Public => "WHERE published = 1",
        };
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts {filter} ORDER BY created_at DESC, rowid DESC"
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(post_from_row).collect()
    }

    /// The `limit` newest posts
    pub async fn list_recent_posts(
        &self,
        visibility: Visibility,
        limit: u32,
    ) -> Result<Vec<BlogPost>, StoreError> {
        let filter = match visibility {
            Visibility::All => "",
            Visibility::Public => "WHERE published = 1",
        };
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM blog_posts {filter} \
             ORDER BY created_at DESC, rowid DESC LIMIT ?1"
        );
        let rows = sqlx::query(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(post_from_row).collect()
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<BlogPost>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(post_from_row).transpose()
    }

    pub async fn get_post_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<BlogPost>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = ?1");
        let row = sqlx::query(&sql)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        let post = row.as_ref().map(post_from_row).transpose()?;
        Ok(post.filter(|p| visibility == Visibility::All || p.published))
    }

    pub async fn create_post(&self, input: &BlogPostInput) -> Result<BlogPost, StoreError> {
        let id = new_id();
        let now = now_rfc3339();
        let slug = input.resolved_slug();

        sqlx::query(
            "INSERT INTO blog_posts (id, title, slug, excerpt, content, category, image_url, published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
        )
        .bind(&id)
        .bind(input.title.trim())
        .bind(&slug)
        .bind(non_empty(input.excerpt.as_deref()).unwrap_or_default())
        .bind(&input.content)
        .bind(input.resolved_category())
        .bind(non_empty(input.image_url.as_deref()))
        .bind(input.published)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "A blog post with this slug already exists"))?;

        tracing::info!(post_id = %id, %slug, published = input.published, "Blog post created");

        self.get_post(&id)
            .await?
            .ok_or(StoreError::NotFound("Blog post"))
    }

    pub async fn update_post(
        &self,
        id: &str,
        input: &BlogPostInput,
    ) -> Result<BlogPost, StoreError> {
        let slug = input.resolved_slug();

        let result = sqlx::query(
            "UPDATE blog_posts SET title = ?1, slug = ?2, excerpt = ?3, content = ?4, category = ?5,
                 image_url = ?6, published = ?7, updated_at = ?8
             WHERE id = ?9",
        )
        .bind(input.title.trim())
        .bind(&slug)
        .bind(non_empty(input.excerpt.as_deref()).unwrap_or_default())
        .bind(&input.content)
        .bind(input.resolved_category())
        .bind(non_empty(input.image_url.as_deref()))
        .bind(input.published)
        .bind(now_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "A blog post with this slug already exists"))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Blog post"));
        }

        tracing::info!(post_id = %id, %slug, "Blog post updated");

        self.get_post(id)
            .await?
            .ok_or(StoreError::NotFound("Blog post"))
    }

    pub async fn delete_post(&self, id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Blog post"));
        }
        tracing::info!(post_id = %id, "Blog post deleted");
        Ok(())
    }

    pub async fn post_count(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blog_posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}
