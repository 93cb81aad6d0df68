//! /api/blog handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::error::{ApiError, ApiJson, Validator};
use super::extract::{Admin, MaybeAdmin};
use super::AppState;
use crate::format::slugify;
use crate::store::{BlogPost, BlogPostInput, Visibility};

fn validate(input: &BlogPostInput) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.required("title", &input.title);
    v.required("content", &input.content);
    if !input.title.trim().is_empty() {
        let explicit = input.slug.as_deref().map(str::trim).unwrap_or("");
        let source = if explicit.is_empty() { input.title.as_str() } else { explicit };
        if slugify(source).is_empty() {
            v.fail("slug", "slug must contain at least one letter or digit");
        }
    }
    v.finish()
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
    caller: MaybeAdmin,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    Ok(Json(state.store.list_posts(caller.visibility()).await?))
}

/// GET /api/blog/{id-or-slug}
pub(super) async fn show(
    State(state): State<Arc<AppState>>,
    caller: MaybeAdmin,
    Path(key): Path<String>,
) -> Result<Json<BlogPost>, ApiError> {
    let visibility = caller.visibility();
    let by_id = state
        .store
        .get_post(&key)
        .await?
        .filter(|p| visibility == Visibility::All || p.published);
    let post = match by_id {
        Some(p) => Some(p),
        None => state.store.get_post_by_slug(&key, visibility).await?,
    };
    post.map(Json)
        .ok_or_else(|| ApiError::NotFound("Blog post not found".into()))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    ApiJson(input): ApiJson<BlogPostInput>,
) -> Result<(StatusCode, Json<BlogPost>), ApiError> {
    validate(&input)?;
    let post = state.store.create_post(&input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<BlogPostInput>,
) -> Result<Json<BlogPost>, ApiError> {
    validate(&input)?;
    Ok(Json(state.store.update_post(&id, &input).await?))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_post(&id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Blog post deleted successfully" }),
    ))
}
