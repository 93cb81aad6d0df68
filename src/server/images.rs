//! /api/images handlers
//!
//! Uploads are raw request bodies; the client file name comes from
//! `?filename=` and the type from `Content-Type`.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use super::error::{ApiError, ApiQuery};
use super::extract::Admin;
use super::AppState;
use crate::uploads::SavedImage;

#[derive(Debug, Default, Deserialize)]
pub(super) struct UploadQuery {
    #[serde(default)]
    filename: String,
}

pub(super) async fn upload(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    ApiQuery(query): ApiQuery<UploadQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<SavedImage>), ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    let saved = state
        .images
        .save(&query.filename, content_type, &body)
        .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(path): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.images.delete(&path).await?;
    Ok(Json(
        serde_json::json!({ "message": "Image deleted successfully" }),
    ))
}
