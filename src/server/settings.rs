//! /api/settings handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{Map, Value};

use super::error::{ApiError, ApiJson, Validator};
use super::extract::Admin;
use super::AppState;
use crate::store::SiteSetting;

/// Longest accepted setting key
const MAX_KEY_LEN: usize = 64;

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    Ok(Json(state.store.all_settings().await?))
}

pub(super) async fn show(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
) -> Result<Json<SiteSetting>, ApiError> {
    state
        .store
        .get_setting(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Setting not found".into()))
}

/// PUT /api/settings/{key} with body `{"value": <any JSON>}`
pub(super) async fn upsert(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(key): Path<String>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<SiteSetting>, ApiError> {
    let mut v = Validator::new();
    if key.trim().is_empty() || key.len() > MAX_KEY_LEN {
        v.fail("key", format!("key must be 1 to {MAX_KEY_LEN} characters"));
    }
    let value = body.get("value");
    if value.is_none() {
        v.fail("value", "value is required");
    }
    v.finish()?;

    let value = value.cloned().unwrap_or(Value::Null);
    Ok(Json(state.store.upsert_setting(&key, &value).await?))
}
