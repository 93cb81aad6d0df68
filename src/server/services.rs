//! /api/services handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::error::{ApiError, ApiJson, Validator};
use super::extract::{Admin, MaybeAdmin};
use super::AppState;
use crate::store::{MoveDirection, Service, ServiceInput, Visibility};

fn validate(input: &ServiceInput) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.required("title", &input.title);
    v.required("description", &input.description);
    v.required("icon", &input.icon);
    v.finish()
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
    caller: MaybeAdmin,
) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.store.list_services(caller.visibility()).await?))
}

/// GET /api/services/{id-or-slug}
pub(super) async fn show(
    State(state): State<Arc<AppState>>,
    caller: MaybeAdmin,
    Path(key): Path<String>,
) -> Result<Json<Service>, ApiError> {
    let visibility = caller.visibility();
    let by_id = state
        .store
        .get_service(&key)
        .await?
        .filter(|s| visibility == Visibility::All || s.active);
    let service = match by_id {
        Some(s) => Some(s),
        None => state.store.get_service_by_slug(&key, visibility).await?,
    };
    service
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Service not found".into()))
}

pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<(StatusCode, Json<Service>), ApiError> {
    validate(&input)?;
    let service = state.store.create_service(&input).await?;
    Ok((StatusCode::CREATED, Json(service)))
}

pub(super) async fn update(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<ServiceInput>,
) -> Result<Json<Service>, ApiError> {
    validate(&input)?;
    Ok(Json(state.store.update_service(&id, &input).await?))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_service(&id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Service deleted successfully" }),
    ))
}

#[derive(Debug, Deserialize)]
pub(super) struct MoveRequest {
    direction: MoveDirection,
}

/// POST /api/services/{id}/move
pub(super) async fn move_service(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MoveRequest>,
) -> Result<Json<Vec<Service>>, ApiError> {
    Ok(Json(state.store.move_service(&id, req.direction).await?))
}
