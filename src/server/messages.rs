//! /api/messages handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::error::{ApiError, ApiJson, ApiQuery, Validator};
use super::extract::Admin;
use super::AppState;
use crate::store::{ContactMessage, NewMessage};

/// Field checks shared with the public contact form
pub(super) fn validate(msg: &NewMessage) -> Result<(), ApiError> {
    let mut v = Validator::new();
    v.required("name", &msg.name);
    v.email("email", &msg.email);
    v.required("phone", &msg.phone);
    v.required("message", &msg.message);
    v.finish()
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListQuery {
    #[serde(default)]
    unread: bool,
}

pub(super) async fn list(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Vec<ContactMessage>>, ApiError> {
    Ok(Json(state.store.list_messages(query.unread).await?))
}

/// POST /api/messages (public contact form submission)
pub(super) async fn create(
    State(state): State<Arc<AppState>>,
    ApiJson(msg): ApiJson<NewMessage>,
) -> Result<(StatusCode, Json<ContactMessage>), ApiError> {
    validate(&msg)?;
    let message = state.store.create_message(&msg).await?;
    Ok((StatusCode::CREATED, Json(message)))
}

#[derive(Debug, Deserialize)]
pub(super) struct ReadFlag {
    #[serde(default = "default_read")]
    read: bool,
}

fn default_read() -> bool {
    true
}

/// PATCH /api/messages/{id}/read with optional body `{"read": bool}`
///
/// An empty body marks the message read.
pub(super) async fn mark_read(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<ContactMessage>, ApiError> {
    let read = if body.iter().all(u8::is_ascii_whitespace) {
        true
    } else {
        serde_json::from_slice::<ReadFlag>(&body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid body: {e}")))?
            .read
    };
    Ok(Json(state.store.set_message_read(&id, read).await?))
}

pub(super) async fn remove(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.store.delete_message(&id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Message deleted successfully" }),
    ))
}
