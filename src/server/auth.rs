//! Login, registration and current-admin handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiJson, Validator};
use super::extract::{Admin, MaybeAdmin};
use super::AppState;
use crate::auth::{hash_password, normalize_email, verify_password, MIN_PASSWORD_LEN};
use crate::store::AdminUser;

#[derive(Debug, Deserialize)]
pub(super) struct Credentials {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

impl Credentials {
    fn validate(&self) -> Result<(), ApiError> {
        let mut v = Validator::new();
        v.email("email", &self.email);
        v.min_len("password", &self.password, MIN_PASSWORD_LEN);
        v.finish()
    }
}

#[derive(Debug, Serialize)]
pub(super) struct PublicUser {
    id: String,
    email: String,
}

impl From<&AdminUser> for PublicUser {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct Session {
    token: String,
    user: PublicUser,
}

/// POST /api/auth/login
pub(super) async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<Json<Session>, ApiError> {
    creds.validate()?;
    let email = normalize_email(&creds.email);

    let Some(user) = state.store.find_admin_by_email(&email).await? else {
        tracing::info!("Login failed: unknown email");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    };
    let password = creds.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    if !valid {
        tracing::info!(user_id = %user.id, "Login failed: wrong password");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    let token = state.tokens.issue(&user)?;
    state.store.touch_last_login(&user.id).await?;
    tracing::info!(user_id = %user.id, "Admin logged in");

    Ok(Json(Session {
        token,
        user: PublicUser::from(&user),
    }))
}

/// POST /api/auth/register
///
/// Open when no admin exists yet or registration is enabled; otherwise
/// only an authenticated admin may add accounts.
pub(super) async fn register(
    State(state): State<Arc<AppState>>,
    caller: MaybeAdmin,
    ApiJson(creds): ApiJson<Credentials>,
) -> Result<(StatusCode, Json<Session>), ApiError> {
    let open = state.allow_registration || caller.0.is_some();
    if !open && state.store.admin_count().await? > 0 {
        return Err(ApiError::Forbidden("Registration is closed"));
    }

    creds.validate()?;
    let email = normalize_email(&creds.email);

    let cost = state.bcrypt_cost;
    let password = creds.password;
    let hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    let user = if open {
        state.store.create_admin(&email, &hash).await?
    } else {
        // Another request may have claimed the first account while hashing
        state
            .store
            .create_first_admin(&email, &hash)
            .await?
            .ok_or(ApiError::Forbidden("Registration is closed"))?
    };
    let token = state.tokens.issue(&user)?;

    Ok((
        StatusCode::CREATED,
        Json(Session {
            token,
            user: PublicUser::from(&user),
        }),
    ))
}

/// GET /api/auth/me
pub(super) async fn me(
    State(state): State<Arc<AppState>>,
    Admin(claims): Admin,
) -> Result<Json<PublicUser>, ApiError> {
    let user = state
        .store
        .get_admin(&claims.sub)
        .await?
        .ok_or(ApiError::Unauthorized("Account no longer exists"))?;
    Ok(Json(PublicUser::from(&user)))
}
