//! Public HTML pages and the contact form

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::error::ApiError;
use super::messages;
use super::AppState;
use crate::pages::{self, ContactStatus, HomePage};
use crate::store::{NewMessage, Visibility};

/// Page handlers render errors as plain 500s; the API renders JSON
pub(super) struct PageError(ApiError);

impl<E: Into<ApiError>> From<E> for PageError {
    fn from(err: E) -> Self {
        PageError(err.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self.0, "Page rendering failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>Erreur interne</h1><p>Veuillez réessayer plus tard.</p>"),
        )
            .into_response()
    }
}

/// Blog cards shown on the home page
const HOME_POST_LIMIT: u32 = 3;

#[derive(Debug, Default, Deserialize)]
pub(super) struct HomeQuery {
    contact: Option<String>,
}

async fn home_page(state: &AppState, status: ContactStatus) -> Result<String, PageError> {
    let page = HomePage {
        hero: state.store.hero_section().await?,
        contact: state.store.contact_info().await?,
        services: state.store.list_services(Visibility::Public).await?,
        posts: state
            .store
            .list_recent_posts(Visibility::Public, HOME_POST_LIMIT)
            .await?,
        status,
    };
    Ok(pages::home(&page))
}

async fn not_found_page(state: &AppState) -> Result<Response, PageError> {
    let contact = state.store.contact_info().await?;
    Ok((StatusCode::NOT_FOUND, Html(pages::not_found(&contact))).into_response())
}

/// GET /
pub(super) async fn home(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HomeQuery>,
) -> Result<Html<String>, PageError> {
    let status = match query.contact.as_deref() {
        Some("sent") => ContactStatus::Sent,
        _ => ContactStatus::Idle,
    };
    Ok(Html(home_page(&state, status).await?))
}

/// GET /services/{slug}
pub(super) async fn service_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let Some(service) = state
        .store
        .get_service_by_slug(&slug, Visibility::Public)
        .await?
    else {
        return not_found_page(&state).await;
    };
    let contact = state.store.contact_info().await?;
    Ok(Html(pages::service_detail(&service, &contact)).into_response())
}

/// GET /blog/{slug}
pub(super) async fn blog_page(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<Response, PageError> {
    let Some(post) = state
        .store
        .get_post_by_slug(&slug, Visibility::Public)
        .await?
    else {
        return not_found_page(&state).await;
    };
    let contact = state.store.contact_info().await?;
    Ok(Html(pages::blog_detail(&post, &contact)).into_response())
}

/// POST /contact (form-urlencoded)
pub(super) async fn contact(
    State(state): State<Arc<AppState>>,
    Form(form): Form<NewMessage>,
) -> Result<Response, PageError> {
    match messages::validate(&form) {
        Ok(()) => {
            state.store.create_message(&form).await?;
            Ok(Redirect::to("/?contact=sent#contact").into_response())
        }
        Err(ApiError::Validation(errors)) => {
            let status = ContactStatus::Failed {
                errors: errors.into_iter().map(|e| e.message).collect(),
                form,
            };
            let html = home_page(&state, status).await?;
            Ok((StatusCode::BAD_REQUEST, Html(html)).into_response())
        }
        Err(other) => Err(other.into()),
    }
}

/// Fallback for unknown paths
pub(super) async fn not_found(State(state): State<Arc<AppState>>) -> Result<Response, PageError> {
    not_found_page(&state).await
}
