//! Owner-scoped item routes.
//!
//! Each request carries its own bearer token; the identity behind it is
//! resolved through the auth API and becomes the session for that request.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use grocery::domain::{DomainError, GroceryItem, ItemForm, ItemId, Session};
use grocery::repository::ItemRepository;
use grocery::SessionContext;

use super::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

async fn repository(state: &AppState, headers: &HeaderMap) -> Result<ItemRepository, AppError> {
    let token = bearer_token(headers).ok_or(DomainError::Unauthenticated)?;
    let user = state.auth.get_user(token).await?;
    let ctx = SessionContext::signed_in(Session::new(token, user));
    Ok(ItemRepository::new(state.items.clone(), Arc::new(ctx)))
}

/// GET /api/items - The caller's items, newest first.
pub async fn list_items(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<GroceryItem>>, AppError> {
    let repo = repository(&state, &headers).await?;
    Ok(Json(repo.list().await?))
}

/// POST /api/items - Add an item for the caller.
pub async fn add_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ItemForm>, JsonRejection>,
) -> Result<(StatusCode, Json<GroceryItem>), AppError> {
    let Json(form) = body?;
    // Reject bad input before resolving the token
    form.validate()?;
    let repo = repository(&state, &headers).await?;
    let item = repo.add(&form).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// PATCH /api/items/:id/toggle - Flip the purchased flag.
pub async fn toggle_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<GroceryItem>, AppError> {
    let repo = repository(&state, &headers).await?;
    Ok(Json(repo.toggle_purchased(&ItemId::from(id)).await?))
}

/// DELETE /api/items/:id
pub async fn delete_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let repo = repository(&state, &headers).await?;
    repo.remove(&ItemId::from(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
