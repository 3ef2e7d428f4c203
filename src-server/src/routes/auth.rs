use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use grocery::domain::{Credentials, DomainError, Session, SignUpForm};
use grocery::SignUpOutcome;

use super::bearer_token;
use crate::error::AppError;
use crate::state::AppState;

/// POST /api/auth/signup - Register with e-mail, password and display name.
pub async fn sign_up(
    State(state): State<AppState>,
    body: Result<Json<SignUpForm>, JsonRejection>,
) -> Result<Json<SignUpOutcome>, AppError> {
    let Json(form) = body?;
    Ok(Json(state.auth.sign_up(&form).await?))
}

/// POST /api/auth/login - Exchange credentials for a session.
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Credentials>, JsonRejection>,
) -> Result<Json<Session>, AppError> {
    let Json(credentials) = body?;
    Ok(Json(state.auth.sign_in(&credentials).await?))
}

/// POST /api/auth/logout - Revoke the bearer token's session.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let token = bearer_token(&headers).ok_or(DomainError::Unauthenticated)?;
    state.auth.sign_out(token).await?;
    Ok(StatusCode::NO_CONTENT)
}
