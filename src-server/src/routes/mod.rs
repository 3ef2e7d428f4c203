//! API route handlers.

mod auth;
mod health;
mod items;

pub use auth::*;
pub use health::*;
pub use items::*;

use axum::http::{header::AUTHORIZATION, HeaderMap};

/// Token from an `Authorization: Bearer <token>` header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
