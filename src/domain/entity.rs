//! Domain Layer - Core Entity Trait
//!
//! Every stored row belongs to exactly one owner. The trait carries enough
//! table metadata for a generic owner-scoped store to read and write it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Display;
use std::hash::Hash;
use thiserror::Error;

use super::id::OwnerId;

/// Core trait for all owner-scoped entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + Hash + Display + Send + Sync;

    /// Insert payload, without id, owner or server-assigned fields
    type Draft: Serialize + Send + Sync;

    /// Partial update payload; only the fields it carries are written
    type Patch: Serialize + Send + Sync;

    /// Remote table name
    const TABLE: &'static str;

    /// Column holding the owner's identity
    const OWNER_COLUMN: &'static str = "user_id";

    /// PostgREST `order` clause for listings
    const ORDER_BY: Option<&'static str> = None;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;

    /// Returns the identity owning this entity
    fn owner(&self) -> &OwnerId;

    /// Materialize a row the way the store would on insert.
    fn from_draft(owner: &OwnerId, draft: &Self::Draft, created_at: DateTime<Utc>) -> Self;

    /// Apply a partial update the way the store would.
    fn apply(&mut self, patch: &Self::Patch);
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Input rejected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("User not authenticated")]
    Unauthenticated,

    /// Raw failure reported by the remote data or auth layer
    #[error("Store error: {0}")]
    Store(String),

    /// Owner-scoped operation matched no row
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn store(err: impl Display) -> Self {
        DomainError::Store(err.to_string())
    }
}

impl From<reqwest::Error> for DomainError {
    fn from(err: reqwest::Error) -> Self {
        DomainError::Store(err.to_string())
    }
}
