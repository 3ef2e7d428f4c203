//! Repository Layer - Core Traits
//!
//! Defines the abstract interface for owner-scoped data access.
//! Implementations can use the hosted REST store, in-memory, etc.

use async_trait::async_trait;

use crate::domain::{DomainResult, Entity, Session};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type. Every call is filtered by the owner of the
/// given session; rows belonging to anyone else are invisible.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Insert a new row owned by the session's user
    async fn create(&self, scope: &Session, draft: &T::Draft) -> DomainResult<T>;

    /// Find an owned row by ID
    async fn find_by_id(&self, scope: &Session, id: &T::Id) -> DomainResult<Option<T>>;

    /// List all owned rows
    async fn list(&self, scope: &Session) -> DomainResult<Vec<T>>;

    /// Write only the columns carried by `patch` on an owned row.
    /// Returns `None` when no owned row matched.
    async fn update(&self, scope: &Session, id: &T::Id, patch: &T::Patch)
        -> DomainResult<Option<T>>;

    /// Delete an owned row by ID. Returns whether a row was removed.
    async fn delete(&self, scope: &Session, id: &T::Id) -> DomainResult<bool>;
}
