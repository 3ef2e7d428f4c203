//! Item Repository
//!
//! Owner-scoped grocery item operations. Every call resolves the session
//! guard first and never reaches the store without a live session.

use std::sync::Arc;
use tracing::debug;

use super::traits::Repository;
use crate::context::SessionGuard;
use crate::domain::{DomainError, DomainResult, GroceryItem, ItemForm, ItemId, ItemPatch};

#[derive(Clone)]
pub struct ItemRepository {
    store: Arc<dyn Repository<GroceryItem>>,
    guard: Arc<dyn SessionGuard>,
}

impl ItemRepository {
    pub fn new(store: Arc<dyn Repository<GroceryItem>>, guard: Arc<dyn SessionGuard>) -> Self {
        Self { store, guard }
    }

    /// The caller's items, newest first
    pub async fn list(&self) -> DomainResult<Vec<GroceryItem>> {
        let session = self.guard.current_session().await?;
        let mut items = self.store.list(&session).await?;
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        debug!(user = %session.owner(), count = items.len(), "listed items");
        Ok(items)
    }

    /// Validate `form` and insert it for the caller.
    /// Invalid input fails before the session or store is touched.
    pub async fn add(&self, form: &ItemForm) -> DomainResult<GroceryItem> {
        let draft = form.validate()?;
        let session = self.guard.current_session().await?;
        self.store.create(&session, &draft).await
    }

    /// Negate the stored purchased flag of one of the caller's items.
    /// Reads the owned row, then writes only the `purchased` column.
    pub async fn toggle_purchased(&self, id: &ItemId) -> DomainResult<GroceryItem> {
        let session = self.guard.current_session().await?;
        let current = self
            .store
            .find_by_id(&session, id)
            .await?
            .ok_or_else(|| not_found(id))?;

        self.store
            .update(&session, id, &ItemPatch::purchased(!current.purchased))
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn remove(&self, id: &ItemId) -> DomainResult<()> {
        let session = self.guard.current_session().await?;
        if self.store.delete(&session, id).await? {
            Ok(())
        } else {
            Err(not_found(id))
        }
    }
}

fn not_found(id: &ItemId) -> DomainError {
    DomainError::NotFound(format!("item {}", id))
}
