//! Grocery List View-Model
//!
//! Holds the in-memory list shown to the user and keeps it in step with the
//! repository. Toggle and remove are applied locally first and rolled back
//! if the store rejects them.

use serde::Serialize;
use tracing::warn;

use crate::domain::{DomainResult, GroceryItem, ItemForm, ItemId};
use crate::repository::ItemRepository;

/// Counters derived from the current list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ListSummary {
    pub total: usize,
    pub purchased: usize,
    pub left: usize,
}

pub struct GroceryList {
    repo: ItemRepository,
    items: Vec<GroceryItem>,
}

impl GroceryList {
    pub fn new(repo: ItemRepository) -> Self {
        Self {
            repo,
            items: Vec::new(),
        }
    }

    pub fn items(&self) -> &[GroceryItem] {
        &self.items
    }

    pub fn get(&self, id: &ItemId) -> Option<&GroceryItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> ListSummary {
        let total = self.items.len();
        let purchased = self.items.iter().filter(|item| item.purchased).count();
        ListSummary {
            total,
            purchased,
            left: total - purchased,
        }
    }

    /// Replace the list with the store's current contents
    pub async fn load(&mut self) -> DomainResult<()> {
        self.items = self.repo.list().await?;
        Ok(())
    }

    /// Add an item and put it at the top of the list without re-fetching
    pub async fn add(&mut self, form: &ItemForm) -> DomainResult<&GroceryItem> {
        let item = self.repo.add(form).await?;
        self.items.insert(0, item);
        Ok(&self.items[0])
    }

    pub async fn toggle(&mut self, id: &ItemId) -> DomainResult<()> {
        let Some(pos) = self.position(id) else {
            // Not shown locally, nothing to patch
            self.repo.toggle_purchased(id).await?;
            return Ok(());
        };

        let previous = self.items[pos].purchased;
        self.items[pos].purchased = !previous;

        match self.repo.toggle_purchased(id).await {
            Ok(updated) => {
                self.reconcile(updated);
                Ok(())
            }
            Err(err) => {
                warn!(%id, "toggle failed, rolling back: {}", err);
                if let Some(pos) = self.position(id) {
                    self.items[pos].purchased = previous;
                }
                Err(err)
            }
        }
    }

    pub async fn remove(&mut self, id: &ItemId) -> DomainResult<()> {
        let removed = self.position(id).map(|pos| (pos, self.items.remove(pos)));

        match self.repo.remove(id).await {
            Ok(()) => Ok(()),
            Err(err) => {
                if let Some((pos, item)) = removed {
                    warn!(%id, "remove failed, restoring item: {}", err);
                    let pos = pos.min(self.items.len());
                    self.items.insert(pos, item);
                }
                Err(err)
            }
        }
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Take the store's copy of an item as the truth
    fn reconcile(&mut self, updated: GroceryItem) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == updated.id) {
            *item = updated;
        }
    }
}
