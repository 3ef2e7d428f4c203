//! In-Memory Repository Implementation
//!
//! Behaves like the hosted store (owner filtering, server-assigned ids and
//! timestamps) without any network. Used for offline runs and tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::traits::Repository;
use crate::domain::{DomainError, DomainResult, Entity, Session};

pub struct MemoryRepository<T> {
    rows: Mutex<Vec<T>>,
    last_created: Mutex<Option<DateTime<Utc>>>,
    fail_next: Mutex<Option<DomainError>>,
    calls: AtomicUsize,
}

impl<T> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            last_created: Mutex::new(None),
            fail_next: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }
}

impl<T: Entity> MemoryRepository<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls that reached the store
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make the next call fail with `err`, as a dropped connection would.
    pub async fn fail_next(&self, err: DomainError) {
        *self.fail_next.lock().await = Some(err);
    }

    /// All rows regardless of owner
    pub async fn snapshot(&self) -> Vec<T> {
        self.rows.lock().await.clone()
    }

    async fn enter(&self) -> DomainResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.fail_next.lock().await.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Strictly increasing creation time so newest-first ordering is total.
    async fn next_timestamp(&self) -> DateTime<Utc> {
        let mut last = self.last_created.lock().await;
        let mut now = Utc::now();
        if let Some(prev) = *last {
            if now <= prev {
                now = prev + Duration::microseconds(1);
            }
        }
        *last = Some(now);
        now
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for MemoryRepository<T> {
    async fn create(&self, scope: &Session, draft: &T::Draft) -> DomainResult<T> {
        self.enter().await?;
        let created_at = self.next_timestamp().await;
        let row = T::from_draft(scope.owner(), draft, created_at);
        self.rows.lock().await.push(row.clone());
        Ok(row)
    }

    async fn find_by_id(&self, scope: &Session, id: &T::Id) -> DomainResult<Option<T>> {
        self.enter().await?;
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .find(|row| row.id() == id && row.owner() == scope.owner())
            .cloned())
    }

    async fn list(&self, scope: &Session) -> DomainResult<Vec<T>> {
        self.enter().await?;
        let rows = self.rows.lock().await;
        Ok(rows
            .iter()
            .filter(|row| row.owner() == scope.owner())
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        scope: &Session,
        id: &T::Id,
        patch: &T::Patch,
    ) -> DomainResult<Option<T>> {
        self.enter().await?;
        let mut rows = self.rows.lock().await;
        let Some(row) = rows
            .iter_mut()
            .find(|row| row.id() == id && row.owner() == scope.owner())
        else {
            return Ok(None);
        };
        row.apply(patch);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, scope: &Session, id: &T::Id) -> DomainResult<bool> {
        self.enter().await?;
        let mut rows = self.rows.lock().await;
        let before = rows.len();
        rows.retain(|row| !(row.id() == id && row.owner() == scope.owner()));
        Ok(rows.len() != before)
    }
}
