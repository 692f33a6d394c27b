use super::LinkStore;
use crate::{error::StoreError, models::Link};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{mapref::entry::Entry, DashMap};
use std::sync::Arc;

/// In-process link store backed by a `DashMap`.
///
/// The entry API holds the shard's write lock for the check-and-insert, which
/// gives the same one-winner guarantee as a conditional put. Selected with
/// `DATABASE_URL=memory:` and used throughout the tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryLinkStore {
    inner: Arc<DashMap<String, Link>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn insert_if_absent(&self, link: &Link) -> Result<(), StoreError> {
        match self.inner.entry(link.short_code.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(link.clone());
                Ok(())
            }
        }
    }

    async fn get_consistent(&self, short_code: &str) -> Result<Link, StoreError> {
        self.inner
            .get(short_code)
            .map(|entry| entry.value().clone())
            .ok_or(StoreError::NotFound)
    }

    async fn increment_hit_and_touch(&self, short_code: &str) -> Result<(), StoreError> {
        let mut entry = self.inner.get_mut(short_code).ok_or(StoreError::NotFound)?;
        entry.hits += 1;
        entry.last_visited = Some(Utc::now());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn conditional_insert_has_one_winner() {
        let store = MemoryLinkStore::new();
        store
            .insert_if_absent(&Link::new("abc1234", "http://a.example/"))
            .await
            .unwrap();

        let second = store
            .insert_if_absent(&Link::new("abc1234", "http://b.example/"))
            .await;
        assert!(matches!(second, Err(StoreError::AlreadyExists)));

        let stored = store.get_consistent("abc1234").await.unwrap();
        assert_eq!(stored.long_url, "http://a.example/");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_code_is_not_found() {
        let store = MemoryLinkStore::new();
        assert!(matches!(
            store.get_consistent("nope").await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.increment_hit_and_touch("nope").await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn concurrent_increments_are_additive() {
        let store = MemoryLinkStore::new();
        store
            .insert_if_absent(&Link::new("hot0001", "http://example.com/"))
            .await
            .unwrap();

        let tasks: Vec<_> = (0..50)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_hit_and_touch("hot0001").await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let link = store.get_consistent("hot0001").await.unwrap();
        assert_eq!(link.hits, 50);
        assert!(link.last_visited.is_some());
    }
}
