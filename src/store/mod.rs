use crate::{error::StoreError, models::Link};
use async_trait::async_trait;
use std::{future::Future, time::Duration};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryLinkStore;
pub use sqlite::SqliteLinkStore;

/// Key-value backend for link records.
///
/// Implementations must make `insert_if_absent` and `increment_hit_and_touch`
/// atomic on their own; callers never lock around them and may run on other
/// processes against the same backend.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Insert `link` only if no record with its short code exists.
    /// A taken key is reported as [`StoreError::AlreadyExists`].
    async fn insert_if_absent(&self, link: &Link) -> Result<(), StoreError>;

    /// Strongly consistent point lookup. Absence is [`StoreError::NotFound`].
    async fn get_consistent(&self, short_code: &str) -> Result<Link, StoreError>;

    /// Atomically add one to `hits` and set `last_visited` to now (UTC),
    /// without reading the record first.
    async fn increment_hit_and_touch(&self, short_code: &str) -> Result<(), StoreError>;
}

/// Run a store call under `limit`, turning an elapsed deadline into
/// [`StoreError::Timeout`].
pub async fn bounded<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout)?
}
