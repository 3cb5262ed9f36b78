//! Async persistence port for pages and their history.

mod memory;

pub use memory::MemoryPageStore;

use crate::history::Snapshot;
use crate::page::PageRecord;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;
use uuid::Uuid;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Page not found: {0}")]
    NotFound(Uuid),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with single-threaded
/// targets).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// One persisted undo step of a page. `index` orders entries within the
/// page, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub page_id: Uuid,
    pub index: u32,
    pub snapshot: Snapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<String>,
}

/// Trait for page storage backends.
///
/// Implementations can store pages in memory, on the filesystem, or in a
/// browser database. All methods are best-effort async; callers fire saves
/// without blocking input handling.
pub trait PageStore: Send + Sync {
    /// Upsert a page. An existing page keeps its `created_at`; the store
    /// refreshes `modified_at` on every save.
    fn save_page(&self, record: &PageRecord) -> BoxFuture<'_, StorageResult<()>>;

    /// All pages, ordered by creation time.
    fn get_all_pages(&self) -> BoxFuture<'_, StorageResult<Vec<PageRecord>>>;

    /// Delete a page and every history entry recorded for it.
    fn delete_page(&self, id: Uuid) -> BoxFuture<'_, StorageResult<()>>;

    /// Append one history entry, then prune the page's entries down to the
    /// newest [`crate::history::MAX_HISTORY`] by index.
    fn save_history_entry(&self, entry: &HistoryEntry) -> BoxFuture<'_, StorageResult<()>>;

    /// All history entries for a page, ordered by index.
    fn get_history(&self, page_id: Uuid) -> BoxFuture<'_, StorageResult<Vec<HistoryEntry>>>;
}
