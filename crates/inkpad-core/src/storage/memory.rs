//! In-memory page store for tests and ephemeral use.

use super::{BoxFuture, HistoryEntry, PageStore, StorageError, StorageResult};
use crate::history::MAX_HISTORY;
use crate::page::PageRecord;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Inner {
    pages: HashMap<Uuid, PageRecord>,
    history: HashMap<Uuid, Vec<HistoryEntry>>,
    /// Logical clock standing in for wall-clock timestamps, so ordering is
    /// deterministic in tests.
    clock: u64,
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

/// In-memory implementation of [`PageStore`].
#[derive(Default)]
pub struct MemoryPageStore {
    inner: RwLock<Inner>,
}

impl MemoryPageStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl PageStore for MemoryPageStore {
    fn save_page(&self, record: &PageRecord) -> BoxFuture<'_, StorageResult<()>> {
        let mut record = record.clone();
        Box::pin(async move {
            let mut inner = self.inner.write().map_err(lock_err)?;
            let now = inner.tick();
            match inner.pages.get(&record.id) {
                Some(existing) => record.created_at = existing.created_at,
                None => record.created_at = now,
            }
            record.modified_at = now;
            inner.pages.insert(record.id, record);
            Ok(())
        })
    }

    fn get_all_pages(&self) -> BoxFuture<'_, StorageResult<Vec<PageRecord>>> {
        Box::pin(async move {
            let inner = self.inner.read().map_err(lock_err)?;
            let mut pages: Vec<_> = inner.pages.values().cloned().collect();
            pages.sort_by_key(|p| p.created_at);
            Ok(pages)
        })
    }

    fn delete_page(&self, id: Uuid) -> BoxFuture<'_, StorageResult<()>> {
        Box::pin(async move {
            let mut inner = self.inner.write().map_err(lock_err)?;
            inner.pages.remove(&id);
            inner.history.remove(&id);
            Ok(())
        })
    }

    fn save_history_entry(&self, entry: &HistoryEntry) -> BoxFuture<'_, StorageResult<()>> {
        let entry = entry.clone();
        Box::pin(async move {
            let mut inner = self.inner.write().map_err(lock_err)?;
            let entries = inner.history.entry(entry.page_id).or_default();
            entries.retain(|e| e.index != entry.index);
            entries.push(entry);
            entries.sort_by_key(|e| e.index);
            if entries.len() > MAX_HISTORY {
                let excess = entries.len() - MAX_HISTORY;
                entries.drain(..excess);
            }
            Ok(())
        })
    }

    fn get_history(&self, page_id: Uuid) -> BoxFuture<'_, StorageResult<Vec<HistoryEntry>>> {
        Box::pin(async move {
            let inner = self.inner.read().map_err(lock_err)?;
            Ok(inner.history.get(&page_id).cloned().unwrap_or_default())
        })
    }
}
