//! Page management over the async storage port.

use crate::editor::Editor;
use inkpad_core::history::Commit;
use inkpad_core::page::PageRecord;
use inkpad_core::storage::{HistoryEntry, PageStore, StorageResult};
use uuid::Uuid;

/// A multi-page drawing session backed by a [`PageStore`].
///
/// Exactly one page is active at a time; its content lives in the embedded
/// [`Editor`]. Every operation that deactivates the current page flushes it
/// to the store first, so switching can never lose work.
///
/// Loads are guarded by a generation counter: [`Session::begin_load`] hands
/// out a token and [`Session::apply_loaded`] refuses results from a load
/// that was superseded while its future was in flight.
pub struct Session<S: PageStore> {
    store: S,
    editor: Editor,
    pages: Vec<PageRecord>,
    active: Uuid,
    generation: u64,
    next_history_index: u32,
}

impl<S: PageStore> Session<S> {
    /// Open a session. Loads the stored pages and activates the first, or
    /// creates and persists a blank first page when the store is empty.
    pub async fn open(store: S, width: u32, height: u32) -> StorageResult<Self> {
        let mut pages = store.get_all_pages().await?;
        if pages.is_empty() {
            let record = PageRecord::new(Uuid::new_v4(), "Page 1");
            store.save_page(&record).await?;
            pages = store.get_all_pages().await?;
        }
        let active = pages[0].id;
        let mut session = Self {
            store,
            editor: Editor::new(width, height),
            pages,
            active,
            generation: 0,
            next_history_index: 0,
        };
        session.activate(active).await?;
        Ok(session)
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn active_page(&self) -> Uuid {
        self.active
    }

    /// Persist a commit reported by the editor: page content plus one
    /// history entry. Meant to be driven fire-and-forget after pointer-up.
    pub async fn persist_commit(&mut self, commit: &Commit) -> StorageResult<()> {
        let record = self.active_record(commit.snapshot.clone(), commit.objects.clone());
        self.store.save_page(&record).await?;
        self.refresh_page(record);

        let entry = HistoryEntry {
            page_id: self.active,
            index: self.next_history_index,
            snapshot: commit.snapshot.clone(),
            objects: commit.objects.clone(),
        };
        self.next_history_index += 1;
        self.store.save_history_entry(&entry).await
    }

    /// Write the active page's current content to the store.
    pub async fn flush_active(&mut self) -> StorageResult<()> {
        let snapshot = match self.editor.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("flush: snapshot encoding failed: {e}");
                String::new()
            }
        };
        // An empty vector page still stores its (empty) object list; only
        // pixels-only pages store none, so reloads keep them apart.
        let objects = if self.editor.is_pixels_only() {
            None
        } else {
            Some(self.editor.model().serialize())
        };
        let record = self.active_record(snapshot, objects);
        self.store.save_page(&record).await?;
        self.refresh_page(record);
        Ok(())
    }

    /// Switch to another page, flushing the active one first.
    pub async fn switch_page(&mut self, id: Uuid) -> StorageResult<()> {
        if id == self.active {
            return Ok(());
        }
        self.flush_active().await?;
        self.activate(id).await
    }

    /// Create a blank page after the current ones and switch to it.
    pub async fn add_page(&mut self, name: impl Into<String>) -> StorageResult<Uuid> {
        self.flush_active().await?;
        let record = PageRecord::new(Uuid::new_v4(), name);
        let id = record.id;
        self.store.save_page(&record).await?;
        self.pages = self.store.get_all_pages().await?;
        self.activate(id).await?;
        Ok(id)
    }

    /// Duplicate the active page, content included, and switch to the copy.
    pub async fn duplicate_page(&mut self, name: impl Into<String>) -> StorageResult<Uuid> {
        self.flush_active().await?;
        let source = self
            .pages
            .iter()
            .find(|p| p.id == self.active)
            .cloned()
            .unwrap_or_else(|| PageRecord::new(self.active, "Page"));
        let record = PageRecord::new(Uuid::new_v4(), name)
            .with_content(source.data_url.clone(), source.objects.clone());
        let id = record.id;
        self.store.save_page(&record).await?;
        self.pages = self.store.get_all_pages().await?;
        self.activate(id).await?;
        Ok(id)
    }

    /// Delete a page and its history. Deleting the active page activates the
    /// first remaining one, creating a blank page when none are left.
    pub async fn delete_page(&mut self, id: Uuid) -> StorageResult<()> {
        self.store.delete_page(id).await?;
        self.pages.retain(|p| p.id != id);
        if id != self.active {
            return Ok(());
        }
        match self.pages.first().map(|p| p.id) {
            Some(next) => self.activate(next).await,
            None => {
                let record = PageRecord::new(Uuid::new_v4(), "Page 1");
                self.store.save_page(&record).await?;
                self.pages = self.store.get_all_pages().await?;
                self.activate(record.id).await
            }
        }
    }

    /// Start a guarded load and get its generation token.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Apply a finished load. Returns false (and changes nothing) when a
    /// newer load started after this one.
    ///
    /// History reseeds to a single baseline entry; the stored entries only
    /// seed the journal index so new commits continue after them.
    pub fn apply_loaded(
        &mut self,
        generation: u64,
        record: &PageRecord,
        history: Vec<HistoryEntry>,
    ) -> bool {
        if generation != self.generation {
            log::debug!("discarding stale load of page {}", record.id);
            return false;
        }
        self.active = record.id;
        self.next_history_index = history.last().map(|e| e.index + 1).unwrap_or(0);
        self.editor
            .load_snapshot(record.data_url.as_deref(), record.objects.as_deref());
        true
    }

    /// Fetch a page and its history from the store and make it active.
    async fn activate(&mut self, id: Uuid) -> StorageResult<()> {
        let generation = self.begin_load();
        let record = self
            .pages
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .unwrap_or_else(|| PageRecord::new(id, "Page"));
        let history = self.store.get_history(id).await?;
        self.apply_loaded(generation, &record, history);
        Ok(())
    }

    fn active_record(&self, snapshot: String, objects: Option<String>) -> PageRecord {
        let name = self
            .pages
            .iter()
            .find(|p| p.id == self.active)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Page".to_string());
        let data_url = (!snapshot.is_empty()).then_some(snapshot);
        PageRecord::new(self.active, name).with_content(data_url, objects)
    }

    fn refresh_page(&mut self, record: PageRecord) {
        match self.pages.iter_mut().find(|p| p.id == record.id) {
            Some(existing) => {
                existing.data_url = record.data_url;
                existing.objects = record.objects;
            }
            None => self.pages.push(record),
        }
    }
}
