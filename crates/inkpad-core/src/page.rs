//! Pages: independent drawing surfaces with their own content and history.

use crate::history::Snapshot;
use crate::object::DrawObject;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// In-memory state of one page.
///
/// A page normally carries both representations: the object list
/// (authoritative) and the last rendered snapshot (a fast-path for loads and
/// thumbnails). Pages saved by older versions carry only a snapshot; their
/// `objects` list is empty and stays that way, since pixels cannot be
/// vectorized back.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: Uuid,
    pub name: String,
    pub snapshot: Option<Snapshot>,
    pub objects: Vec<DrawObject>,
}

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            snapshot: None,
            objects: Vec::new(),
        }
    }

    /// Snapshot present but no objects: content predates object recording.
    pub fn is_pixels_only(&self) -> bool {
        self.objects.is_empty() && self.snapshot.is_some()
    }
}

/// Persisted form of a page, as the storage port sees it.
///
/// Timestamps are milliseconds since the Unix epoch, assigned by the store.
/// `objects` holds the JSON-serialized object list, absent for legacy
/// pixels-only pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_url: Option<Snapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub objects: Option<String>,
    #[serde(default)]
    pub created_at: u64,
    #[serde(default)]
    pub modified_at: u64,
}

impl PageRecord {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            data_url: None,
            objects: None,
            created_at: 0,
            modified_at: 0,
        }
    }

    pub fn with_content(mut self, data_url: Option<Snapshot>, objects: Option<String>) -> Self {
        self.data_url = data_url;
        self.objects = objects;
        self
    }
}

impl From<&Page> for PageRecord {
    fn from(page: &Page) -> Self {
        let objects = if page.objects.is_empty() {
            None
        } else {
            serde_json::to_string(&page.objects).ok()
        };
        PageRecord::new(page.id, page.name.clone()).with_content(page.snapshot.clone(), objects)
    }
}

impl From<&PageRecord> for Page {
    fn from(record: &PageRecord) -> Self {
        let objects = match &record.objects {
            Some(blob) => serde_json::from_str(blob).unwrap_or_else(|e| {
                log::warn!("page {}: discarding malformed object list: {e}", record.id);
                Vec::new()
            }),
            None => Vec::new(),
        };
        Page {
            id: record.id,
            name: record.name.clone(),
            snapshot: record.data_url.clone(),
            objects,
        }
    }
}
