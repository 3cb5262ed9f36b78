//! Bounded per-page undo history.

/// A rendered surface snapshot as a PNG data URL
/// (`data:image/png;base64,...`).
pub type Snapshot = String;

/// Maximum number of snapshots kept per page. Beyond this the oldest entry
/// is discarded and can no longer be reached by undo.
pub const MAX_HISTORY: usize = 50;

/// One history entry: the rendered pixels plus, when the page is vector
/// backed, the serialized object list that produced them.
///
/// `objects` is `None` only for entries imported from older pages that were
/// saved before object lists were recorded. Restoring such an entry puts the
/// page into a pixels-only state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub snapshot: Snapshot,
    pub objects: Option<String>,
}

impl Commit {
    pub fn new(snapshot: Snapshot, objects: String) -> Self {
        Self {
            snapshot,
            objects: Some(objects),
        }
    }

    pub fn pixels_only(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            objects: None,
        }
    }
}

/// Undo/redo stacks for a single page.
///
/// The undo stack always holds the current state on top, so a freshly seeded
/// record has one entry and nothing to undo. Undo moves the top onto the
/// redo stack and exposes the entry beneath; any new commit invalidates the
/// redo stack.
#[derive(Debug, Clone, Default)]
pub struct HistoryRecord {
    undo: Vec<Commit>,
    redo: Vec<Commit>,
}

impl HistoryRecord {
    /// Start a fresh record whose baseline is `initial`.
    pub fn seed(initial: Commit) -> Self {
        Self {
            undo: vec![initial],
            redo: Vec::new(),
        }
    }

    /// Record a new committed state. Clears the redo stack and drops the
    /// oldest entry once the cap is reached.
    pub fn push_commit(&mut self, commit: Commit) {
        self.redo.clear();
        self.undo.push(commit);
        if self.undo.len() > MAX_HISTORY {
            self.undo.remove(0);
        }
    }

    /// The baseline entry never leaves the stack, so there is always a
    /// current state to render.
    pub fn can_undo(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back one commit and return the state to restore.
    pub fn undo(&mut self) -> Option<&Commit> {
        if !self.can_undo() {
            return None;
        }
        let top = self.undo.pop()?;
        self.redo.push(top);
        self.undo.last()
    }

    /// Step forward one commit and return the state to restore.
    pub fn redo(&mut self) -> Option<&Commit> {
        let entry = self.redo.pop()?;
        self.undo.push(entry);
        self.undo.last()
    }

    /// Number of entries on the undo stack, baseline included.
    pub fn depth(&self) -> usize {
        self.undo.len()
    }
}
