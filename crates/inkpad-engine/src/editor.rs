//! The editor: one drawing surface, its object model and its history.

use inkpad_core::history::{Commit, HistoryRecord, Snapshot};
use inkpad_core::model::ObjectModel;
use inkpad_core::object::{Color, SurfacePoint};
use inkpad_core::settings::{Settings, SettingsStore};
use inkpad_core::tools::{GestureOutcome, Tool, ToolGesture};
use inkpad_raster::snapshot::{decode_snapshot, encode_png, encode_snapshot, SnapshotError};
use inkpad_raster::{composite_objects, render_objects, Surface};

/// Options for [`Editor::export_raster`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportOptions {
    /// Flatten over this color instead of exporting transparency.
    pub background: Option<Color>,
}

/// Owns everything needed to draw on one page: the object model, the main
/// and overlay surfaces, the active gesture and the undo history.
///
/// Shape previews render to the overlay so the main surface only ever holds
/// committed content plus the in-progress freehand stroke. Every repaint is
/// a full deterministic re-render of the object list, so interrupted or
/// repeated paints converge to the same pixels.
///
/// Pages saved before object lists were recorded load pixels-only: their
/// raster lives in `backdrop` and repaints composite objects over it instead
/// of clearing. Commits on such a page flatten into the backdrop, so the
/// page stays pixels-only for its lifetime and its history entries carry no
/// object blobs.
pub struct Editor {
    model: ObjectModel,
    gesture: ToolGesture,
    surface: Surface,
    overlay: Surface,
    /// Raster baseline of a pixels-only page. `None` on vector pages.
    backdrop: Option<Surface>,
    history: HistoryRecord,
    settings: Settings,
}

impl Editor {
    pub fn new(width: u32, height: u32) -> Self {
        let mut editor = Self {
            model: ObjectModel::new(),
            gesture: ToolGesture::new(),
            surface: Surface::new(width, height),
            overlay: Surface::new(width, height),
            backdrop: None,
            history: HistoryRecord::default(),
            settings: Settings::default(),
        };
        editor.history = HistoryRecord::seed(editor.current_commit());
        editor
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn overlay(&self) -> &Surface {
        &self.overlay
    }

    pub fn model(&self) -> &ObjectModel {
        &self.model
    }

    pub fn history(&self) -> &HistoryRecord {
        &self.history
    }

    /// Whether the page's baseline is raster content with no object list.
    pub fn is_pixels_only(&self) -> bool {
        self.backdrop.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: Settings) {
        self.set_tool(settings.tool);
        self.settings = settings;
    }

    /// Restore settings from a store, applying the stored tool.
    pub fn load_settings(&mut self, store: &impl SettingsStore) {
        self.set_settings(store.load());
    }

    /// Persist the current settings. Best-effort per the store contract.
    pub fn save_settings(&self, store: &impl SettingsStore) {
        store.save(&self.settings);
    }

    pub fn tool(&self) -> Tool {
        self.gesture.tool()
    }

    /// Switch tools. Drops any gesture in flight without committing it.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.gesture.is_active() {
            self.gesture.set_tool(tool, &mut self.model);
            self.repaint_main();
            self.overlay.clear();
        } else {
            self.gesture.set_tool(tool, &mut self.model);
        }
        self.settings.tool = tool;
    }

    /// Pointer-down. `point` is `None` when the shell could not resolve the
    /// event to surface coordinates; that is a silent no-op.
    pub fn pointer_down(&mut self, point: Option<SurfacePoint>) {
        let Some(point) = point else { return };
        let style = self.settings.style_for(self.tool());
        let outcome = self.gesture.pointer_down(&mut self.model, point, style);
        self.apply_repaint(outcome);
    }

    /// Pointer-move with all coalesced samples since the last event.
    pub fn pointer_move(&mut self, samples: &[SurfacePoint]) {
        let outcome = self.gesture.pointer_move(&mut self.model, samples);
        self.apply_repaint(outcome);
    }

    /// Pointer-up. Returns the commit to persist when the gesture changed
    /// the page.
    pub fn pointer_up(&mut self, point: Option<SurfacePoint>) -> Option<Commit> {
        let outcome = self.gesture.pointer_up(&mut self.model, point);
        self.finish(outcome)
    }

    /// Pointer-cancel. Behaves exactly like pointer-up.
    pub fn pointer_cancel(&mut self, point: Option<SurfacePoint>) -> Option<Commit> {
        let outcome = self.gesture.pointer_cancel(&mut self.model, point);
        self.finish(outcome)
    }

    /// Supervisory finalize for window-level pointer-up listeners. Safe to
    /// call whether or not a gesture is active.
    pub fn finish_gesture(&mut self) -> Option<Commit> {
        self.pointer_up(None)
    }

    fn finish(&mut self, outcome: GestureOutcome) -> Option<Commit> {
        match outcome {
            GestureOutcome::Commit => {
                self.overlay.clear();
                self.repaint_main();
                if self.backdrop.is_some() {
                    // Pixels-only page: flatten the committed object into
                    // the raster baseline.
                    self.backdrop = Some(self.surface.clone());
                    self.model.clear();
                }
                let commit = self.current_commit();
                self.history.push_commit(commit.clone());
                Some(commit)
            }
            GestureOutcome::End => {
                self.overlay.clear();
                self.repaint_main();
                None
            }
            _ => None,
        }
    }

    fn apply_repaint(&mut self, outcome: GestureOutcome) {
        match outcome {
            GestureOutcome::Progress | GestureOutcome::Removed => self.repaint_main(),
            GestureOutcome::Preview => self.repaint_overlay(),
            _ => {}
        }
    }

    /// Re-render the main surface: committed objects, plus the in-progress
    /// freehand stroke. Shape previews stay on the overlay. On a pixels-only
    /// page the backdrop is the baseline instead of a cleared surface.
    fn repaint_main(&mut self) {
        let in_progress = self
            .model
            .in_progress()
            .filter(|o| !o.kind.is_shape())
            .cloned();
        match &self.backdrop {
            Some(backdrop) => {
                self.surface = backdrop.clone();
                composite_objects(&mut self.surface, self.model.objects(), in_progress.as_ref());
            }
            None => {
                render_objects(&mut self.surface, self.model.objects(), in_progress.as_ref());
            }
        }
    }

    fn repaint_overlay(&mut self) {
        let preview = self.model.in_progress().cloned();
        render_objects(&mut self.overlay, &[], preview.as_ref());
    }

    /// The current page state as a history commit. Snapshot encoding cannot
    /// reasonably fail for an in-memory surface; if it does, the commit
    /// carries an empty snapshot and restores re-render from the objects.
    ///
    /// Pixels-only pages emit commits without an object blob, so restoring
    /// them goes through the raster path.
    fn current_commit(&self) -> Commit {
        let snapshot = match encode_snapshot(&self.surface) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::error!("snapshot encoding failed: {e}");
                String::new()
            }
        };
        if self.backdrop.is_some() {
            Commit::pixels_only(snapshot)
        } else {
            Commit::new(snapshot, self.model.serialize())
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step back one commit. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(commit) = self.history.undo().cloned() else {
            return false;
        };
        self.restore(&commit);
        true
    }

    /// Step forward one commit. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(commit) = self.history.redo().cloned() else {
            return false;
        };
        self.restore(&commit);
        true
    }

    /// Restore a commit. The object list is authoritative when present; the
    /// surface is re-rendered from it rather than painted from the stored
    /// pixels. Pixels-only commits restore the raster directly and become
    /// the page's backdrop again.
    fn restore(&mut self, commit: &Commit) {
        match &commit.objects {
            Some(blob) => {
                self.backdrop = None;
                self.model = ObjectModel::deserialize(blob);
                self.repaint_main();
            }
            None => {
                self.model.clear();
                self.restore_pixels(&commit.snapshot);
            }
        }
    }

    /// Decode raster content as the page's pixels-only baseline. An
    /// undecodable snapshot degrades to a blank vector page.
    fn restore_pixels(&mut self, snapshot: &str) {
        match decode_snapshot(snapshot) {
            Ok(decoded) => {
                let scaled =
                    decoded.resize_preserving(self.surface.width(), self.surface.height());
                self.surface = scaled.clone();
                self.backdrop = Some(scaled);
            }
            Err(e) => {
                log::warn!("discarding undecodable snapshot: {e}");
                self.backdrop = None;
                self.surface.clear();
            }
        }
    }

    /// Wipe the page, pixels-only baseline included. Commits, so clearing
    /// is undoable; a cleared pixels-only page continues as a vector page.
    pub fn clear(&mut self) -> Commit {
        self.gesture.pointer_cancel(&mut self.model, None);
        self.model.clear();
        self.backdrop = None;
        self.surface.clear();
        self.overlay.clear();
        let commit = self.current_commit();
        self.history.push_commit(commit.clone());
        commit
    }

    /// Resize the surface, scaling existing content to the new dimensions.
    /// Vector pages re-render from scaled object coordinates; pixels-only
    /// pages resample the raster. Commits the result.
    pub fn resize_and_preserve(&mut self, width: u32, height: u32) -> Commit {
        let old_w = self.surface.width() as f64;
        let old_h = self.surface.height() as f64;
        self.overlay = Surface::new(width, height);

        if let Some(backdrop) = self.backdrop.take() {
            let scaled = backdrop.resize_preserving(width, height);
            self.surface = scaled.clone();
            self.backdrop = Some(scaled);
        } else if self.model.is_empty() && self.model.in_progress().is_none() {
            self.surface = self.surface.resize_preserving(width, height);
        } else {
            let sx = if old_w > 0.0 { width as f64 / old_w } else { 1.0 };
            let sy = if old_h > 0.0 { height as f64 / old_h } else { 1.0 };
            let mut objects = self.model.objects().to_vec();
            for object in &mut objects {
                for p in &mut object.points {
                    p.x *= sx;
                    p.y *= sy;
                }
                object.style.width *= sx.min(sy);
            }
            self.model.replace_objects(objects);
            self.surface = Surface::new(width, height);
            self.repaint_main();
        }

        let commit = self.current_commit();
        self.history.push_commit(commit.clone());
        commit
    }

    /// Encode the current surface as a data-URL snapshot.
    pub fn snapshot(&self) -> Result<Snapshot, SnapshotError> {
        encode_snapshot(&self.surface)
    }

    /// Replace the page content. The object list is authoritative when
    /// present; otherwise the data URL is decoded as pixels-only content.
    /// History reseeds to a single baseline entry.
    pub fn load_snapshot(&mut self, data_url: Option<&str>, objects: Option<&str>) {
        self.gesture.pointer_cancel(&mut self.model, None);
        self.overlay.clear();
        match objects {
            Some(blob) => {
                self.backdrop = None;
                self.model = ObjectModel::deserialize(blob);
                self.repaint_main();
            }
            None => {
                self.model.clear();
                match data_url {
                    Some(url) => self.restore_pixels(url),
                    None => {
                        self.backdrop = None;
                        self.surface.clear();
                    }
                }
            }
        }
        self.history = HistoryRecord::seed(self.current_commit());
    }

    /// Export the surface as PNG bytes.
    pub fn export_raster(&self, options: ExportOptions) -> Result<Vec<u8>, SnapshotError> {
        match options.background {
            Some(background) => encode_png(&self.surface.composited_over(background)),
            None => encode_png(&self.surface),
        }
    }

    /// Copy the flattened surface to the system clipboard. Best-effort: a
    /// missing or failing clipboard is logged, never an error.
    #[cfg(feature = "clipboard")]
    pub fn copy_raster_to_clipboard(&self) {
        let flat = self.surface.composited_over(Color::white());
        let image = arboard::ImageData {
            width: flat.width() as usize,
            height: flat.height() as usize,
            bytes: std::borrow::Cow::Borrowed(flat.pixels()),
        };
        match arboard::Clipboard::new() {
            Ok(mut clipboard) => {
                if let Err(e) = clipboard.set_image(image) {
                    log::error!("failed to copy surface to clipboard: {e}");
                }
            }
            Err(e) => log::error!("failed to access clipboard: {e}"),
        }
    }
}
