//! The canonical object list plus the single in-progress object.

use crate::object::{DrawObject, ObjectKind, ObjectStyle, SurfacePoint};
use kurbo::Point;
use uuid::Uuid;

/// Owns everything that is drawn on the active surface.
///
/// The canonical list is the source of truth; list order is z-order (later
/// entries draw on top). At most one object is ever under construction, and
/// it only joins the list through [`ObjectModel::commit_object`].
#[derive(Debug, Clone, Default)]
pub struct ObjectModel {
    objects: Vec<DrawObject>,
    in_progress: Option<DrawObject>,
}

impl ObjectModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin constructing a new object. Starting while another object is in
    /// progress silently replaces it; the canonical list is never touched.
    pub fn start_object(
        &mut self,
        kind: ObjectKind,
        first: SurfacePoint,
        style: ObjectStyle,
    ) -> Uuid {
        if self.in_progress.is_some() {
            log::debug!("starting a new object over an in-progress one; dropping the old");
        }
        let object = DrawObject::new(kind, first, style);
        let id = object.id;
        self.in_progress = Some(object);
        id
    }

    /// Extend the in-progress object: strokes append the sample, shapes
    /// replace their second defining point. No-op when nothing is in
    /// progress.
    pub fn update_object(&mut self, point: SurfacePoint) {
        let Some(object) = self.in_progress.as_mut() else {
            return;
        };
        if object.kind.is_shape() {
            object.points.truncate(1);
        }
        object.points.push(point);
    }

    /// Move the in-progress object into the canonical list. Returns the
    /// committed id, or `None` when nothing was in progress.
    pub fn commit_object(&mut self) -> Option<Uuid> {
        let object = self.in_progress.take()?;
        let id = object.id;
        self.objects.push(object);
        Some(id)
    }

    /// Discard the in-progress object without committing it.
    pub fn cancel_object(&mut self) {
        self.in_progress = None;
    }

    /// Remove a committed object. Used by the object eraser.
    pub fn remove_object(&mut self, id: Uuid) -> Option<DrawObject> {
        let index = self.objects.iter().position(|o| o.id == id)?;
        Some(self.objects.remove(index))
    }

    /// Hit-test in reverse z-order: the topmost matching object wins.
    pub fn find_object_at(&self, point: Point) -> Option<&DrawObject> {
        self.objects.iter().rev().find(|o| o.hit_test(point))
    }

    pub fn objects(&self) -> &[DrawObject] {
        &self.objects
    }

    pub fn in_progress(&self) -> Option<&DrawObject> {
        self.in_progress.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Drop everything, committed and in-progress.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.in_progress = None;
    }

    /// Replace the canonical list wholesale (page loads). Cancels any
    /// in-progress object.
    pub fn replace_objects(&mut self, objects: Vec<DrawObject>) {
        self.objects = objects;
        self.in_progress = None;
    }

    /// Serialize the canonical list to JSON.
    pub fn serialize(&self) -> String {
        serde_json::to_string(&self.objects).unwrap_or_else(|e| {
            log::warn!("failed to serialize object list: {e}");
            "[]".to_string()
        })
    }

    /// Decode a serialized object list. Malformed input yields an empty
    /// list; a half-loaded page is worse than a blank one.
    pub fn deserialize(blob: &str) -> Self {
        let objects = match serde_json::from_str::<Vec<DrawObject>>(blob) {
            Ok(objects) => objects,
            Err(e) => {
                log::warn!("discarding malformed object list: {e}");
                Vec::new()
            }
        };
        Self {
            objects,
            in_progress: None,
        }
    }
}
