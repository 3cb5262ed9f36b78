//! Tool state machine: pointer events become object-model operations.

use crate::geometry::PressureSmoother;
use crate::model::ObjectModel;
use crate::object::{ObjectKind, ObjectStyle, SurfacePoint};

/// The closed set of drawing tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tool {
    #[default]
    Brush,
    /// Paints subtractive strokes; underlying objects stay in the list.
    Eraser,
    /// Deletes whole objects by hit-test.
    ObjectEraser,
    Line,
    Rectangle,
    Circle,
}

impl Tool {
    /// The primitive this tool constructs, if it constructs one.
    pub fn object_kind(self) -> Option<ObjectKind> {
        match self {
            Tool::Brush | Tool::Eraser => Some(ObjectKind::Stroke),
            Tool::Line => Some(ObjectKind::Line),
            Tool::Rectangle => Some(ObjectKind::Rectangle),
            Tool::Circle => Some(ObjectKind::Circle),
            Tool::ObjectEraser => None,
        }
    }

    pub fn is_freehand(self) -> bool {
        matches!(self, Tool::Brush | Tool::Eraser)
    }

    /// Shape tools preview on the overlay instead of the main surface.
    pub fn is_shape(self) -> bool {
        matches!(self, Tool::Line | Tool::Rectangle | Tool::Circle)
    }

    pub fn erases(self) -> bool {
        matches!(self, Tool::Eraser)
    }
}

/// What the caller must do after feeding an event to the gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// Nothing changed (no gesture active, or the event resolved to nothing).
    Ignored,
    /// The in-progress freehand stroke grew; repaint the main surface.
    Progress,
    /// The in-progress shape changed; repaint the overlay preview.
    Preview,
    /// Committed objects were removed; repaint the main surface.
    Removed,
    /// The gesture finished and changed the canonical list; repaint, clear
    /// the overlay and take a commit snapshot.
    Commit,
    /// The gesture finished without changing the canonical list.
    End,
}

#[derive(Debug, Clone)]
struct ActiveGesture {
    tool: Tool,
    smoother: PressureSmoother,
    /// Object-eraser only: whether the wipe removed anything so far.
    erased_any: bool,
}

/// Routes one pointer gesture (down → move×N → up/cancel) into the object
/// model, branching by the active tool.
///
/// Finalization is idempotent: the surface handler and a window-level
/// fallback listener may both deliver pointer-up, and only the first one
/// does anything. Pointer-cancel is handled identically to pointer-up.
#[derive(Debug, Clone, Default)]
pub struct ToolGesture {
    tool: Tool,
    active: Option<ActiveGesture>,
}

impl ToolGesture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. A gesture in flight is dropped along with its
    /// uncommitted geometry.
    pub fn set_tool(&mut self, tool: Tool, model: &mut ObjectModel) {
        if self.active.take().is_some() {
            model.cancel_object();
        }
        self.tool = tool;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Pointer-down: begin a gesture at `point` using `style` for any object
    /// the tool constructs.
    pub fn pointer_down(
        &mut self,
        model: &mut ObjectModel,
        point: SurfacePoint,
        style: ObjectStyle,
    ) -> GestureOutcome {
        let mut gesture = ActiveGesture {
            tool: self.tool,
            smoother: PressureSmoother::new(),
            erased_any: false,
        };

        let outcome = match self.tool {
            Tool::Brush | Tool::Eraser => {
                let point = smooth(&mut gesture.smoother, point);
                let style = ObjectStyle {
                    erase: self.tool.erases(),
                    ..style
                };
                model.start_object(ObjectKind::Stroke, point, style);
                GestureOutcome::Progress
            }
            Tool::Line | Tool::Rectangle | Tool::Circle => {
                // object_kind is Some for every shape tool
                let kind = self.tool.object_kind().unwrap_or(ObjectKind::Line);
                model.start_object(kind, point, style);
                GestureOutcome::Preview
            }
            Tool::ObjectEraser => {
                if wipe_at(model, point) {
                    gesture.erased_any = true;
                    GestureOutcome::Removed
                } else {
                    GestureOutcome::Ignored
                }
            }
        };

        self.active = Some(gesture);
        outcome
    }

    /// Pointer-move: apply every coalesced sample the platform delivered, so
    /// fast motion is not under-sampled.
    pub fn pointer_move(
        &mut self,
        model: &mut ObjectModel,
        samples: &[SurfacePoint],
    ) -> GestureOutcome {
        let Some(gesture) = self.active.as_mut() else {
            return GestureOutcome::Ignored;
        };
        if samples.is_empty() {
            return GestureOutcome::Ignored;
        }

        match gesture.tool {
            Tool::Brush | Tool::Eraser => {
                for &sample in samples {
                    model.update_object(smooth(&mut gesture.smoother, sample));
                }
                GestureOutcome::Progress
            }
            Tool::Line | Tool::Rectangle | Tool::Circle => {
                for &sample in samples {
                    model.update_object(sample);
                }
                GestureOutcome::Preview
            }
            Tool::ObjectEraser => {
                let mut removed = false;
                for &sample in samples {
                    removed |= wipe_at(model, sample);
                }
                if removed {
                    gesture.erased_any = true;
                    GestureOutcome::Removed
                } else {
                    GestureOutcome::Ignored
                }
            }
        }
    }

    /// Pointer-up: finalize the gesture. `point`, when resolvable, is applied
    /// as a final move sample first. Safe to call more than once.
    pub fn pointer_up(
        &mut self,
        model: &mut ObjectModel,
        point: Option<SurfacePoint>,
    ) -> GestureOutcome {
        if self.active.is_some() {
            if let Some(point) = point {
                self.pointer_move(model, &[point]);
            }
        }
        let Some(gesture) = self.active.take() else {
            return GestureOutcome::Ignored;
        };

        match gesture.tool {
            Tool::Brush | Tool::Eraser | Tool::Line | Tool::Rectangle | Tool::Circle => {
                match model.commit_object() {
                    Some(_) => GestureOutcome::Commit,
                    None => GestureOutcome::End,
                }
            }
            Tool::ObjectEraser => {
                if gesture.erased_any {
                    GestureOutcome::Commit
                } else {
                    GestureOutcome::End
                }
            }
        }
    }

    /// Pointer-cancel terminates the gesture exactly like pointer-up, so a
    /// focus change or window blur never leaves a stuck drawing state.
    pub fn pointer_cancel(
        &mut self,
        model: &mut ObjectModel,
        point: Option<SurfacePoint>,
    ) -> GestureOutcome {
        self.pointer_up(model, point)
    }
}

fn smooth(smoother: &mut PressureSmoother, point: SurfacePoint) -> SurfacePoint {
    SurfacePoint {
        pressure: smoother.sample(point.pressure),
        ..point
    }
}

/// Remove the topmost object under `point`, if any.
fn wipe_at(model: &mut ObjectModel, point: SurfacePoint) -> bool {
    let Some(id) = model.find_object_at(point.pos()).map(|o| o.id) else {
        return false;
    };
    model.remove_object(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Color;

    fn style() -> ObjectStyle {
        ObjectStyle {
            color: Color::black(),
            width: 6.0,
            ..Default::default()
        }
    }

    fn draw_line(model: &mut ObjectModel, a: (f64, f64), b: (f64, f64)) {
        let mut gesture = ToolGesture::new();
        gesture.set_tool(Tool::Line, model);
        gesture.pointer_down(model, SurfacePoint::new(a.0, a.1), style());
        gesture.pointer_move(model, &[SurfacePoint::new(b.0, b.1)]);
        gesture.pointer_up(model, None);
    }

    #[test]
    fn test_brush_gesture_commits_stroke() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();

        let out = gesture.pointer_down(&mut model, SurfacePoint::new(0.0, 0.0), style());
        assert_eq!(out, GestureOutcome::Progress);
        gesture.pointer_move(
            &mut model,
            &[SurfacePoint::new(1.0, 0.0), SurfacePoint::new(2.0, 0.0)],
        );
        let out = gesture.pointer_up(&mut model, Some(SurfacePoint::new(3.0, 0.0)));
        assert_eq!(out, GestureOutcome::Commit);

        assert_eq!(model.len(), 1);
        let obj = &model.objects()[0];
        assert_eq!(obj.kind, ObjectKind::Stroke);
        // down + 2 coalesced moves + the up sample
        assert_eq!(obj.points.len(), 4);
        assert!(!obj.style.erase);
    }

    #[test]
    fn test_eraser_marks_stroke_subtractive() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();
        gesture.set_tool(Tool::Eraser, &mut model);

        gesture.pointer_down(&mut model, SurfacePoint::new(0.0, 0.0), style());
        gesture.pointer_up(&mut model, None);
        assert!(model.objects()[0].style.erase);
    }

    #[test]
    fn test_brush_smooths_pressure() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();

        gesture.pointer_down(
            &mut model,
            SurfacePoint::with_pressure(0.0, 0.0, 1.0),
            style(),
        );
        gesture.pointer_move(&mut model, &[SurfacePoint::with_pressure(1.0, 0.0, 0.0)]);
        gesture.pointer_up(&mut model, None);

        let points = &model.objects()[0].points;
        assert_eq!(points[0].pressure, Some(1.0));
        // Early blend factor 0.7 toward the raw 0.0 sample.
        let p = points[1].pressure.unwrap();
        assert!((p - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_shape_gesture_previews_then_commits() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();
        gesture.set_tool(Tool::Rectangle, &mut model);

        let out = gesture.pointer_down(&mut model, SurfacePoint::new(10.0, 10.0), style());
        assert_eq!(out, GestureOutcome::Preview);
        let out = gesture.pointer_move(&mut model, &[SurfacePoint::new(60.0, 40.0)]);
        assert_eq!(out, GestureOutcome::Preview);
        assert_eq!(model.in_progress().unwrap().points.len(), 2);

        let out = gesture.pointer_up(&mut model, Some(SurfacePoint::new(80.0, 50.0)));
        assert_eq!(out, GestureOutcome::Commit);
        assert_eq!(model.objects()[0].points[1].x, 80.0);
    }

    #[test]
    fn test_object_eraser_wipes_continuously() {
        let mut model = ObjectModel::new();
        draw_line(&mut model, (0.0, 0.0), (100.0, 0.0));
        draw_line(&mut model, (0.0, 50.0), (100.0, 50.0));
        assert_eq!(model.len(), 2);

        let mut gesture = ToolGesture::new();
        gesture.set_tool(Tool::ObjectEraser, &mut model);

        let out = gesture.pointer_down(&mut model, SurfacePoint::new(50.0, 0.0), style());
        assert_eq!(out, GestureOutcome::Removed);
        assert_eq!(model.len(), 1);

        let out = gesture.pointer_move(&mut model, &[SurfacePoint::new(50.0, 50.0)]);
        assert_eq!(out, GestureOutcome::Removed);
        assert!(model.is_empty());

        let out = gesture.pointer_up(&mut model, None);
        assert_eq!(out, GestureOutcome::Commit);
    }

    #[test]
    fn test_object_eraser_miss_ends_without_commit() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();
        gesture.set_tool(Tool::ObjectEraser, &mut model);

        gesture.pointer_down(&mut model, SurfacePoint::new(5.0, 5.0), style());
        gesture.pointer_move(&mut model, &[SurfacePoint::new(6.0, 6.0)]);
        let out = gesture.pointer_up(&mut model, None);
        assert_eq!(out, GestureOutcome::End);
    }

    #[test]
    fn test_finalize_is_idempotent() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();

        gesture.pointer_down(&mut model, SurfacePoint::new(0.0, 0.0), style());
        assert_eq!(gesture.pointer_up(&mut model, None), GestureOutcome::Commit);
        // The window-level fallback fires after the surface handler already
        // finalized.
        assert_eq!(gesture.pointer_up(&mut model, None), GestureOutcome::Ignored);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_cancel_matches_pointer_up() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();

        gesture.pointer_down(&mut model, SurfacePoint::new(0.0, 0.0), style());
        let out = gesture.pointer_cancel(&mut model, None);
        assert_eq!(out, GestureOutcome::Commit);
        assert_eq!(model.len(), 1);
    }

    #[test]
    fn test_move_without_gesture_is_ignored() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();
        let out = gesture.pointer_move(&mut model, &[SurfacePoint::new(1.0, 1.0)]);
        assert_eq!(out, GestureOutcome::Ignored);
    }

    #[test]
    fn test_tool_switch_drops_in_flight_gesture() {
        let mut model = ObjectModel::new();
        let mut gesture = ToolGesture::new();

        gesture.pointer_down(&mut model, SurfacePoint::new(0.0, 0.0), style());
        gesture.set_tool(Tool::Circle, &mut model);
        assert!(!gesture.is_active());
        assert!(model.in_progress().is_none());
        assert!(model.is_empty());
    }
}
