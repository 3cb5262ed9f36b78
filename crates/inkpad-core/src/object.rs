//! Drawable primitives and their hit-testing.

use crate::geometry::{point_to_segment_distance, PressureOptions};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Extra slack around strokes and lines when hit-testing, in surface pixels.
/// Keeps thin strokes erasable without pixel-perfect aim.
pub const HIT_TOLERANCE: f64 = 5.0;

/// Serializable stroke color (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// A sampled pointer position in surface pixel space, already corrected for
/// display scaling. Pressure is in `[0, 1]` when the device reports it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl SurfacePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            pressure: None,
        }
    }

    pub fn with_pressure(x: f64, y: f64, pressure: f64) -> Self {
        Self {
            x,
            y,
            pressure: Some(pressure),
        }
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// The closed set of drawable primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Freehand path, one point per sampled input position.
    Stroke,
    /// Exactly two points: start and end.
    Line,
    /// Exactly two points: anchor and opposite corner.
    Rectangle,
    /// Exactly two points: center and a point on the radius.
    Circle,
}

impl ObjectKind {
    /// Shape kinds carry exactly two points; strokes are open-ended.
    pub fn is_shape(self) -> bool {
        !matches!(self, ObjectKind::Stroke)
    }
}

/// Style properties of a drawn object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStyle {
    pub color: Color,
    /// Base stroke width; strokes modulate it per point by pressure.
    pub width: f64,
    /// Shapes only.
    pub filled: bool,
    /// Subtracts coverage instead of adding it (freehand eraser).
    pub erase: bool,
    /// Pressure settings captured at creation time, if pressure applies.
    pub pressure: Option<PressureOptions>,
}

impl Default for ObjectStyle {
    fn default() -> Self {
        Self {
            color: Color::black(),
            width: 4.0,
            filled: false,
            erase: false,
            pressure: None,
        }
    }
}

/// The atomic drawable unit: a stroke, line, rectangle or circle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawObject {
    pub id: Uuid,
    pub kind: ObjectKind,
    /// Ordered samples. Never empty; shapes never exceed two points.
    pub points: Vec<SurfacePoint>,
    pub style: ObjectStyle,
}

impl DrawObject {
    pub fn new(kind: ObjectKind, first: SurfacePoint, style: ObjectStyle) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            points: vec![first],
            style,
        }
    }

    /// Normalized bounding box of the two defining points, valid regardless
    /// of drag direction.
    pub fn rect(&self) -> Rect {
        let a = self.points[0].pos();
        let b = self.points.last().map(|p| p.pos()).unwrap_or(a);
        Rect::from_points(a, b)
    }

    /// Circle radius: distance between the two defining points.
    pub fn radius(&self) -> f64 {
        let a = self.points[0].pos();
        let b = self.points.last().map(|p| p.pos()).unwrap_or(a);
        a.distance(b)
    }

    /// Does `point` hit this object?
    pub fn hit_test(&self, point: Point) -> bool {
        match self.kind {
            ObjectKind::Stroke | ObjectKind::Line => self.hit_test_path(point),
            ObjectKind::Rectangle => self.rect().contains(point),
            ObjectKind::Circle => self.points[0].pos().distance(point) <= self.radius(),
        }
    }

    fn hit_test_path(&self, point: Point) -> bool {
        let tolerance = self.style.width / 2.0 + HIT_TOLERANCE;
        if self.points.len() < 2 {
            return self.points[0].pos().distance(point) <= tolerance;
        }
        self.points
            .windows(2)
            .any(|w| point_to_segment_distance(point, w[0].pos(), w[1].pos()) <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (f64, f64), b: (f64, f64), width: f64) -> DrawObject {
        let mut obj = DrawObject::new(
            ObjectKind::Line,
            SurfacePoint::new(a.0, a.1),
            ObjectStyle {
                width,
                ..Default::default()
            },
        );
        obj.points.push(SurfacePoint::new(b.0, b.1));
        obj
    }

    #[test]
    fn test_line_hit_within_tolerance() {
        // Width 10: tolerance is 10/2 + 5 = 10 pixels off the segment.
        let obj = line((0.0, 0.0), (100.0, 0.0), 10.0);
        assert!(obj.hit_test(Point::new(50.0, 6.0)));
        assert!(!obj.hit_test(Point::new(50.0, 20.0)));
    }

    #[test]
    fn test_stroke_single_point_hit() {
        let obj = DrawObject::new(
            ObjectKind::Stroke,
            SurfacePoint::new(10.0, 10.0),
            ObjectStyle {
                width: 4.0,
                ..Default::default()
            },
        );
        assert!(obj.hit_test(Point::new(12.0, 10.0)));
        assert!(!obj.hit_test(Point::new(20.0, 10.0)));
    }

    #[test]
    fn test_rectangle_hit_normalizes_drag_direction() {
        // Dragged from bottom-right to top-left.
        let mut obj = DrawObject::new(
            ObjectKind::Rectangle,
            SurfacePoint::new(100.0, 80.0),
            ObjectStyle::default(),
        );
        obj.points.push(SurfacePoint::new(20.0, 10.0));
        assert!(obj.hit_test(Point::new(50.0, 40.0)));
        assert!(!obj.hit_test(Point::new(150.0, 40.0)));
    }

    #[test]
    fn test_circle_hit() {
        let mut obj = DrawObject::new(
            ObjectKind::Circle,
            SurfacePoint::new(50.0, 50.0),
            ObjectStyle::default(),
        );
        obj.points.push(SurfacePoint::new(80.0, 50.0));
        assert!((obj.radius() - 30.0).abs() < 1e-9);
        assert!(obj.hit_test(Point::new(50.0, 75.0)));
        assert!(!obj.hit_test(Point::new(50.0, 85.0)));
    }

    #[test]
    fn test_object_serde_round_trip() {
        let obj = line((0.0, 1.0), (2.0, 3.0), 6.0);
        let json = serde_json::to_string(&obj).unwrap();
        let back: DrawObject = serde_json::from_str(&json).unwrap();
        assert_eq!(obj, back);
    }
}
