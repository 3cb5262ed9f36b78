//! The render pass: object list in, pixels out.

use crate::surface::{CoverageMask, Surface};
use inkpad_core::geometry::{midpoint, quad_point, PressureOptions};
use inkpad_core::object::{DrawObject, ObjectKind};
use kurbo::Point;

/// Spacing between flattened curve samples, in pixels. Small enough that
/// consecutive capsules overlap at every practical stroke width.
const FLATTEN_STEP: f64 = 1.5;

/// Clear the surface and draw every object in z-order, the in-progress
/// object on top. Two runs over the same list produce byte-identical pixels.
pub fn render_objects(
    surface: &mut Surface,
    objects: &[DrawObject],
    in_progress: Option<&DrawObject>,
) {
    surface.clear();
    composite_objects(surface, objects, in_progress);
}

/// Draw every object in z-order over whatever the surface already holds.
/// Used for pages whose baseline is raster content rather than objects.
pub fn composite_objects(
    surface: &mut Surface,
    objects: &[DrawObject],
    in_progress: Option<&DrawObject>,
) {
    let mut mask = CoverageMask::new(surface.width(), surface.height());
    for object in objects.iter().chain(in_progress) {
        mask.clear();
        draw_object(surface, &mut mask, object);
    }
}

/// Rasterize one object through `mask` onto `surface`. The mask must match
/// the surface dimensions and is left holding the object's coverage.
pub fn draw_object(surface: &mut Surface, mask: &mut CoverageMask, object: &DrawObject) {
    match object.kind {
        ObjectKind::Stroke => stamp_stroke(mask, object),
        ObjectKind::Line => stamp_line(mask, object),
        ObjectKind::Rectangle => stamp_rectangle(mask, object),
        ObjectKind::Circle => stamp_circle(mask, object),
    }
    surface.composite_mask(mask, object.style.color, object.style.erase);
}

/// Rendered half-width at one stroke sample.
fn half_width(object: &DrawObject, pressure: Option<f64>) -> f64 {
    let opts = object.style.pressure.unwrap_or(PressureOptions {
        enabled: false,
        ..Default::default()
    });
    (opts.width_for(object.style.width, pressure) / 2.0).max(0.25)
}

/// Stamp a straight run with radius interpolated between the endpoints.
fn stamp_tapered(mask: &mut CoverageMask, a: Point, b: Point, ra: f64, rb: f64) {
    let len = a.distance(b);
    if len < f64::EPSILON {
        mask.stamp_disc(a, ra.max(rb));
        return;
    }
    let steps = (len / FLATTEN_STEP).ceil().max(1.0) as usize;
    let mut prev = a;
    let mut prev_r = ra;
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let p = Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t);
        let r = ra + (rb - ra) * t;
        mask.stamp_capsule(prev, p, prev_r.min(r));
        mask.stamp_disc(p, r);
        prev = p;
        prev_r = r;
    }
}

/// Flatten one quadratic segment and stamp it with linearly eased radius.
fn stamp_quad(mask: &mut CoverageMask, p0: Point, ctrl: Point, p1: Point, r0: f64, r1: f64) {
    let chord = p0.distance(ctrl) + ctrl.distance(p1);
    let steps = (chord / FLATTEN_STEP).ceil().max(2.0) as usize;
    let mut prev = p0;
    let mut prev_r = r0;
    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let p = quad_point(p0, ctrl, p1, t);
        let r = r0 + (r1 - r0) * t;
        stamp_tapered(mask, prev, p, prev_r, r);
        prev = p;
        prev_r = r;
    }
}

/// Freehand stroke: a single sample is a dot; otherwise piecewise quadratics
/// through the midpoints of consecutive samples, the samples themselves
/// acting as control points.
fn stamp_stroke(mask: &mut CoverageMask, object: &DrawObject) {
    let points = &object.points;
    let pos = |i: usize| points[i].pos();
    let radius = |i: usize| half_width(object, points[i].pressure);

    match points.len() {
        0 => {}
        1 => mask.stamp_disc(pos(0), radius(0)),
        2 => stamp_tapered(mask, pos(0), pos(1), radius(0), radius(1)),
        n => {
            stamp_tapered(
                mask,
                pos(0),
                midpoint(pos(0), pos(1)),
                radius(0),
                (radius(0) + radius(1)) / 2.0,
            );
            for i in 1..n - 1 {
                let m0 = midpoint(pos(i - 1), pos(i));
                let m1 = midpoint(pos(i), pos(i + 1));
                let r0 = (radius(i - 1) + radius(i)) / 2.0;
                let r1 = (radius(i) + radius(i + 1)) / 2.0;
                stamp_quad(mask, m0, pos(i), m1, r0, r1);
            }
            stamp_tapered(
                mask,
                midpoint(pos(n - 2), pos(n - 1)),
                pos(n - 1),
                (radius(n - 2) + radius(n - 1)) / 2.0,
                radius(n - 1),
            );
        }
    }
}

fn stamp_line(mask: &mut CoverageMask, object: &DrawObject) {
    let a = object.points[0].pos();
    let b = object.points.last().map(|p| p.pos()).unwrap_or(a);
    let r = (object.style.width / 2.0).max(0.25);
    mask.stamp_capsule(a, b, r);
}

fn stamp_rectangle(mask: &mut CoverageMask, object: &DrawObject) {
    let rect = object.rect();
    if object.style.filled {
        mask.fill_rect(rect);
    }
    let r = (object.style.width / 2.0).max(0.25);
    let corners = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    for i in 0..4 {
        mask.stamp_capsule(corners[i], corners[(i + 1) % 4], r);
    }
}

fn stamp_circle(mask: &mut CoverageMask, object: &DrawObject) {
    let center = object.points[0].pos();
    let radius = object.radius();
    if object.style.filled {
        mask.stamp_disc(center, radius);
    }
    let r = (object.style.width / 2.0).max(0.25);
    mask.stamp_ring(center, radius, r);
}
