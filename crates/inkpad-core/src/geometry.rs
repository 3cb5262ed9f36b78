//! Pure geometry and pressure math. No state besides the smoother.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Distance from a point to a line segment (a→b), clamped to the endpoints.
pub fn point_to_segment_distance(point: Point, a: Point, b: Point) -> f64 {
    let seg = kurbo::Vec2::new(b.x - a.x, b.y - a.y);
    let pv = kurbo::Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    proj.distance(point)
}

/// Eased stroke width for a pressure sample.
///
/// Quadratic easing compresses the low end so light touches stay visible
/// while mid-range pressures dominate the usable width range.
pub fn pressure_width(base: f64, pressure: f64, min_scale: f64, max_scale: f64) -> f64 {
    let p = pressure.clamp(0.0, 1.0);
    base * (min_scale + p * p * (max_scale - min_scale))
}

/// Pressure-to-width settings, snapshotted onto each object at creation time
/// so replaying an object stays deterministic after settings change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureOptions {
    pub enabled: bool,
    pub min_scale: f64,
    pub max_scale: f64,
}

impl Default for PressureOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            min_scale: 0.3,
            max_scale: 1.0,
        }
    }
}

impl PressureOptions {
    /// Rendered width for a sample. Falls back to the base width when
    /// disabled or when the sample carries no pressure.
    pub fn width_for(&self, base: f64, pressure: Option<f64>) -> f64 {
        if !self.enabled {
            return base;
        }
        match pressure {
            Some(p) => pressure_width(base, p, self.min_scale, self.max_scale),
            None => base,
        }
    }
}

/// Blend factor applied while the first few samples of a stroke arrive.
/// Stylus jitter is worst right at pen-down, so early samples are pulled
/// harder toward the incoming value to settle quickly.
const EARLY_BLEND: f64 = 0.7;
/// Blend factor once the stroke is underway.
const STEADY_BLEND: f64 = 0.3;
/// Number of samples smoothed with [`EARLY_BLEND`].
const EARLY_SAMPLES: usize = 3;

/// Exponential weighted average over raw pressure samples.
#[derive(Debug, Clone, Default)]
pub struct PressureSmoother {
    smoothed: Option<f64>,
    samples: usize,
}

impl PressureSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw sample and get the smoothed value back. Samples without
    /// pressure pass through untouched and do not advance the average.
    pub fn sample(&mut self, raw: Option<f64>) -> Option<f64> {
        let raw = raw?;
        self.samples += 1;
        let blend = if self.samples <= EARLY_SAMPLES {
            EARLY_BLEND
        } else {
            STEADY_BLEND
        };
        let next = match self.smoothed {
            Some(prev) => prev * (1.0 - blend) + raw * blend,
            None => raw,
        };
        self.smoothed = Some(next);
        Some(next)
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
        self.samples = 0;
    }
}

/// Midpoint of two points, used by the quadratic stroke smoothing.
pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5)
}

/// Evaluate a quadratic bezier at `t`.
pub fn quad_point(p0: Point, ctrl: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    Point::new(
        u * u * p0.x + 2.0 * u * t * ctrl.x + t * t * p1.x,
        u * u * p0.y + 2.0 * u * t * ctrl.y + t * t * p1.y,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_distance_perpendicular() {
        let d = point_to_segment_distance(
            Point::new(50.0, 6.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((d - 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        // Beyond the end of the segment: distance to the endpoint, not the
        // infinite line.
        let d = point_to_segment_distance(
            Point::new(110.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(100.0, 0.0),
        );
        assert!((d - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_distance_degenerate() {
        let p = Point::new(3.0, 4.0);
        let d = point_to_segment_distance(p, Point::ZERO, Point::ZERO);
        assert!((d - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_width_bounds() {
        assert!((pressure_width(10.0, 0.0, 0.3, 1.0) - 3.0).abs() < 1e-9);
        assert!((pressure_width(10.0, 1.0, 0.3, 1.0) - 10.0).abs() < 1e-9);
        // 10 * (0.3 + 0.25 * 0.7) = 4.75
        assert!((pressure_width(10.0, 0.5, 0.3, 1.0) - 4.75).abs() < 1e-9);
    }

    #[test]
    fn test_pressure_width_clamps_input() {
        assert!((pressure_width(10.0, -1.0, 0.3, 1.0) - 3.0).abs() < 1e-9);
        assert!((pressure_width(10.0, 2.0, 0.3, 1.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_width_for_disabled() {
        let opts = PressureOptions {
            enabled: false,
            ..Default::default()
        };
        assert!((opts.width_for(8.0, Some(0.1)) - 8.0).abs() < 1e-9);
    }

    #[test]
    fn test_smoother_seeds_with_first_sample() {
        let mut s = PressureSmoother::new();
        assert_eq!(s.sample(Some(0.5)), Some(0.5));
    }

    #[test]
    fn test_smoother_early_blend() {
        let mut s = PressureSmoother::new();
        s.sample(Some(1.0));
        // Second sample is still in the early window: 1.0 * 0.3 + 0.0 * 0.7
        let v = s.sample(Some(0.0)).unwrap();
        assert!((v - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_smoother_steady_blend() {
        let mut s = PressureSmoother::new();
        for _ in 0..3 {
            s.sample(Some(1.0));
        }
        // Fourth sample uses the steady factor: 1.0 * 0.7 + 0.0 * 0.3
        let v = s.sample(Some(0.0)).unwrap();
        assert!((v - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_smoother_passes_missing_pressure() {
        let mut s = PressureSmoother::new();
        s.sample(Some(0.8));
        assert_eq!(s.sample(None), None);
        // The average is untouched by the missing sample.
        let v = s.sample(Some(0.8)).unwrap();
        assert!((v - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_quad_point_endpoints() {
        let p0 = Point::new(0.0, 0.0);
        let c = Point::new(5.0, 10.0);
        let p1 = Point::new(10.0, 0.0);
        assert_eq!(quad_point(p0, c, p1, 0.0), p0);
        assert_eq!(quad_point(p0, c, p1, 1.0), p1);
        let mid = quad_point(p0, c, p1, 0.5);
        assert!((mid.y - 5.0).abs() < 1e-9);
    }
}
