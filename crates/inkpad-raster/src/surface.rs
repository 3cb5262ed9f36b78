//! RGBA8 pixel surface and the per-object coverage mask.

use inkpad_core::geometry::point_to_segment_distance;
use inkpad_core::object::Color;
use kurbo::{Point, Rect};

/// Antialiased edge coverage for a pixel whose center is `dist` away from a
/// primitive of radius `radius`. Full inside, zero outside, smoothstep over
/// the one-pixel boundary band.
fn edge_coverage(dist: f64, radius: f64) -> f64 {
    let t = (radius + 0.5 - dist).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Per-object coverage accumulator.
///
/// Primitives are stamped with max-combine, so overlapping stamps within one
/// object (consecutive capsules of a stroke, a shape's fill under its
/// outline) never double-composite. The whole mask is blended onto the
/// surface in a single pass.
#[derive(Debug, Clone)]
pub struct CoverageMask {
    width: u32,
    height: u32,
    data: Vec<f64>,
}

impl CoverageMask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width as usize * height as usize],
        }
    }

    pub fn clear(&mut self) {
        self.data.fill(0.0);
    }

    /// Pixel rows intersecting `rect`, clamped to the mask.
    fn rows(&self, rect: Rect) -> std::ops::Range<u32> {
        let y0 = rect.y0.floor().max(0.0) as u32;
        let y1 = (rect.y1.ceil().max(0.0) as u32).min(self.height);
        y0.min(self.height)..y1
    }

    fn cols(&self, rect: Rect) -> std::ops::Range<u32> {
        let x0 = rect.x0.floor().max(0.0) as u32;
        let x1 = (rect.x1.ceil().max(0.0) as u32).min(self.width);
        x0.min(self.width)..x1
    }

    fn accumulate(&mut self, x: u32, y: u32, coverage: f64) {
        let idx = y as usize * self.width as usize + x as usize;
        if coverage > self.data[idx] {
            self.data[idx] = coverage;
        }
    }

    /// Stamp a capsule: the set of points within `radius` of segment a→b.
    /// A zero-length segment degenerates to a disc.
    pub fn stamp_capsule(&mut self, a: Point, b: Point, radius: f64) {
        let bounds = Rect::from_points(a, b).inflate(radius + 1.0, radius + 1.0);
        for y in self.rows(bounds) {
            for x in self.cols(bounds) {
                let center = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let d = point_to_segment_distance(center, a, b);
                let c = edge_coverage(d, radius);
                if c > 0.0 {
                    self.accumulate(x, y, c);
                }
            }
        }
    }

    pub fn stamp_disc(&mut self, center: Point, radius: f64) {
        self.stamp_capsule(center, center, radius);
    }

    /// Stamp an annulus of the given center-line radius and half thickness.
    pub fn stamp_ring(&mut self, center: Point, radius: f64, half_width: f64) {
        let reach = radius + half_width + 1.0;
        let bounds = Rect::new(
            center.x - reach,
            center.y - reach,
            center.x + reach,
            center.y + reach,
        );
        for y in self.rows(bounds) {
            for x in self.cols(bounds) {
                let p = Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let d = (center.distance(p) - radius).abs();
                let c = edge_coverage(d, half_width);
                if c > 0.0 {
                    self.accumulate(x, y, c);
                }
            }
        }
    }

    /// Fill an axis-aligned rectangle with analytic edge coverage.
    pub fn fill_rect(&mut self, rect: Rect) {
        let rect = rect.abs();
        let bounds = rect.inflate(1.0, 1.0);
        for y in self.rows(bounds) {
            for x in self.cols(bounds) {
                let cx = x as f64 + 0.5;
                let cy = y as f64 + 0.5;
                // Overlap of the unit pixel with the rect, per axis.
                let ox = (rect.x1.min(cx + 0.5) - rect.x0.max(cx - 0.5)).clamp(0.0, 1.0);
                let oy = (rect.y1.min(cy + 0.5) - rect.y0.max(cy - 0.5)).clamp(0.0, 1.0);
                let c = ox * oy;
                if c > 0.0 {
                    self.accumulate(x, y, c);
                }
            }
        }
    }

    fn coverage_at(&self, x: u32, y: u32) -> f64 {
        self.data[y as usize * self.width as usize + x as usize]
    }
}

/// An RGBA8 raster with straight (non-premultiplied) alpha and a transparent
/// background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize * 4 {
            return None;
        }
        Some(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        self.pixels.fill(0);
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[i..i + 4].copy_from_slice(&rgba);
    }

    /// Composite a coverage mask onto the surface. Ink blends source-over;
    /// erase composites destination-out, subtracting alpha and leaving color
    /// channels alone.
    pub fn composite_mask(&mut self, mask: &CoverageMask, color: Color, erase: bool) {
        debug_assert_eq!((mask.width, mask.height), (self.width, self.height));
        let width = self.width.min(mask.width);
        let height = self.height.min(mask.height);
        for y in 0..height {
            for x in 0..width {
                let coverage = mask.coverage_at(x, y);
                if coverage <= 0.0 {
                    continue;
                }
                let base = self.pixel(x, y);
                let out = if erase {
                    erase_pixel(base, coverage)
                } else {
                    blend_pixel(base, color, coverage)
                };
                self.set_pixel(x, y, out);
            }
        }
    }

    /// Bilinear-resample into new dimensions. Content scales to fill; nothing
    /// is cropped.
    pub fn resize_preserving(&self, width: u32, height: u32) -> Surface {
        let mut out = Surface::new(width, height);
        if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            return out;
        }
        let sx = self.width as f64 / width as f64;
        let sy = self.height as f64 / height as f64;
        for y in 0..height {
            for x in 0..width {
                let src_x = (x as f64 + 0.5) * sx - 0.5;
                let src_y = (y as f64 + 0.5) * sy - 0.5;
                out.set_pixel(x, y, self.sample_bilinear(src_x, src_y));
            }
        }
        out
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> [u8; 4] {
        let max_x = (self.width - 1) as f64;
        let max_y = (self.height - 1) as f64;
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let mut out = [0u8; 4];
        let p00 = self.pixel(x0, y0);
        let p10 = self.pixel(x1, y0);
        let p01 = self.pixel(x0, y1);
        let p11 = self.pixel(x1, y1);
        for c in 0..4 {
            let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
            let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
            out[c] = (top * (1.0 - fy) + bottom * fy).round().clamp(0.0, 255.0) as u8;
        }
        out
    }

    /// Flatten the surface over an opaque background color, for export.
    pub fn composited_over(&self, background: Color) -> Surface {
        let mut out = Surface::new(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let p = self.pixel(x, y);
                let a = p[3] as f64 / 255.0;
                let mut rgba = [0u8; 4];
                let bg = [background.r, background.g, background.b];
                for c in 0..3 {
                    let v = p[c] as f64 * a + bg[c] as f64 * (1.0 - a);
                    rgba[c] = v.round().clamp(0.0, 255.0) as u8;
                }
                rgba[3] = 255;
                out.set_pixel(x, y, rgba);
            }
        }
        out
    }
}

fn blend_pixel(base: [u8; 4], color: Color, coverage: f64) -> [u8; 4] {
    let ta = (color.a as f64 / 255.0) * coverage;
    let ba = base[3] as f64 / 255.0;
    let out_a = ta + ba * (1.0 - ta);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let top = [color.r as f64, color.g as f64, color.b as f64];
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (top[c] * ta + base[c] as f64 * ba * (1.0 - ta)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    out
}

fn erase_pixel(base: [u8; 4], coverage: f64) -> [u8; 4] {
    let a = (base[3] as f64 * (1.0 - coverage)).round().clamp(0.0, 255.0) as u8;
    [base[0], base[1], base[2], a]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_surface_is_transparent() {
        let s = Surface::new(4, 4);
        assert!(s.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_disc_covers_center_fully() {
        let mut mask = CoverageMask::new(20, 20);
        mask.stamp_disc(Point::new(10.0, 10.0), 5.0);
        let mut s = Surface::new(20, 20);
        s.composite_mask(&mask, Color::black(), false);

        assert_eq!(s.pixel(10, 10), [0, 0, 0, 255]);
        // Well outside the disc.
        assert_eq!(s.pixel(1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn test_overlapping_stamps_do_not_darken() {
        let mut mask = CoverageMask::new(20, 20);
        mask.stamp_disc(Point::new(10.0, 10.0), 5.0);
        mask.stamp_disc(Point::new(11.0, 10.0), 5.0);
        let mut s = Surface::new(20, 20);
        // Translucent ink would show a seam if coverage added up.
        s.composite_mask(&mask, Color::new(0, 0, 0, 128), false);
        assert_eq!(s.pixel(10, 10)[3], 128);
    }

    #[test]
    fn test_erase_subtracts_alpha() {
        let mut ink = CoverageMask::new(10, 10);
        ink.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        let mut s = Surface::new(10, 10);
        s.composite_mask(&ink, Color::black(), false);
        assert_eq!(s.pixel(5, 5)[3], 255);

        let mut eraser = CoverageMask::new(10, 10);
        eraser.stamp_disc(Point::new(5.0, 5.0), 2.0);
        s.composite_mask(&eraser, Color::black(), true);
        assert_eq!(s.pixel(5, 5)[3], 0);
        // Pixels away from the eraser keep their ink.
        assert_eq!(s.pixel(0, 0)[3], 255);
    }

    #[test]
    fn test_fill_rect_partial_edge_coverage() {
        let mut mask = CoverageMask::new(10, 10);
        mask.fill_rect(Rect::new(2.5, 0.0, 7.5, 10.0));
        let mut s = Surface::new(10, 10);
        s.composite_mask(&mask, Color::black(), false);

        assert_eq!(s.pixel(5, 5)[3], 255);
        // The rect covers exactly half of columns 2 and 7.
        assert_eq!(s.pixel(2, 5)[3], 128);
        assert_eq!(s.pixel(0, 5)[3], 0);
    }

    #[test]
    fn test_capsule_clips_to_bounds() {
        let mut mask = CoverageMask::new(8, 8);
        mask.stamp_capsule(Point::new(-10.0, 4.0), Point::new(20.0, 4.0), 2.0);
        let mut s = Surface::new(8, 8);
        s.composite_mask(&mask, Color::black(), false);
        assert_eq!(s.pixel(0, 4)[3], 255);
        assert_eq!(s.pixel(7, 4)[3], 255);
    }

    #[test]
    fn test_resize_preserves_solid_fill() {
        let mut mask = CoverageMask::new(8, 8);
        mask.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0));
        let mut s = Surface::new(8, 8);
        s.composite_mask(&mask, Color::new(10, 200, 30, 255), false);

        let big = s.resize_preserving(16, 16);
        assert_eq!(big.width(), 16);
        assert_eq!(big.pixel(8, 8), [10, 200, 30, 255]);
        assert_eq!(big.pixel(0, 0), [10, 200, 30, 255]);
    }

    #[test]
    fn test_composited_over_white() {
        let mut s = Surface::new(2, 1);
        let mut mask = CoverageMask::new(2, 1);
        mask.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0));
        s.composite_mask(&mask, Color::black(), false);

        let flat = s.composited_over(Color::white());
        assert_eq!(flat.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(flat.pixel(1, 0), [255, 255, 255, 255]);
    }
}
