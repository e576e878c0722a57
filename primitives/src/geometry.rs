//! Surface geometry and unit shape outlines.
//!
//! Shape outlines are expressed in a unit box centred on the origin
//! (`-0.5..=0.5` on both axes) and scaled by the primitive's size at draw time.

use std::f32::consts::TAU;

/// Axis-aligned rectangle in host viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether a box of the given size centred at `(cx, cy)` overlaps this rect.
    pub fn intersects_centered(&self, cx: f32, cy: f32, width: f32, height: f32) -> bool {
        let (hw, hh) = (width.abs() / 2.0, height.abs() / 2.0);
        cx + hw >= self.x
            && cx - hw <= self.x + self.width
            && cy + hh >= self.y
            && cy - hh <= self.y + self.height
    }
}

/// Largest rectangle of `aspect_ratio` (width / height) that fits the
/// viewport, centred. Size is truncated to whole pixels so the rectangle
/// never exceeds the viewport; the offset is rounded.
pub fn fit_aspect_ratio(viewport_width: f32, viewport_height: f32, aspect_ratio: f32) -> Rect {
    if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) {
        return Rect::new(0.0, 0.0, viewport_width.floor(), viewport_height.floor());
    }
    let (mut width, mut height) = (viewport_width, viewport_height);
    if height * aspect_ratio > width {
        height = width / aspect_ratio;
    } else {
        width = height * aspect_ratio;
    }
    let (width, height) = (width.floor(), height.floor());
    Rect {
        x: ((viewport_width - width) / 2.0).round(),
        y: ((viewport_height - height) / 2.0).round(),
        width,
        height,
    }
}

// ── Unit outlines ──

const HEXAGON_HEIGHT_RATIO: f32 = 0.866_025_4;
const CURVE_PRECISION: usize = 24;

pub const LINE_POINTS: [(f32, f32); 2] = [(-0.5, 0.0), (0.5, 0.0)];

pub const TRIANGLE_POINTS: [(f32, f32); 3] = [(-0.5, -0.5), (-0.5, 0.5), (0.5, 0.0)];

fn points_on_circle(turns: &[f32], start: f32) -> Vec<(f32, f32)> {
    turns
        .iter()
        .map(|t| {
            let angle = (t + start) * TAU;
            (angle.cos() / 2.0, angle.sin() / 2.0)
        })
        .collect()
}

const SIXTHS: [f32; 6] = [0.0, 1.0 / 6.0, 2.0 / 6.0, 3.0 / 6.0, 4.0 / 6.0, 5.0 / 6.0];

/// Flat-topped hexagon stretched to fill the unit box vertically.
pub fn horizontal_hexagon_points() -> Vec<(f32, f32)> {
    points_on_circle(&SIXTHS, 0.0)
        .into_iter()
        .map(|(x, y)| (x, y / HEXAGON_HEIGHT_RATIO))
        .collect()
}

/// Pointy-topped hexagon stretched to fill the unit box horizontally.
pub fn vertical_hexagon_points() -> Vec<(f32, f32)> {
    points_on_circle(&SIXTHS, 0.25)
        .into_iter()
        .map(|(x, y)| (x / HEXAGON_HEIGHT_RATIO, y))
        .collect()
}

fn quadratic(p0: (f32, f32), p1: (f32, f32), control: (f32, f32), t: f32) -> (f32, f32) {
    let u = 1.0 - t;
    let (uu, tt, tu) = (u * u, t * t, 2.0 * t * u);
    (
        uu * p0.0 + tu * control.0 + tt * p1.0,
        uu * p0.1 + tu * control.1 + tt * p1.1,
    )
}

/// Closed outline of a tapering arc: the upper edge left to right, then the
/// lower edge right to left.
pub fn curve_points() -> Vec<(f32, f32)> {
    let (start_width, end_width) = (0.1f32, 0.0f32);
    let dw = (start_width + end_width) / 2.0;
    let upper = ((-0.5, -start_width / 2.0), (0.5, -end_width / 2.0), (0.0, -0.5));
    let lower = ((-0.5, start_width / 2.0), (0.5, end_width / 2.0), (0.0, -0.5 + dw));

    let mut first = Vec::with_capacity(CURVE_PRECISION + 1);
    let mut second = Vec::with_capacity(CURVE_PRECISION + 1);
    for i in 0..=CURVE_PRECISION {
        let t = i as f32 / CURVE_PRECISION as f32;
        first.push(quadratic(upper.0, upper.1, upper.2, t));
        second.push(quadratic(lower.0, lower.1, lower.2, t));
    }
    second.reverse();
    first.extend(second);
    first
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_fit_wide_viewport() {
        let r = fit_aspect_ratio(1000.0, 500.0, 16.0 / 9.0);
        assert_eq!(r.width, 888.0);
        assert_eq!(r.height, 500.0);
        assert_eq!(r.x, 56.0);
        assert_eq!(r.y, 0.0);
    }

    #[test]
    fn test_fit_tall_viewport() {
        let r = fit_aspect_ratio(400.0, 1000.0, 2.0);
        assert_eq!(r.width, 400.0);
        assert_eq!(r.height, 200.0);
        assert_eq!(r.x, 0.0);
        assert_eq!(r.y, 400.0);
    }

    #[test]
    fn test_fit_degenerate_ratio_uses_viewport() {
        let r = fit_aspect_ratio(300.0, 200.0, 0.0);
        assert_eq!(r, Rect::new(0.0, 0.0, 300.0, 200.0));
    }

    #[test]
    fn test_intersects_centered() {
        let r = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(r.intersects_centered(50.0, 50.0, 10.0, 10.0));
        assert!(r.intersects_centered(-4.0, 50.0, 10.0, 10.0));
        assert!(!r.intersects_centered(-6.0, 50.0, 10.0, 10.0));
        assert!(!r.intersects_centered(50.0, 200.0, 10.0, 10.0));
    }

    #[test]
    fn test_hexagons_span_unit_box() {
        let h = horizontal_hexagon_points();
        assert_eq!(h.len(), 6);
        assert!(close(h[0].0, 0.5));
        let max_y = h.iter().map(|p| p.1).fold(f32::MIN, f32::max);
        assert!(close(max_y, 0.5));

        let v = vertical_hexagon_points();
        assert!(close(v[0].1, 0.5));
        let max_x = v.iter().map(|p| p.0).fold(f32::MIN, f32::max);
        assert!(close(max_x, 0.5));
    }

    #[test]
    fn test_curve_outline() {
        let c = curve_points();
        assert_eq!(c.len(), 2 * (CURVE_PRECISION + 1));
        assert!(close(c[0].0, -0.5));
        assert!(close(c[0].1, -0.05));
        assert!(close(c[CURVE_PRECISION].0, 0.5));
        assert!(close(c[c.len() - 1].1, 0.05));
    }
}
