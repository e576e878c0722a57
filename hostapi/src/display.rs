//! Display and surface capabilities.
//!
//! A `Display` owns the host window. It hands out one `Surface` per layer;
//! every surface covers the same aspect-fitted rectangle and surfaces are
//! stacked by ascending layer index.

use canopy_primitives::geometry::Rect;
use canopy_primitives::wire::CursorStyle;
use canopy_primitives::Color;

use crate::raster::Raster;

/// The host window.
pub trait Display: Send {
    /// Current host viewport size in pixels.
    fn viewport_size(&self) -> (f32, f32);

    /// Allocate a new surface for `layer` covering `bounds`.
    fn create_surface(&mut self, layer: i32, bounds: Rect) -> Box<dyn Surface>;

    /// Restack the attached surfaces; `layers` is sorted ascending.
    fn attach_surfaces(&mut self, layers: &[i32]);

    fn set_title(&mut self, title: &str);
}

/// One drawing layer, with a canvas-style save/restore state stack.
pub trait Surface: Send {
    fn set_bounds(&mut self, bounds: Rect);

    /// Erase all pixels.
    fn clear(&mut self);

    fn set_cursor(&mut self, cursor: CursorStyle);

    fn save(&mut self);

    fn restore(&mut self);

    /// Rotate subsequent drawing by `angle` radians about `(cx, cy)`.
    fn rotate(&mut self, cx: f32, cy: f32, angle: f32);

    /// Intersect the clip region with `path`.
    fn clip(&mut self, path: &Path);

    fn fill(&mut self, path: &Path, color: Color);

    fn stroke(&mut self, path: &Path, style: &StrokeStyle);

    /// Copy `src` out of `image` to `(dst_x, dst_y)` at 1:1 scale.
    fn draw_image(&mut self, image: &Raster, src: PixelRect, dst_x: i32, dst_y: i32);
}

/// Integer pixel rectangle inside a raster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole of a `width` by `height` raster.
    pub fn full(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub line_width: f32,
    /// `(dash, gap)`; `None` is a solid line.
    pub dash: Option<(f32, f32)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathOp {
    MoveTo(f32, f32),
    LineTo(f32, f32),
    QuadTo { cx: f32, cy: f32, x: f32, y: f32 },
    Rect { x: f32, y: f32, width: f32, height: f32 },
    Ellipse { cx: f32, cy: f32, rx: f32, ry: f32 },
    Close,
}

/// A vector path built from canvas-style operations.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    ops: Vec<PathOp>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[PathOp] {
        &self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn move_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.ops.push(PathOp::MoveTo(x, y));
        self
    }

    pub fn line_to(&mut self, x: f32, y: f32) -> &mut Self {
        self.ops.push(PathOp::LineTo(x, y));
        self
    }

    pub fn quad_to(&mut self, cx: f32, cy: f32, x: f32, y: f32) -> &mut Self {
        self.ops.push(PathOp::QuadTo { cx, cy, x, y });
        self
    }

    pub fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) -> &mut Self {
        self.ops.push(PathOp::Rect { x, y, width, height });
        self
    }

    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> &mut Self {
        self.ops.push(PathOp::Ellipse { cx, cy, rx, ry });
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.ops.push(PathOp::Close);
        self
    }

    /// Rectangle with corners rounded by quadratic curves of radius `r`.
    pub fn rounded_rect(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, r: f32) -> &mut Self {
        self.move_to(x1 + r, y1)
            .line_to(x2 - r, y1)
            .quad_to(x2, y1, x2, y1 + r)
            .line_to(x2, y2 - r)
            .quad_to(x2, y2, x2 - r, y2)
            .line_to(x1 + r, y2)
            .quad_to(x1, y2, x1, y2 - r)
            .line_to(x1, y1 + r)
            .quad_to(x1, y1, x1 + r, y1)
            .close()
    }

    /// Polygon through unit `points` scaled to `width` x `height` around
    /// `(cx, cy)`. Two-point polygons stay open.
    pub fn polygon(&mut self, points: &[(f32, f32)], cx: f32, cy: f32, width: f32, height: f32) -> &mut Self {
        let mut iter = points.iter();
        if let Some((px, py)) = iter.next() {
            self.move_to(cx + px * width, cy + py * height);
        }
        for (px, py) in iter {
            self.line_to(cx + px * width, cy + py * height);
        }
        if points.len() > 2 {
            self.close();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_scales_and_closes() {
        let mut path = Path::new();
        path.polygon(&[(-0.5, -0.5), (-0.5, 0.5), (0.5, 0.0)], 10.0, 10.0, 20.0, 10.0);
        assert_eq!(
            path.ops(),
            &[
                PathOp::MoveTo(0.0, 5.0),
                PathOp::LineTo(0.0, 15.0),
                PathOp::LineTo(20.0, 10.0),
                PathOp::Close,
            ]
        );
    }

    #[test]
    fn test_line_stays_open() {
        let mut path = Path::new();
        path.polygon(&[(-0.5, 0.0), (0.5, 0.0)], 0.0, 0.0, 10.0, 4.0);
        assert_eq!(path.ops().len(), 2);
        assert!(!path.ops().contains(&PathOp::Close));
    }

    #[test]
    fn test_rounded_rect_has_four_corners() {
        let mut path = Path::new();
        path.rounded_rect(0.0, 0.0, 10.0, 10.0, 2.0);
        let corners = path
            .ops()
            .iter()
            .filter(|op| matches!(op, PathOp::QuadTo { .. }))
            .count();
        assert_eq!(corners, 4);
        assert_eq!(path.ops().first(), Some(&PathOp::MoveTo(2.0, 0.0)));
    }
}
