//! Text shaping capability and the laid-out text handed to it.
//!
//! Layout (line breaking, token placement, caret position) is done by the
//! bridge; the host only measures runs and rasterizes a finished layout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use canopy_primitives::wire::Font;
use canopy_primitives::Color;

use crate::raster::Raster;

/// Fill for a text run: an exact color or a host-interpreted color name
/// coming from inline markup (e.g. `@red{...}`).
#[derive(Debug, Clone, PartialEq)]
pub enum TextPaint {
    Rgba(Color),
    Named(String),
}

/// Style of one text run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
    pub paint: TextPaint,
}

/// A run of text placed inside the layout box.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRun {
    pub content: String,
    pub style: TextStyle,
    /// Left edge of the run.
    pub x: f32,
    /// Bottom of the run's line box.
    pub y: f32,
}

/// Caret bar, in layout pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caret {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A fully laid-out block of text, ready to rasterize.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    pub width: u32,
    pub height: u32,
    pub runs: Vec<PlacedRun>,
    pub caret: Option<Caret>,
    pub caret_paint: TextPaint,
    pub background: Color,
    pub border: Color,
}

pub trait TextShaper: Send {
    /// Advance width of `content` rendered in `style`.
    fn measure(&mut self, content: &str, style: &TextStyle) -> f32;

    /// Render `layout` into a raster of `layout.width` x `layout.height`.
    /// `None` when the font is unavailable.
    fn rasterize(&mut self, layout: &TextLayout) -> Option<Raster>;
}

/// Deterministic shaper for headless hosts: every character advances by
/// `advance_ratio * size`, and rasterization paints each run's box
/// in its color.
#[derive(Debug, Clone)]
pub struct FixedAdvanceShaper {
    advance_ratio: f32,
    rasterized: Arc<AtomicUsize>,
}

impl FixedAdvanceShaper {
    pub fn new(advance_ratio: f32) -> Self {
        Self {
            advance_ratio,
            rasterized: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of `rasterize` calls so far, across all clones.
    pub fn rasterized(&self) -> usize {
        self.rasterized.load(Ordering::Relaxed)
    }
}

impl Default for FixedAdvanceShaper {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl TextShaper for FixedAdvanceShaper {
    fn measure(&mut self, content: &str, style: &TextStyle) -> f32 {
        content.chars().count() as f32 * style.size * self.advance_ratio
    }

    fn rasterize(&mut self, layout: &TextLayout) -> Option<Raster> {
        self.rasterized.fetch_add(1, Ordering::Relaxed);
        let (w, h) = (layout.width, layout.height);
        let mut pixels = Raster::filled(w, h, layout.background).pixels().to_vec();
        for run in &layout.runs {
            let TextPaint::Rgba(color) = &run.style.paint else {
                continue;
            };
            let advance = run.content.chars().count() as f32 * run.style.size * self.advance_ratio;
            let x0 = run.x.max(0.0) as u32;
            let x1 = ((run.x + advance).max(0.0) as u32).min(w);
            let y1 = (run.y.max(0.0) as u32).min(h);
            let y0 = ((run.y - run.style.size).max(0.0) as u32).min(y1);
            for y in y0..y1 {
                for x in x0..x1 {
                    let i = (y as usize * w as usize + x as usize) * 4;
                    pixels[i..i + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
                }
            }
        }
        Raster::from_rgba(w, h, pixels).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style(size: f32) -> TextStyle {
        TextStyle {
            font: Font::SansSerif,
            size,
            bold: false,
            italic: false,
            paint: TextPaint::Rgba(Color::rgba(255, 0, 0, 255)),
        }
    }

    #[test]
    fn test_fixed_advance_measure() {
        let mut shaper = FixedAdvanceShaper::new(0.5);
        assert_eq!(shaper.measure("abcd", &style(10.0)), 20.0);
        assert_eq!(shaper.measure("", &style(10.0)), 0.0);
    }

    #[test]
    fn test_rasterize_paints_run_box() {
        let mut shaper = FixedAdvanceShaper::new(0.5);
        let layout = TextLayout {
            width: 20,
            height: 12,
            runs: vec![PlacedRun {
                content: "ab".into(),
                style: style(10.0),
                x: 1.0,
                y: 11.0,
            }],
            caret: None,
            caret_paint: TextPaint::Rgba(Color::TRANSPARENT),
            background: Color::TRANSPARENT,
            border: Color::TRANSPARENT,
        };
        let raster = shaper.rasterize(&layout).unwrap();
        assert_eq!((raster.width(), raster.height()), (20, 12));
        assert_eq!(raster.pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(15, 5), Some([0, 0, 0, 0]));
        assert_eq!(shaper.rasterized(), 1);
    }
}
