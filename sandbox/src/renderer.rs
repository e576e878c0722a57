//! Render service: turns decoded frames into surface operations.
//!
//! Each primitive is drawn in a fixed order: background, image, text,
//! overlay, border. The shape outline clips everything after it except for
//! lines. Text and resized images come from the [`RenderCache`].

use canopy_hostapi::{ImageSource, Path, PixelRect, Raster, StrokeStyle, Surface, TextShaper};
use canopy_primitives::geometry::{
    curve_points, horizontal_hexagon_points, vertical_hexagon_points, Rect, LINE_POINTS,
    TRIANGLE_POINTS,
};
use canopy_primitives::wire::{HorizontalAlign, Shape, VerticalAlign};
use canopy_primitives::{DrawPrimitive, Frame};

use crate::render_cache::{RenderCache, TextRequest};
use crate::window::WindowService;

pub struct Renderer {
    cache: RenderCache,
    text: Box<dyn TextShaper>,
    images: Box<dyn ImageSource>,
    horizontal_hexagon: Vec<(f32, f32)>,
    vertical_hexagon: Vec<(f32, f32)>,
    curve: Vec<(f32, f32)>,
}

impl Renderer {
    pub fn new(text: Box<dyn TextShaper>, images: Box<dyn ImageSource>) -> Self {
        Self {
            cache: RenderCache::new(),
            text,
            images,
            horizontal_hexagon: horizontal_hexagon_points(),
            vertical_hexagon: vertical_hexagon_points(),
            curve: curve_points(),
        }
    }

    /// Make `image` available under `source` before the guest references it.
    pub fn register_image(&mut self, source: &str, image: Raster) {
        self.images.register(source, image);
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn cache(&self) -> &RenderCache {
        &self.cache
    }

    /// Clear every surface, apply the frame's cursor and draw its primitives
    /// in order.
    pub fn draw_frame(&mut self, frame: &Frame, window: &mut WindowService) {
        window.clear();
        if let Some(cursor) = frame.cursor {
            window.set_cursor(cursor);
        }
        for primitive in &frame.primitives {
            self.draw_primitive(primitive, window);
        }
    }

    fn draw_primitive(&mut self, p: &DrawPrimitive, window: &mut WindowService) {
        let (mut width, mut height) = (p.width, p.height);

        let text_image = if p.text.content.is_empty() {
            None
        } else {
            let request = TextRequest {
                text: &p.text,
                max_width: if p.text.fit || p.text.shrink_to_fit { width } else { 0.0 },
                padding: p.border_radius.max(p.text.padding),
                background: p.background_color,
                border: p.border_color,
            };
            let image = self.cache.text(&request, self.text.as_mut());
            if let (true, Some(image)) = (p.text.shrink_to_fit, &image) {
                width = width.min(image.width() as f32);
                height = height.min(image.height() as f32);
            }
            image
        };

        let (x, y) = p.anchored_center(width, height);
        let visible = Rect::new(0.0, 0.0, window.width(), window.height());
        if !visible.intersects_centered(x, y, width, height) {
            return;
        }

        let shape = p.shape;
        let outlined = p.background_color.is_visible()
            || p.border_color.is_visible()
            || p.overlay_color.is_visible();
        let outline = match shape {
            Some(shape) if outlined => Some(self.outline(shape, x, y, width, height, p.border_radius)),
            _ => None,
        };

        let surface = window.surface(p.layer());
        surface.save();
        if p.angle != 0.0 {
            surface.rotate(x, y, p.angle);
        }
        if let Some(path) = &outline {
            if shape != Some(Shape::Line) {
                surface.clip(path);
            }
            if p.background_color.is_visible() {
                surface.fill(path, p.background_color);
            }
        }

        if !p.image.source.is_empty() {
            self.draw_image(p, x, y, surface);
        }

        if let Some(image) = text_image.filter(|i| !i.is_empty()) {
            let (tw, th) = (image.width() as f32, image.height() as f32);
            let mut text_x = x - tw / 2.0;
            let mut text_y = y - th / 2.0;
            let dx = (width - tw) / 2.0;
            let dy = (height - th) / 2.0;
            match p.text.horizontal_align {
                Some(HorizontalAlign::Left) => text_x -= dx,
                Some(HorizontalAlign::Right) => text_x += dx,
                _ => {}
            }
            match p.text.vertical_align {
                Some(VerticalAlign::Top) => text_y -= dy,
                Some(VerticalAlign::Bottom) => text_y += dy,
                _ => {}
            }
            surface.draw_image(
                &image,
                PixelRect::full(image.width(), image.height()),
                text_x.floor() as i32,
                text_y.floor() as i32,
            );
        }

        if let Some(path) = &outline {
            if p.overlay_color.is_visible() {
                surface.fill(path, p.overlay_color);
            }
            if p.border_color.is_visible() && p.border_width != 0.0 {
                let dash = (p.border_dash_length != 0.0 && p.border_gap_length != 0.0)
                    .then_some((p.border_dash_length, p.border_gap_length));
                let (border_width, factor) = match shape {
                    Some(Shape::Rectangle) => (p.border_width.ceil(), 2.0),
                    Some(Shape::Line) => (p.border_width, 1.0),
                    _ => (p.border_width, 2.0),
                };
                surface.stroke(
                    path,
                    &StrokeStyle {
                        color: p.border_color,
                        line_width: border_width * factor,
                        dash,
                    },
                );
            }
        }

        surface.restore();
    }

    /// Scale the source so that its crop window covers the primitive's
    /// image size, then copy the crop centred on `(x, y)`.
    fn draw_image(&mut self, p: &DrawPrimitive, x: f32, y: f32, surface: &mut dyn Surface) {
        let img = &p.image;
        let target_w = (img.width / img.sw).round();
        let target_h = (img.height / img.sh).round();
        if !(target_w.is_finite() && target_h.is_finite() && target_w >= 1.0 && target_h >= 1.0) {
            return;
        }
        let Some(image) = self
            .cache
            .image(&img.source, target_w as u32, target_h as u32, self.images.as_mut())
        else {
            return;
        };
        let sx = (img.sx * target_w).round();
        let sy = (img.sy * target_h).round();
        let sw = (img.sw * target_w).round();
        let sh = (img.sh * target_h).round();
        surface.draw_image(
            &image,
            PixelRect::new(sx as i32, sy as i32, sw as i32, sh as i32),
            (x - sw / 2.0).floor() as i32,
            (y - sh / 2.0).floor() as i32,
        );
    }

    fn outline(&self, shape: Shape, x: f32, y: f32, width: f32, height: f32, radius: f32) -> Path {
        let mut path = Path::new();
        match shape {
            Shape::Rectangle => {
                let x1 = (x - width / 2.0).round();
                let y1 = (y - height / 2.0).round();
                let x2 = (x + width / 2.0).round();
                let y2 = (y + height / 2.0).round();
                let r = radius.round();
                if r == 0.0 {
                    path.rect(x1, y1, (x2 - x1).max(1.0), (y2 - y1).max(1.0));
                } else {
                    path.rounded_rect(x1, y1, x2, y2, r);
                }
            }
            Shape::Line => {
                path.polygon(&LINE_POINTS, x, y, width, height);
            }
            Shape::Circle => {
                path.ellipse(x, y, width.abs() / 2.0, height.abs() / 2.0);
            }
            Shape::Triangle => {
                path.polygon(&TRIANGLE_POINTS, x, y, width, height);
            }
            Shape::HorizontalHexagon => {
                path.polygon(&self.horizontal_hexagon, x, y, width, height);
            }
            Shape::VerticalHexagon => {
                path.polygon(&self.vertical_hexagon, x, y, width, height);
            }
            Shape::Curve => {
                path.polygon(&self.curve, x, y, width, height);
            }
        }
        path
    }
}
