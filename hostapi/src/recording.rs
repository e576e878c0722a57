//! Headless display that records every surface operation.
//!
//! Used by tests and by embedders that forward draw calls elsewhere. Like
//! the other in-memory capabilities it is a shared handle: keep a clone to
//! inspect what the bridge drew.

use std::sync::{Arc, Mutex, MutexGuard};

use canopy_primitives::geometry::Rect;
use canopy_primitives::wire::CursorStyle;
use canopy_primitives::Color;

use crate::display::{Display, Path, PixelRect, StrokeStyle, Surface};
use crate::raster::Raster;

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Bounds(Rect),
    Clear,
    Cursor(CursorStyle),
    Save,
    Restore,
    Rotate { cx: f32, cy: f32, angle: f32 },
    Clip(Path),
    Fill(Path, Color),
    Stroke(Path, StrokeStyle),
    Image {
        image_width: u32,
        image_height: u32,
        src: PixelRect,
        dst_x: i32,
        dst_y: i32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawRecord {
    pub layer: i32,
    pub op: SurfaceOp,
}

#[derive(Debug, Default)]
struct DisplayLog {
    viewport: (f32, f32),
    title: String,
    created: Vec<i32>,
    stacking: Vec<i32>,
    records: Vec<DrawRecord>,
}

#[derive(Debug, Clone)]
pub struct RecordingDisplay {
    log: Arc<Mutex<DisplayLog>>,
}

impl RecordingDisplay {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            log: Arc::new(Mutex::new(DisplayLog {
                viewport: (width, height),
                ..Default::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisplayLog> {
        lock(&self.log)
    }

    /// Simulate the host window being resized.
    pub fn set_viewport(&self, width: f32, height: f32) {
        self.lock().viewport = (width, height);
    }

    pub fn title(&self) -> String {
        self.lock().title.clone()
    }

    /// Layers in the order their surfaces were allocated.
    pub fn created_layers(&self) -> Vec<i32> {
        self.lock().created.clone()
    }

    /// Current bottom-to-top stacking order.
    pub fn stacking(&self) -> Vec<i32> {
        self.lock().stacking.clone()
    }

    pub fn records(&self) -> Vec<DrawRecord> {
        self.lock().records.clone()
    }

    /// Operations recorded on one layer.
    pub fn ops_on(&self, layer: i32) -> Vec<SurfaceOp> {
        self.lock()
            .records
            .iter()
            .filter(|r| r.layer == layer)
            .map(|r| r.op.clone())
            .collect()
    }

    /// Drain everything recorded so far.
    pub fn take_records(&self) -> Vec<DrawRecord> {
        std::mem::take(&mut self.lock().records)
    }
}

fn lock(log: &Mutex<DisplayLog>) -> MutexGuard<'_, DisplayLog> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Display for RecordingDisplay {
    fn viewport_size(&self) -> (f32, f32) {
        self.lock().viewport
    }

    fn create_surface(&mut self, layer: i32, bounds: Rect) -> Box<dyn Surface> {
        let mut surface = RecordingSurface {
            layer,
            log: Arc::clone(&self.log),
        };
        self.lock().created.push(layer);
        surface.set_bounds(bounds);
        Box::new(surface)
    }

    fn attach_surfaces(&mut self, layers: &[i32]) {
        self.lock().stacking = layers.to_vec();
    }

    fn set_title(&mut self, title: &str) {
        self.lock().title = title.to_string();
    }
}

struct RecordingSurface {
    layer: i32,
    log: Arc<Mutex<DisplayLog>>,
}

impl RecordingSurface {
    fn record(&self, op: SurfaceOp) {
        lock(&self.log).records.push(DrawRecord {
            layer: self.layer,
            op,
        });
    }
}

impl Surface for RecordingSurface {
    fn set_bounds(&mut self, bounds: Rect) {
        self.record(SurfaceOp::Bounds(bounds));
    }

    fn clear(&mut self) {
        self.record(SurfaceOp::Clear);
    }

    fn set_cursor(&mut self, cursor: CursorStyle) {
        self.record(SurfaceOp::Cursor(cursor));
    }

    fn save(&mut self) {
        self.record(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        self.record(SurfaceOp::Restore);
    }

    fn rotate(&mut self, cx: f32, cy: f32, angle: f32) {
        self.record(SurfaceOp::Rotate { cx, cy, angle });
    }

    fn clip(&mut self, path: &Path) {
        self.record(SurfaceOp::Clip(path.clone()));
    }

    fn fill(&mut self, path: &Path, color: Color) {
        self.record(SurfaceOp::Fill(path.clone(), color));
    }

    fn stroke(&mut self, path: &Path, style: &StrokeStyle) {
        self.record(SurfaceOp::Stroke(path.clone(), style.clone()));
    }

    fn draw_image(&mut self, image: &Raster, src: PixelRect, dst_x: i32, dst_y: i32) {
        self.record(SurfaceOp::Image {
            image_width: image.width(),
            image_height: image.height(),
            src,
            dst_x,
            dst_y,
        });
    }
}
