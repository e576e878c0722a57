//! Content-addressed cache of rasterized text and resized images.
//!
//! Keys are hashes over exactly the inputs that determine the output
//! pixels, so identical requests always hit. Nothing is evicted until the
//! guest clears the cache; clearing empties every map at once.

use std::collections::HashMap;

use canopy_hostapi::{ImageFetch, ImageSource, Raster, TextShaper};
use canopy_primitives::wire::{Font, WireEnum};
use canopy_primitives::{Color, ContentHash, ContentHasher, TextRun};

use crate::text_layout::{layout_text, TextBlock};

/// Hit/miss counters since the last clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub text_hits: u64,
    pub text_misses: u64,
    pub image_hits: u64,
    pub image_misses: u64,
}

/// Everything that influences a rasterized text block.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRequest<'a> {
    pub text: &'a TextRun,
    /// 0 when unconstrained.
    pub max_width: f32,
    pub padding: f32,
    pub background: Color,
    pub border: Color,
}

#[derive(Default)]
pub struct RenderCache {
    string_hashes: HashMap<String, ContentHash>,
    texts: HashMap<ContentHash, Option<Raster>>,
    images: HashMap<ContentHash, Raster>,
    stats: CacheStats,
}

impl RenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn string_hash(&mut self, value: &str) -> ContentHash {
        if let Some(hash) = self.string_hashes.get(value) {
            return *hash;
        }
        let hash = ContentHash::of_str(value);
        self.string_hashes.insert(value.to_string(), hash);
        hash
    }

    fn text_key(&mut self, req: &TextRequest<'_>) -> ContentHash {
        let content = self.string_hash(&req.text.content);
        let font = req.text.font.map_or("", |f| f.name());
        let font = self.string_hash(font);
        ContentHasher::new("text")
            .digest(&content)
            .float(req.max_width)
            .float(req.padding)
            .float(req.text.size)
            .digest(&font)
            .bool(req.text.bold)
            .bool(req.text.italic)
            .color(req.text.color)
            .int(req.text.cursor_index)
            .color(req.background)
            .color(req.border)
            .finish()
    }

    fn image_key(&mut self, source: &str, width: u32, height: u32) -> ContentHash {
        let source = self.string_hash(source);
        ContentHasher::new("image")
            .digest(&source)
            .int(width as i32)
            .int(height as i32)
            .finish()
    }

    /// Rasterized text for `req`, laying it out on a miss. `None` when the
    /// shaper cannot render it (e.g. missing font); that outcome is cached
    /// too.
    pub fn text(&mut self, req: &TextRequest<'_>, shaper: &mut dyn TextShaper) -> Option<Raster> {
        let key = self.text_key(req);
        if let Some(cached) = self.texts.get(&key) {
            self.stats.text_hits += 1;
            return cached.clone();
        }
        self.stats.text_misses += 1;
        let block = TextBlock {
            content: &req.text.content,
            max_width: req.max_width,
            padding: req.padding,
            size: req.text.size,
            font: req.text.font.unwrap_or(Font::SansSerif),
            bold: req.text.bold,
            italic: req.text.italic,
            color: req.text.color,
            cursor_index: req.text.cursor_index,
            background: req.background,
            border: req.border,
        };
        let layout = layout_text(&block, shaper);
        let raster = shaper.rasterize(&layout);
        if raster.is_none() {
            log::debug!("text {:?} could not be rasterized", req.text.content);
        }
        self.texts.insert(key, raster.clone());
        raster
    }

    /// `source` resized to exactly `width` x `height`. Images still loading
    /// are not cached, so they are retried on the next frame.
    pub fn image(
        &mut self,
        source: &str,
        width: u32,
        height: u32,
        images: &mut dyn ImageSource,
    ) -> Option<Raster> {
        let key = self.image_key(source, width, height);
        if let Some(cached) = self.images.get(&key) {
            self.stats.image_hits += 1;
            return Some(cached.clone());
        }
        let original = match images.fetch(source) {
            ImageFetch::Ready(raster) => raster,
            ImageFetch::Pending => return None,
            ImageFetch::Missing => {
                log::debug!("image {source} missing");
                return None;
            }
        };
        self.stats.image_misses += 1;
        let resized = resize_by_halving(&original, width, height, images);
        self.images.insert(key, resized.clone());
        Some(resized)
    }

    /// Empty all maps and reset the counters.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing render cache ({} texts, {} images)",
            self.texts.len(),
            self.images.len()
        );
        self.string_hashes.clear();
        self.texts.clear();
        self.images.clear();
        self.stats = CacheStats::default();
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn text_entries(&self) -> usize {
        self.texts.len()
    }

    pub fn image_entries(&self) -> usize {
        self.images.len()
    }
}

/// Downscale by repeated halving while the image is at least twice the
/// target in either dimension, then resize once to the exact target.
pub fn resize_by_halving(image: &Raster, width: u32, height: u32, images: &mut dyn ImageSource) -> Raster {
    let mut current = image.clone();
    while current.width() != width || current.height() != height {
        let ratio = (current.width() as f32 / width.max(1) as f32)
            .max(current.height() as f32 / height.max(1) as f32);
        let (w, h) = if ratio >= 2.0 {
            ((current.width() / 2).max(1), (current.height() / 2).max(1))
        } else {
            (width, height)
        };
        let next = images.resize(&current, w, h);
        if (next.width(), next.height()) == (current.width(), current.height()) {
            break;
        }
        current = next;
    }
    current
}
