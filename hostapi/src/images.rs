//! Image sources: where rasters referenced by draw primitives come from.
//!
//! Loading may be asynchronous on real hosts, so a fetch can report
//! `Pending`; the renderer simply skips the image for that frame and asks
//! again on the next one.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use crate::error::HostError;
use crate::paths::resolve_under;
use crate::raster::Raster;

/// Outcome of looking up an image by source identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageFetch {
    Ready(Raster),
    /// Still loading; try again later.
    Pending,
    /// Not available and never will be.
    Missing,
}

pub trait ImageSource: Send {
    fn fetch(&mut self, source: &str) -> ImageFetch;

    /// Make a decoded raster available under `source` before first use.
    fn register(&mut self, source: &str, image: Raster);

    /// One resampling step; the renderer composes these into a
    /// multi-step downscale.
    fn resize(&mut self, image: &Raster, width: u32, height: u32) -> Raster {
        image.resized(width, height)
    }
}

/// Images held in memory, keyed by source identifier.
#[derive(Debug, Default)]
pub struct MemImageSource {
    images: HashMap<String, Raster>,
    pending: HashSet<String>,
}

impl MemImageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `source` as still loading until it is registered.
    pub fn mark_pending(&mut self, source: &str) {
        if !self.images.contains_key(source) {
            self.pending.insert(source.to_string());
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSource for MemImageSource {
    fn fetch(&mut self, source: &str) -> ImageFetch {
        if let Some(img) = self.images.get(source) {
            ImageFetch::Ready(img.clone())
        } else if self.pending.contains(source) {
            ImageFetch::Pending
        } else {
            ImageFetch::Missing
        }
    }

    fn register(&mut self, source: &str, image: Raster) {
        self.pending.remove(source);
        self.images.insert(source.to_string(), image);
    }
}

/// Images decoded from files under a root directory with the `image` crate.
///
/// Source identifiers are relative paths. Decoded rasters and failures are
/// both remembered, so each file is read at most once.
#[derive(Debug)]
pub struct FsImageSource {
    root: PathBuf,
    loaded: MemImageSource,
    failed: HashSet<String>,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: MemImageSource::new(),
            failed: HashSet::new(),
        }
    }

    fn decode(&self, source: &str) -> Result<Raster, HostError> {
        let path = resolve_under(&self.root, source)?;
        let img = image::open(&path)?;
        Ok(img.to_rgba8().into())
    }
}

impl ImageSource for FsImageSource {
    fn fetch(&mut self, source: &str) -> ImageFetch {
        if let ImageFetch::Ready(img) = self.loaded.fetch(source) {
            return ImageFetch::Ready(img);
        }
        if self.failed.contains(source) {
            return ImageFetch::Missing;
        }
        match self.decode(source) {
            Ok(img) => {
                log::debug!("decoded image {source} ({}x{})", img.width(), img.height());
                self.loaded.register(source, img.clone());
                ImageFetch::Ready(img)
            }
            Err(e) => {
                log::warn!("image {source} unavailable: {e}");
                self.failed.insert(source.to_string());
                ImageFetch::Missing
            }
        }
    }

    fn register(&mut self, source: &str, image: Raster) {
        self.failed.remove(source);
        self.loaded.register(source, image);
    }
}
