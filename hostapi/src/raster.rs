//! Decoded RGBA8 pixel buffers.

use image::imageops::{self, FilterType};
use image::RgbaImage;

use canopy_primitives::Color;

use crate::error::HostError;

/// An owned RGBA8 image, row-major, no padding.
#[derive(Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

impl Raster {
    /// Wrap raw RGBA8 pixels. Fails if the buffer length does not match.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, HostError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(HostError::Image(format!(
                "expected {expected} bytes for {width}x{height}, got {}",
                pixels.len()
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// A raster filled with a single color.
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        let pixel = [color.r, color.g, color.b, color.a];
        let pixels = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
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

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// RGBA of the pixel at `(x, y)`, if inside the raster.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let mut px = [0u8; 4];
        px.copy_from_slice(&self.pixels[i..i + 4]);
        Some(px)
    }

    /// Single resampling step to exactly `width` x `height`.
    pub fn resized(&self, width: u32, height: u32) -> Raster {
        if width == 0 || height == 0 {
            return Raster {
                width,
                height,
                pixels: Vec::new(),
            };
        }
        match RgbaImage::from_raw(self.width, self.height, self.pixels.clone()) {
            Some(img) => imageops::resize(&img, width, height, FilterType::Triangle).into(),
            None => Raster::filled(width, height, Color::TRANSPARENT),
        }
    }
}

impl From<RgbaImage> for Raster {
    fn from(img: RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }
}
