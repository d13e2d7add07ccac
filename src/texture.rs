//! Texture container and image-decoder adapter.

use std::fmt;
use std::path::Path;

/// A 2D texture owning its packed pixel array.
///
/// Pixels are stored row-major in the 0xAARRGGBB format. Textures are
/// immutable after construction; meshes hold them through `Arc` so one
/// texture can back several meshes and outlives every binding.
pub struct Texture {
    data: Vec<u32>,
    width: u32,
    height: u32,
}

/// Errors from texture construction.
#[derive(Debug)]
pub enum TextureError {
    /// Width or height is zero.
    EmptyDimensions,
    /// Pixel count does not match width * height.
    PixelCountMismatch { expected: usize, actual: usize },
    /// The image decoder rejected the file.
    Decode(image::ImageError),
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::EmptyDimensions => write!(f, "texture dimensions must be non-zero"),
            TextureError::PixelCountMismatch { expected, actual } => {
                write!(f, "expected {expected} pixels, got {actual}")
            }
            TextureError::Decode(e) => write!(f, "image decode failed: {e}"),
        }
    }
}

impl std::error::Error for TextureError {}

impl From<image::ImageError> for TextureError {
    fn from(e: image::ImageError) -> Self {
        TextureError::Decode(e)
    }
}

impl Texture {
    /// Build a texture from an already-decoded pixel array, as delivered by
    /// an external image decoder.
    pub fn from_pixels(width: u32, height: u32, data: Vec<u32>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyDimensions);
        }
        let expected = (width * height) as usize;
        if data.len() != expected {
            return Err(TextureError::PixelCountMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Load a texture from an image file (PNG, JPG, etc.)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TextureError> {
        let img = image::open(path)?.to_rgba8();
        let (width, height) = img.dimensions();

        // Convert RGBA bytes to packed u32, forcing an opaque alpha.
        let data: Vec<u32> = img
            .pixels()
            .map(|p| {
                let [r, g, b, _] = p.0;
                0xFA00_0000 | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
            })
            .collect();

        log::info!("loaded texture {width}x{height}");
        Self::from_pixels(width, height, data)
    }

    /// Sample with nearest-neighbor filtering.
    ///
    /// `u` and `v` are expected in [0, 1] after perspective correction;
    /// the texel indices are clamped so slight overshoot from screen-space
    /// interpolation cannot read out of bounds.
    #[inline]
    pub fn sample(&self, u: f32, v: f32) -> u32 {
        let x = (self.width as f32 * u) as i64;
        let y = ((self.height - 1) as f32 * v) as i64;
        let x = x.clamp(0, self.width as i64 - 1) as u32;
        let y = y.clamp(0, self.height as i64 - 1) as u32;
        self.data[(y * self.width + x) as usize]
    }

    /// Direct texel access by pixel coordinates.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        self.data[(y * self.width + x) as usize]
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
