//! 8-bit RGBA color and the packed-u32 pixel format shared by the frame
//! buffer and textures.
//!
//! Pixels are packed as `0xAARRGGBB`. On a little-endian machine the in-memory
//! byte order is B, G, R, A, which is what an ARGB8888 streaming texture
//! expects when handed the raw buffer.

/// An 8-bit-per-channel RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Self = Self::new(0, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Pack into the 0xAARRGGBB format used by the frame and texture buffers.
    #[inline]
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Scale each channel by a light intensity, saturating at 255.
    #[inline]
    pub fn scaled(self, intensity: f32) -> u32 {
        let scale = |c: u8| (c as f32 * intensity).min(255.0) as u32;
        0xFF00_0000 | (scale(self.r) << 16) | (scale(self.g) << 8) | scale(self.b)
    }
}

/// Blend a sampled texel with the light color and scale by intensity.
///
/// Each channel is averaged with the light's channel before scaling, so a
/// colored light tints the texture rather than replacing it.
#[inline]
pub fn lit_texel(texel: u32, light: Rgba8, intensity: f32) -> u32 {
    let mix = |t: u32, l: u8| ((((t & 0xFF) + l as u32) as f32 / 2.0 * intensity).min(255.0)) as u32;
    let r = mix(texel >> 16, light.r);
    let g = mix(texel >> 8, light.g);
    let b = mix(texel, light.b);
    0xFF00_0000 | (r << 16) | (g << 8) | b
}
