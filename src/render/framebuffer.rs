//! Shared color and depth buffers.
//!
//! Both buffers are arrays of atomics so the two rasterizing threads can
//! write the same frame without locks. All accesses are `Relaxed`: the
//! pipeline joins the worker before the frame is read, which orders the
//! writes, and within a frame the only race is two threads fighting over a
//! pixel on the seam between their triangle ranges. The depth test below is
//! a non-atomic read-modify-write, so that race can lose an update and
//! paint a seam pixel from the farther triangle. That is a bounded visual
//! artifact, accepted in exchange for lock-free spans.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::colors::Rgba8;

/// A width x height frame: packed 0xAARRGGBB colors and reciprocal depths.
///
/// Depth stores `1/w` as f32 bits, larger is closer, cleared to 0 so any
/// visible surface beats the background.
pub struct FrameBuffer {
    color: Vec<AtomicU32>,
    depth: Vec<AtomicU32>,
    width: u32,
    height: u32,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        let len = (width * height) as usize;
        Self {
            color: (0..len).map(|_| AtomicU32::new(0)).collect(),
            depth: (0..len).map(|_| AtomicU32::new(0)).collect(),
            width,
            height,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Write a pixel unconditionally, skipping the depth test. Used by the
    /// wireframe fill and the 2D overlays.
    #[inline]
    pub fn set_pixel(&self, x: u32, y: u32, argb: u32) {
        if x < self.width && y < self.height {
            self.color[self.index(x, y)].store(argb, Ordering::Relaxed);
        }
    }

    /// Write a pixel if its reciprocal depth beats the stored one.
    ///
    /// The compare and the two stores are not one atomic step; see the
    /// module docs for the race this admits.
    #[inline]
    pub fn set_pixel_with_depth(&self, x: u32, y: u32, recip_depth: f32, argb: u32) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.index(x, y);
        let stored = f32::from_bits(self.depth[i].load(Ordering::Relaxed));
        if recip_depth > stored {
            self.depth[i].store(recip_depth.to_bits(), Ordering::Relaxed);
            self.color[i].store(argb, Ordering::Relaxed);
        }
    }

    // The row-major index would silently alias x >= width onto the next
    // row, so reads assert instead of wrapping.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        self.color[self.index(x, y)].load(Ordering::Relaxed)
    }

    #[inline]
    pub fn depth_at(&self, x: u32, y: u32) -> f32 {
        assert!(x < self.width && y < self.height, "depth ({x}, {y}) out of bounds");
        f32::from_bits(self.depth[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Fill the color buffer with one color and reset every depth to 0.
    pub fn clear(&self, color: Rgba8) {
        let argb = color.to_argb();
        for c in &self.color {
            c.store(argb, Ordering::Relaxed);
        }
        for d in &self.depth {
            d.store(0, Ordering::Relaxed);
        }
    }

    /// Copy the color buffer out as bytes for a streaming texture upload.
    ///
    /// Little-endian u32 packing makes the byte order B, G, R, A per pixel,
    /// matching an ARGB8888 texture.
    pub fn color_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.color.len() * 4);
        for c in &self.color {
            bytes.extend_from_slice(&c.load(Ordering::Relaxed).to_le_bytes());
        }
        bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_fills_color_and_resets_depth() {
        let fb = FrameBuffer::new(4, 4);
        fb.set_pixel_with_depth(1, 1, 0.5, 0xFFAA_BBCC);
        fb.clear(Rgba8::new(50, 50, 50));
        assert_eq!(fb.pixel(1, 1), 0xFF32_3232);
        assert_eq!(fb.depth_at(1, 1), 0.0);
    }

    #[test]
    fn nearer_fragment_wins_regardless_of_order() {
        let near = 0.5; // 1/w for w = 2
        let far = 0.1; // 1/w for w = 10

        let fb = FrameBuffer::new(2, 2);
        fb.set_pixel_with_depth(0, 0, far, 0xFF00_00FF);
        fb.set_pixel_with_depth(0, 0, near, 0xFFFF_0000);
        assert_eq!(fb.pixel(0, 0), 0xFFFF_0000);

        let fb = FrameBuffer::new(2, 2);
        fb.set_pixel_with_depth(0, 0, near, 0xFFFF_0000);
        fb.set_pixel_with_depth(0, 0, far, 0xFF00_00FF);
        assert_eq!(fb.pixel(0, 0), 0xFFFF_0000);
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let fb = FrameBuffer::new(2, 2);
        fb.set_pixel(5, 0, 0xFFFF_FFFF);
        fb.set_pixel_with_depth(0, 9, 1.0, 0xFFFF_FFFF);
        for y in 0..2 {
            for x in 0..2 {
                assert_eq!(fb.pixel(x, y), 0);
            }
        }
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn reading_past_the_row_end_panics_instead_of_aliasing() {
        let fb = FrameBuffer::new(4, 4);
        // Would otherwise alias pixel (0, 1).
        fb.pixel(4, 0);
    }

    #[test]
    fn color_bytes_are_little_endian_argb() {
        let fb = FrameBuffer::new(1, 1);
        fb.set_pixel(0, 0, 0xFA12_3456);
        assert_eq!(fb.color_bytes(), vec![0x56, 0x34, 0x12, 0xFA]);
    }
}
