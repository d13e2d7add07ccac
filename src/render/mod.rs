//! Frame buffer and triangle rasterization.

pub mod framebuffer;
pub mod raster;

/// How a triangle is filled once it reaches screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillMode {
    /// Edges only, no depth test.
    Wireframe,
    /// Flat face color scaled by the face light intensity.
    Solid,
    /// Perspective-correct nearest-neighbor texturing.
    Textured,
}
