//! A CPU-based software-rendered 3D graphics pipeline.
//!
//! Meshes go through model, view and perspective transforms, five-plane
//! clipping and scan-line rasterization entirely on the CPU; SDL2 is used
//! only to present the finished frame. Each draw is split between the
//! calling thread and a persistent worker so both halves of a mesh fill
//! the shared frame buffer in parallel.
//!
//! # Quick Start
//!
//! ```ignore
//! use softpipe::prelude::*;
//!
//! let mut surface = Surface::new("My App", 800, 600)?;
//! let mut pipeline = RenderPipeline::new(800, 600)?;
//! let cube = Mesh::cube();
//! pipeline.draw_mesh(&cube, FillMode::Solid, Mat4::translation(0.0, 0.0, 5.0))?;
//! surface.present(pipeline.frame())?;
//! ```

pub mod clip;
pub mod colors;
pub mod light;
pub mod math;
pub mod mesh;
pub mod pipeline;
pub mod projection;
pub mod render;
pub mod surface;
pub mod text;
pub mod texture;

// Re-export commonly needed types at crate root for convenience
pub use mesh::{LoadError, Mesh};
pub use pipeline::{DrawError, PipelineError, RenderPipeline};
pub use projection::Projection;
pub use render::FillMode;
pub use surface::{Surface, SurfaceEvent};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::colors::Rgba8;
    pub use crate::light::PointLight;
    pub use crate::mesh::Mesh;
    pub use crate::pipeline::RenderPipeline;
    pub use crate::projection::Projection;
    pub use crate::render::FillMode;
    pub use crate::surface::{Surface, SurfaceEvent};
    pub use crate::text::GlyphSheet;
    pub use crate::texture::Texture;

    pub use crate::math::mat4::Mat4;
    pub use crate::math::texcoord::TexCoord;
    pub use crate::math::vec3::Vec3;
    pub use crate::math::vec4::Vec4;
}
