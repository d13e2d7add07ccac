//! The frame pipeline: transform, light, clip, project and rasterize
//! meshes into a shared frame buffer, splitting each draw across a
//! persistent worker thread and the calling thread.
//!
//! The two threads talk through a single-slot mailbox guarded by a mutex
//! and condvar. A draw call queues the first half of the mesh's triangle
//! range, rasterizes the second half itself, then waits for the worker to
//! report done. The slot walks Idle -> Queued -> Running -> Done -> Idle
//! once per draw, so there is never more than one job in flight.

use std::fmt;
use std::ops::Range;
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use crate::clip::{self, ClipPlane, ClipResult, ClipTriangle};
use crate::colors::Rgba8;
use crate::light::PointLight;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::math::vec4::Vec4;
use crate::mesh::{Mesh, MeshData};
use crate::projection::Projection;
use crate::render::framebuffer::FrameBuffer;
use crate::render::raster::{self, Shade};
use crate::render::FillMode;
use crate::text::{GlyphSheet, GLYPH_SIZE, LETTER_ADVANCE, WRAP_STRIDE};
use crate::texture::Texture;

const WIRE_COLOR: Rgba8 = Rgba8::new(250, 250, 250);

/// Errors from pipeline construction.
#[derive(Debug)]
pub enum PipelineError {
    /// Width or height is zero.
    ZeroViewport,
    /// The OS refused to spawn the worker thread.
    WorkerSpawn(std::io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::ZeroViewport => write!(f, "viewport dimensions must be non-zero"),
            PipelineError::WorkerSpawn(e) => write!(f, "failed to spawn rasterizer worker: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {}

/// Errors from a draw call.
#[derive(Debug, PartialEq, Eq)]
pub enum DrawError {
    /// Textured fill was requested for a mesh with no bound texture.
    TextureMissing,
    /// The pipeline has been shut down.
    Terminated,
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::TextureMissing => {
                write!(f, "textured fill requested for a mesh with no texture")
            }
            DrawError::Terminated => write!(f, "pipeline has been shut down"),
        }
    }
}

impl std::error::Error for DrawError {}

/// Per-frame scene parameters, copied into each draw job so the worker
/// reads a consistent snapshot even if setters run between draws.
#[derive(Clone, Copy)]
struct FrameState {
    view: Mat4,
    camera_pos: Vec3,
    projection: Mat4,
    near: f32,
    light: PointLight,
    gouraud: bool,
}

/// One half-mesh rasterization job handed to the worker.
struct DrawJob {
    data: Arc<MeshData>,
    range: Range<usize>,
    texture: Option<Arc<Texture>>,
    fill: FillMode,
    model: Mat4,
    state: FrameState,
}

enum Slot {
    Idle,
    Queued(DrawJob),
    Running,
    Done,
}

struct Mailbox {
    slot: Slot,
    shutdown: bool,
}

/// The renderer. Owns the frame buffer, the worker thread, and the scene
/// state shared by every draw in a frame.
pub struct RenderPipeline {
    frame: Arc<FrameBuffer>,
    mailbox: Arc<(Mutex<Mailbox>, Condvar)>,
    worker: Option<JoinHandle<()>>,
    state: FrameState,
    glyphs: Option<GlyphSheet>,
    /// When set, draws run entirely on the calling thread. Used by tests
    /// that need deterministic pixel output.
    serialized: bool,
}

fn lock_mailbox(mutex: &Mutex<Mailbox>) -> MutexGuard<'_, Mailbox> {
    // A worker panic poisons the lock; the mailbox state is still sound,
    // so recover the guard rather than propagating the poison.
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

impl RenderPipeline {
    /// Create a pipeline with a fresh frame buffer and spawn the worker.
    pub fn new(width: u32, height: u32) -> Result<Self, PipelineError> {
        if width == 0 || height == 0 {
            return Err(PipelineError::ZeroViewport);
        }

        let frame = Arc::new(FrameBuffer::new(width, height));
        let mailbox = Arc::new((
            Mutex::new(Mailbox {
                slot: Slot::Idle,
                shutdown: false,
            }),
            Condvar::new(),
        ));

        let worker_frame = Arc::clone(&frame);
        let worker_mailbox = Arc::clone(&mailbox);
        let worker = thread::Builder::new()
            .name("rasterizer".into())
            .spawn(move || worker_loop(worker_frame, worker_mailbox))
            .map_err(PipelineError::WorkerSpawn)?;

        log::info!("render pipeline initialized at {width}x{height}");
        let projection = Projection::from_degrees(70.0, height as f32 / width as f32, 0.5, 100.0);
        Ok(Self {
            frame,
            mailbox,
            worker: Some(worker),
            state: FrameState {
                view: Mat4::identity(),
                camera_pos: Vec3::ZERO,
                projection: projection.matrix(),
                near: projection.z_near(),
                light: PointLight::new(),
                gouraud: false,
            },
            glyphs: None,
            serialized: false,
        })
    }

    pub fn frame(&self) -> &Arc<FrameBuffer> {
        &self.frame
    }

    /// Set the camera: its world position (for backface culling and
    /// lighting) and the world-to-view matrix.
    pub fn set_camera(&mut self, position: Vec3, view: Mat4) {
        self.state.camera_pos = position;
        self.state.view = view;
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.state.projection = projection.matrix();
        self.state.near = projection.z_near();
    }

    pub fn set_light(&mut self, light: PointLight) {
        self.state.light = light;
    }

    /// Toggle per-vertex shading for the textured fill. Off by default;
    /// flat face shading is used otherwise.
    pub fn set_gouraud(&mut self, enabled: bool) {
        self.state.gouraud = enabled;
    }

    /// Force draws onto the calling thread only.
    pub fn set_serialized(&mut self, serialized: bool) {
        self.serialized = serialized;
    }

    pub fn bind_glyphs(&mut self, glyphs: GlyphSheet) {
        self.glyphs = Some(glyphs);
    }

    /// Clear the frame to a background color and reset all depths.
    pub fn clear(&self, color: Rgba8) {
        self.frame.clear(color);
    }

    /// Draw a mesh with the given fill mode and model transform.
    ///
    /// The triangle range is split down the middle: the worker takes the
    /// first half, the calling thread rasterizes the second (larger, for
    /// odd counts) half, and the call returns once both halves are in the
    /// frame buffer.
    pub fn draw_mesh(&mut self, mesh: &Mesh, fill: FillMode, model: Mat4) -> Result<(), DrawError> {
        // The worker handle is taken by shutdown, so its absence marks a
        // terminated pipeline for every dispatch path, including the
        // serialized and single-triangle ones that never touch the mailbox.
        if self.worker.is_none() {
            return Err(DrawError::Terminated);
        }
        if fill == FillMode::Textured && mesh.texture().is_none() {
            log::warn!("textured draw rejected: mesh has no bound texture");
            return Err(DrawError::TextureMissing);
        }
        let n = mesh.num_triangles();
        if n == 0 {
            return Ok(());
        }

        let job = |range: Range<usize>| DrawJob {
            data: Arc::clone(mesh.data()),
            range,
            texture: mesh.texture().cloned(),
            fill,
            model,
            state: self.state,
        };

        let mid = n / 2;
        if self.serialized || mid == 0 {
            render_slice(&self.frame, &job(0..n));
            return Ok(());
        }

        let (lock, cvar) = &*self.mailbox;
        {
            let mut mb = lock_mailbox(lock);
            if mb.shutdown {
                return Err(DrawError::Terminated);
            }
            mb.slot = Slot::Queued(job(0..mid));
            cvar.notify_one();
        }

        render_slice(&self.frame, &job(mid..n));

        let mut mb = lock_mailbox(lock);
        loop {
            match mb.slot {
                Slot::Done => {
                    mb.slot = Slot::Idle;
                    return Ok(());
                }
                _ if mb.shutdown => return Err(DrawError::Terminated),
                _ => mb = cvar.wait(mb).unwrap_or_else(|e| e.into_inner()),
            }
        }
    }

    /// Draw a text overlay starting at (x, y), wrapping near the right
    /// edge. Characters without a glyph advance the pen but paint nothing.
    pub fn draw_text(&self, text: &str, x: i32, y: i32, color: Rgba8) {
        let Some(glyphs) = &self.glyphs else {
            log::warn!("text draw rejected: no glyph sheet bound");
            return;
        };
        let argb = color.to_argb();
        let width = self.frame.width() as i32;
        let mut line_start = x;
        let mut cx = x;
        let mut cy = y;
        let mut n: i32 = 0;

        for c in text.chars() {
            if line_start + n * WRAP_STRIDE >= width - GLYPH_SIZE as i32 {
                cy += GLYPH_SIZE as i32;
                line_start = 10;
                cx = 10;
                n = 0;
            }
            n += 1;

            match glyphs.glyph(c) {
                Some((mask, advance)) => {
                    for row in 0..GLYPH_SIZE {
                        for col in 0..GLYPH_SIZE {
                            if mask[row * GLYPH_SIZE + col] {
                                let px = cx + col as i32;
                                let py = cy + row as i32;
                                if px >= 0 && py >= 0 {
                                    self.frame.set_pixel(px as u32, py as u32, argb);
                                }
                            }
                        }
                    }
                    cx += advance;
                }
                None => cx += LETTER_ADVANCE,
            }
        }
    }

    /// Blit a texture as a 2D overlay with its top-left corner at (x, y).
    /// Rejected with a warning if it does not fit entirely on screen.
    pub fn draw_image(&self, texture: &Texture, x: u32, y: u32) {
        if x + texture.width() > self.frame.width() || y + texture.height() > self.frame.height() {
            log::warn!(
                "image draw rejected: {}x{} at ({x}, {y}) exceeds the {}x{} frame",
                texture.width(),
                texture.height(),
                self.frame.width(),
                self.frame.height(),
            );
            return;
        }
        for ty in 0..texture.height() {
            for tx in 0..texture.width() {
                self.frame.set_pixel(x + tx, y + ty, texture.pixel(tx, ty));
            }
        }
    }

    /// Stop the worker and join it. Returns false if the worker had
    /// panicked. Idempotent; draws after shutdown fail with
    /// [`DrawError::Terminated`].
    pub fn shutdown(&mut self) -> bool {
        let Some(handle) = self.worker.take() else {
            return true;
        };
        {
            let (lock, cvar) = &*self.mailbox;
            let mut mb = lock_mailbox(lock);
            mb.shutdown = true;
            cvar.notify_all();
        }
        match handle.join() {
            Ok(()) => true,
            Err(_) => {
                log::warn!("rasterizer worker panicked before shutdown");
                false
            }
        }
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn worker_loop(frame: Arc<FrameBuffer>, mailbox: Arc<(Mutex<Mailbox>, Condvar)>) {
    let (lock, cvar) = &*mailbox;
    loop {
        let job = {
            let mut mb = lock_mailbox(lock);
            loop {
                if mb.shutdown {
                    log::debug!("rasterizer worker exiting");
                    return;
                }
                match std::mem::replace(&mut mb.slot, Slot::Running) {
                    Slot::Queued(job) => break job,
                    other => mb.slot = other,
                }
                mb = cvar.wait(mb).unwrap_or_else(|e| e.into_inner());
            }
        };

        render_slice(&frame, &job);

        let mut mb = lock_mailbox(lock);
        mb.slot = Slot::Done;
        cvar.notify_all();
    }
}

/// Run one triangle range through the full per-triangle pipeline:
/// model transform, backface cull, lighting, view transform, near clip,
/// projection to screen space, screen-edge clipping, and the fill.
fn render_slice(fb: &FrameBuffer, job: &DrawJob) {
    let state = &job.state;
    let width = fb.width() as f32;
    let height = fb.height() as f32;
    let mut survivors: Vec<ClipTriangle> = Vec::with_capacity(4);

    for i in job.range.clone() {
        let tri = &job.data.triangles[i];

        // Model transform. Normals transform as directions (w = 0), which
        // drops the translation row; model transforms are rigid, so no
        // renormalization beyond the final normalize is needed.
        let world = tri.positions.map(|p| p * job.model);
        let normal = (Vec4::from_vec3(job.data.face_normals[i], 0.0) * job.model)
            .to_vec3()
            .normalize();

        // Cull faces pointing away from the camera.
        let to_face = world[0].to_vec3() - state.camera_pos;
        if normal.dot(to_face) >= 0.0 {
            continue;
        }

        let centroid = (world[0].to_vec3() + world[1].to_vec3() + world[2].to_vec3()) / 3.0;
        let face_intensity = state.light.intensity(normal, centroid);
        let shade = if state.gouraud {
            let mut per_vertex = [0.0f32; 3];
            for (k, vn) in job.data.vertex_normals[i].iter().enumerate() {
                let n = (Vec4::from_vec3(*vn, 0.0) * job.model).to_vec3().normalize();
                per_vertex[k] = state.light.intensity(n, world[k].to_vec3());
            }
            Shade::Gouraud(per_vertex)
        } else {
            Shade::Flat(face_intensity)
        };

        let viewed = ClipTriangle {
            pos: world.map(|p| p * state.view),
            uv: tri.uvs,
            color: tri.color,
        };

        // Near clip runs in view space, before the projection can divide
        // by a depth at or behind the camera.
        let (first, second) = match clip::clip(&viewed, ClipPlane::Near(state.near)) {
            ClipResult::Discarded => continue,
            ClipResult::Kept(t) => (t, None),
            ClipResult::Split(t1, t2) => (t1, Some(t2)),
        };

        survivors.clear();
        for t in std::iter::once(first).chain(second) {
            clip_to_screen_projected(t, state.projection, width, height, &mut survivors);
        }

        for t in &survivors {
            match job.fill {
                FillMode::Wireframe => raster::draw_wire_triangle(fb, t, WIRE_COLOR.to_argb()),
                FillMode::Solid => raster::fill_solid(fb, t, face_intensity),
                FillMode::Textured => {
                    // Validated at the draw call.
                    if let Some(texture) = &job.texture {
                        raster::fill_textured(fb, t, texture, state.light.color(), shade);
                    }
                }
            }
        }
    }
}

/// Project one near-clipped view-space triangle to screen space, then clip
/// it against the viewport edges.
fn clip_to_screen_projected(
    mut t: ClipTriangle,
    projection: Mat4,
    width: f32,
    height: f32,
    out: &mut Vec<ClipTriangle>,
) {
    for k in 0..3 {
        let p = t.pos[k] * projection;
        let w = p.w;
        // Dividing u and v by the clip-space w makes them linear in screen
        // space; the weight becomes the reciprocal depth the rasterizer
        // interpolates.
        t.uv[k] = t.uv[k] / w;
        t.pos[k] = Vec4::new(
            (p.x / w + 1.0) * 0.5 * width,
            (p.y / w + 1.0) * 0.5 * height,
            p.z / w,
            w,
        );
    }
    clip::clip_to_screen(t, width, height, out);
}
