//! Scan-line triangle filling and line drawing.
//!
//! Triangles arrive in screen space with integer-truncated vertex
//! coordinates. The filler sorts the vertices by y, then walks two halves:
//! the span rows from the top vertex down to the middle one, then from the
//! middle one down to the bottom, stepping the left and right edge x and
//! the texture coordinates per row. Spans are half-open on the right so
//! adjacent triangles sharing an edge never double-paint it.

use crate::clip::ClipTriangle;
use crate::colors::{self, Rgba8};
use crate::math::texcoord::TexCoord;
use crate::render::framebuffer::FrameBuffer;
use crate::texture::Texture;

/// Per-triangle shading input for the textured fill.
#[derive(Clone, Copy, Debug)]
pub enum Shade {
    /// One face intensity for every pixel.
    Flat(f32),
    /// Per-vertex intensities, interpolated across the face.
    Gouraud([f32; 3]),
}

impl Shade {
    fn per_vertex(self) -> [f32; 3] {
        match self {
            Shade::Flat(i) => [i; 3],
            Shade::Gouraud(v) => v,
        }
    }
}

#[derive(Clone, Copy)]
struct ScanVertex {
    x: i32,
    y: i32,
    uv: TexCoord,
    shade: f32,
}

/// Draw a line with Bresenham's algorithm, both endpoints included.
/// No depth test; used for wireframe and overlays.
pub fn draw_line(fb: &FrameBuffer, mut x0: i32, mut y0: i32, x1: i32, y1: i32, argb: u32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 {
            fb.set_pixel(x0 as u32, y0 as u32, argb);
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Outline a screen-space triangle.
pub fn draw_wire_triangle(fb: &FrameBuffer, tri: &ClipTriangle, argb: u32) {
    let p: Vec<(i32, i32)> = tri
        .pos
        .iter()
        .map(|v| (v.x as i32, v.y as i32))
        .collect();
    draw_line(fb, p[0].0, p[0].1, p[1].0, p[1].1, argb);
    draw_line(fb, p[1].0, p[1].1, p[2].0, p[2].1, argb);
    draw_line(fb, p[2].0, p[2].1, p[0].0, p[0].1, argb);
}

/// Fill a triangle with its face color scaled by one light intensity.
/// Depth-tested against the interpolated reciprocal depth.
pub fn fill_solid(fb: &FrameBuffer, tri: &ClipTriangle, intensity: f32) {
    let argb = tri.color.scaled(intensity);
    scan_triangle(tri, [0.0; 3], |x, y, uv, _| {
        fb.set_pixel_with_depth(x as u32, y as u32, uv.w, argb);
    });
}

/// Fill a triangle with perspective-correct nearest-neighbor texturing.
///
/// The interpolated u and v were divided by the clip-space w at projection
/// time, so dividing by the interpolated reciprocal depth here recovers the
/// perspective-correct texture coordinate per pixel.
pub fn fill_textured(
    fb: &FrameBuffer,
    tri: &ClipTriangle,
    texture: &Texture,
    light: Rgba8,
    shade: Shade,
) {
    scan_triangle(tri, shade.per_vertex(), |x, y, uv, shade| {
        let texel = texture.sample(uv.u / uv.w, uv.v / uv.w);
        let argb = colors::lit_texel(texel, light, shade);
        fb.set_pixel_with_depth(x as u32, y as u32, uv.w, argb);
    });
}

fn scan_triangle<F: FnMut(i32, i32, TexCoord, f32)>(
    tri: &ClipTriangle,
    shades: [f32; 3],
    mut plot: F,
) {
    let mut v: [ScanVertex; 3] = std::array::from_fn(|i| ScanVertex {
        x: tri.pos[i].x as i32,
        y: tri.pos[i].y as i32,
        uv: tri.uv[i],
        shade: shades[i],
    });
    v.sort_by_key(|s| s.y);

    // The long edge from the top vertex to the bottom one bounds both
    // halves; the short edges bound one half each.
    scan_half(v[0], v[1], v[0], v[2], &mut plot);
    scan_half(v[1], v[2], v[0], v[2], &mut plot);
}

/// Walk the rows spanned by edge A, pairing it with edge B, and plot the
/// half-open span between them.
fn scan_half<F: FnMut(i32, i32, TexCoord, f32)>(
    a0: ScanVertex,
    a1: ScanVertex,
    b0: ScanVertex,
    b1: ScanVertex,
    plot: &mut F,
) {
    let dy_a = a1.y - a0.y;
    if dy_a == 0 {
        return;
    }
    // Edge B covers edge A's rows, so its dy is non-zero here.
    let dy_b = b1.y - b0.y;

    for i in a0.y..=a1.y {
        if i < 0 {
            continue;
        }
        let ta = (i - a0.y) as f32 / dy_a as f32;
        let tb = (i - b0.y) as f32 / dy_b as f32;

        let mut ax = a0.x + (ta * (a1.x - a0.x) as f32) as i32;
        let mut bx = b0.x + (tb * (b1.x - b0.x) as f32) as i32;
        let mut a_uv = a0.uv.lerp(a1.uv, ta);
        let mut b_uv = b0.uv.lerp(b1.uv, tb);
        let mut a_shade = a0.shade + (a1.shade - a0.shade) * ta;
        let mut b_shade = b0.shade + (b1.shade - b0.shade) * tb;

        if ax > bx {
            std::mem::swap(&mut ax, &mut bx);
            std::mem::swap(&mut a_uv, &mut b_uv);
            std::mem::swap(&mut a_shade, &mut b_shade);
        }
        if bx <= ax {
            continue;
        }

        let t_step = 1.0 / (bx - ax) as f32;
        let mut t = 0.0;
        for j in ax..bx {
            if j >= 0 {
                let uv = a_uv.lerp(b_uv, t);
                let shade = a_shade + (b_shade - a_shade) * t;
                plot(j, i, uv, shade);
            }
            t += t_step;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::vec4::Vec4;

    fn screen_tri(a: (f32, f32), b: (f32, f32), c: (f32, f32), w: f32) -> ClipTriangle {
        let uv = |u: f32, v: f32| TexCoord {
            u: u * w,
            v: v * w,
            w,
        };
        ClipTriangle {
            pos: [
                Vec4::point(a.0, a.1, 0.5),
                Vec4::point(b.0, b.1, 0.5),
                Vec4::point(c.0, c.1, 0.5),
            ],
            uv: [uv(0.0, 0.0), uv(1.0, 0.0), uv(0.0, 1.0)],
            color: Rgba8::new(200, 200, 200),
        }
    }

    #[test]
    fn line_includes_both_endpoints() {
        let fb = FrameBuffer::new(16, 16);
        draw_line(&fb, 2, 3, 9, 7, 0xFFFF_FFFF);
        assert_eq!(fb.pixel(2, 3), 0xFFFF_FFFF);
        assert_eq!(fb.pixel(9, 7), 0xFFFF_FFFF);
    }

    #[test]
    fn solid_fill_covers_the_interior() {
        let fb = FrameBuffer::new(32, 32);
        fill_solid(&fb, &screen_tri((0.0, 0.0), (20.0, 0.0), (0.0, 20.0), 0.5), 1.0);
        assert_ne!(fb.pixel(4, 4), 0);
        assert!(fb.depth_at(4, 4) > 0.0);
        // Far outside the hypotenuse stays untouched.
        assert_eq!(fb.pixel(30, 30), 0);
    }

    #[test]
    fn spans_are_half_open_on_the_right() {
        let fb = FrameBuffer::new(32, 32);
        // An axis-aligned rectangle's left triangle; its right edge runs at
        // x = 10 from the shared diagonal's perspective.
        fill_solid(&fb, &screen_tri((0.0, 0.0), (10.0, 0.0), (10.0, 10.0), 0.5), 1.0);
        assert_eq!(fb.pixel(10, 5), 0);
        assert_ne!(fb.pixel(9, 5), 0);
    }

    #[test]
    fn degenerate_triangles_paint_nothing() {
        let fb = FrameBuffer::new(16, 16);
        // Zero height.
        fill_solid(&fb, &screen_tri((1.0, 5.0), (8.0, 5.0), (12.0, 5.0), 0.5), 1.0);
        // Zero width.
        fill_solid(&fb, &screen_tri((3.0, 1.0), (3.0, 8.0), (3.0, 12.0), 0.5), 1.0);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(fb.pixel(x, y), 0);
            }
        }
    }

    #[test]
    fn textured_fill_recovers_perspective_correct_uv() {
        // A 4x1 strip with distinct texel values; constant depth makes the
        // interpolated u map linearly across the span, so the sampled texel
        // must follow screen x.
        let tex = Texture::from_pixels(
            4,
            1,
            vec![0xFF00_0001, 0xFF00_0002, 0xFF00_0003, 0xFF00_0004],
        )
        .unwrap();
        let fb = FrameBuffer::new(32, 32);
        let tri = screen_tri((0.0, 0.0), (20.0, 0.0), (0.0, 20.0), 0.5);
        // lit_texel with a black light at intensity 2 leaves each channel
        // value untouched: (c + 0) / 2 * 2 = c.
        fill_textured(&fb, &tri, &tex, Rgba8::BLACK, Shade::Flat(2.0));
        // Near the left edge u is small: first texel.
        assert_eq!(fb.pixel(1, 1) & 0xFF, 1);
        // Halfway along the row u reaches 0.5: third texel.
        assert_eq!(fb.pixel(10, 1) & 0xFF, 3);
    }

    #[test]
    fn gouraud_shade_brightens_toward_the_lit_vertex() {
        let tex = Texture::from_pixels(1, 1, vec![0xFFFF_FFFF]).unwrap();
        let fb = FrameBuffer::new(64, 64);
        let tri = screen_tri((0.0, 0.0), (60.0, 0.0), (0.0, 60.0), 0.5);
        // Vertex 1 (screen right) fully lit, the others dark.
        fill_textured(
            &fb,
            &tri,
            &tex,
            Rgba8::WHITE,
            Shade::Gouraud([0.1, 1.0, 0.1]),
        );
        let dark = fb.pixel(2, 1) & 0xFF;
        let bright = fb.pixel(55, 1) & 0xFF;
        assert!(bright > dark, "expected {bright} > {dark}");
    }

    #[test]
    fn nearer_triangle_occludes_farther_one() {
        let fb = FrameBuffer::new(32, 32);
        let far = screen_tri((0.0, 0.0), (20.0, 0.0), (0.0, 20.0), 0.1);
        let near = screen_tri((0.0, 0.0), (20.0, 0.0), (0.0, 20.0), 0.5);
        fill_solid(&fb, &near, 1.0);
        let lit = fb.pixel(4, 4);
        // A farther triangle drawn afterwards must not overwrite.
        let mut darker = far;
        darker.color = Rgba8::new(10, 10, 10);
        fill_solid(&fb, &darker, 1.0);
        assert_eq!(fb.pixel(4, 4), lit);
    }
}
