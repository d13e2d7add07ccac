//! Half-space triangle clipping against the near plane and screen edges.
//!
//! Every stage is the same operation: classify the three vertices by signed
//! distance to a plane, then emit 0, 1 or 2 triangles whose new vertices sit
//! exactly on the plane. The near stage runs in view space before
//! projection; the four screen-edge stages run on screen coordinates after
//! perspective division, breadth-first, so every surviving triangle passes
//! all stages before rasterization.

use std::collections::VecDeque;

use crate::colors::Rgba8;
use crate::math::texcoord::TexCoord;
use crate::math::vec4::Vec4;

/// A triangle in flight between pipeline stages: positions (view or screen
/// space, with clip-space w), texture coordinates carrying the reciprocal
/// depth, and the face color. Created per frame, discarded after the fill.
#[derive(Clone, Copy, Debug)]
pub struct ClipTriangle {
    pub pos: [Vec4; 3],
    pub uv: [TexCoord; 3],
    pub color: Rgba8,
}

/// One of the five clip half-spaces. A vertex is inside when its signed
/// distance is non-negative.
#[derive(Clone, Copy, Debug)]
pub enum ClipPlane {
    /// View-space z >= near distance.
    Near(f32),
    /// Screen x >= 0.
    Left,
    /// Screen y >= 0.
    Top,
    /// Screen y <= height - 1.
    Bottom(f32),
    /// Screen x <= width - 1.
    Right(f32),
}

impl ClipPlane {
    #[inline]
    fn distance(&self, p: Vec4) -> f32 {
        match *self {
            ClipPlane::Near(near) => p.z - near,
            ClipPlane::Left => p.x,
            ClipPlane::Top => p.y,
            ClipPlane::Bottom(max_y) => max_y - p.y,
            ClipPlane::Right(max_x) => max_x - p.x,
        }
    }
}

/// Outcome of clipping one triangle against one plane.
#[derive(Clone, Copy, Debug)]
pub enum ClipResult {
    /// All vertices outside; nothing survives.
    Discarded,
    /// Triangle kept, either untouched or trimmed to a single triangle.
    Kept(ClipTriangle),
    /// The inside quad, split along its diagonal.
    Split(ClipTriangle, ClipTriangle),
}

/// Clip a triangle against one half-space.
///
/// New vertices are placed at the exact plane crossing using
/// `t = d_in / (d_in - d_out)`; texture coordinates interpolate with the
/// same parameter so perspective weights stay consistent.
pub fn clip(tri: &ClipTriangle, plane: ClipPlane) -> ClipResult {
    let d = [
        plane.distance(tri.pos[0]),
        plane.distance(tri.pos[1]),
        plane.distance(tri.pos[2]),
    ];

    let mut inside = [0usize; 3];
    let mut outside = [0usize; 3];
    let mut in_count = 0;
    let mut out_count = 0;
    for (i, &dist) in d.iter().enumerate() {
        if dist >= 0.0 {
            inside[in_count] = i;
            in_count += 1;
        } else {
            outside[out_count] = i;
            out_count += 1;
        }
    }

    let crossing = |from: usize, to: usize| {
        let t = d[from] / (d[from] - d[to]);
        (
            tri.pos[from].lerp(tri.pos[to], t),
            tri.uv[from].lerp(tri.uv[to], t),
        )
    };

    match (in_count, out_count) {
        (0, _) => ClipResult::Discarded,
        (3, _) => ClipResult::Kept(*tri),
        (1, 2) => {
            let a = inside[0];
            let (p1, t1) = crossing(a, outside[0]);
            let (p2, t2) = crossing(a, outside[1]);
            ClipResult::Kept(ClipTriangle {
                pos: [tri.pos[a], p1, p2],
                uv: [tri.uv[a], t1, t2],
                color: tri.color,
            })
        }
        (2, 1) => {
            let a = inside[0];
            let b = inside[1];
            let o = outside[0];
            let (p1, t1) = crossing(a, o);
            let (p2, t2) = crossing(b, o);
            // The second triangle reuses the first one's crossing point so
            // the quad's diagonal is shared exactly.
            ClipResult::Split(
                ClipTriangle {
                    pos: [tri.pos[a], tri.pos[b], p1],
                    uv: [tri.uv[a], tri.uv[b], t1],
                    color: tri.color,
                },
                ClipTriangle {
                    pos: [tri.pos[b], p1, p2],
                    uv: [tri.uv[b], t1, t2],
                    color: tri.color,
                },
            )
        }
        // An impossible partition is treated as a discard, never as
        // undefined behavior.
        _ => ClipResult::Discarded,
    }
}

/// Clip a screen-space triangle against the four viewport edges.
///
/// Stages run in sequence (left, top, bottom, right) over a queue so each
/// stage sees every triangle the previous one produced. Survivors are
/// appended to `out`.
pub fn clip_to_screen(tri: ClipTriangle, width: f32, height: f32, out: &mut Vec<ClipTriangle>) {
    let stages = [
        ClipPlane::Left,
        ClipPlane::Top,
        ClipPlane::Bottom(height - 1.0),
        ClipPlane::Right(width - 1.0),
    ];

    let mut queue: VecDeque<ClipTriangle> = VecDeque::with_capacity(4);
    queue.push_back(tri);

    for plane in stages {
        for _ in 0..queue.len() {
            // pop_front cannot fail here; the loop bound is the queue length.
            let Some(test) = queue.pop_front() else { break };
            match clip(&test, plane) {
                ClipResult::Discarded => {}
                ClipResult::Kept(t) => queue.push_back(t),
                ClipResult::Split(t1, t2) => {
                    queue.push_back(t1);
                    queue.push_back(t2);
                }
            }
        }
    }

    out.extend(queue);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tri(a: (f32, f32, f32), b: (f32, f32, f32), c: (f32, f32, f32)) -> ClipTriangle {
        ClipTriangle {
            pos: [
                Vec4::point(a.0, a.1, a.2),
                Vec4::point(b.0, b.1, b.2),
                Vec4::point(c.0, c.1, c.2),
            ],
            uv: [
                TexCoord::new(0.0, 0.0),
                TexCoord::new(1.0, 0.0),
                TexCoord::new(0.0, 1.0),
            ],
            color: Rgba8::WHITE,
        }
    }

    fn xy_area(t: &ClipTriangle) -> f32 {
        let (a, b, c) = (t.pos[0], t.pos[1], t.pos[2]);
        0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs()
    }

    #[test]
    fn fully_inside_triangle_is_copied_through() {
        let input = tri((1.0, 0.0, 5.0), (2.0, 0.0, 5.0), (1.0, 1.0, 5.0));
        match clip(&input, ClipPlane::Left) {
            ClipResult::Kept(out) => {
                assert_eq!(out.pos, input.pos);
                assert_eq!(out.uv, input.uv);
            }
            other => panic!("expected Kept, got {other:?}"),
        }
    }

    #[test]
    fn fully_outside_triangle_is_discarded() {
        let input = tri((-1.0, 0.0, 5.0), (-2.0, 0.0, 5.0), (-1.0, 1.0, 5.0));
        assert!(matches!(clip(&input, ClipPlane::Left), ClipResult::Discarded));
    }

    #[test]
    fn one_inside_vertex_yields_one_triangle_on_the_plane() {
        // Vertex 0 is inside x >= 0, the other two are outside.
        let input = tri((2.0, 0.0, 5.0), (-2.0, 2.0, 5.0), (-2.0, -2.0, 5.0));
        match clip(&input, ClipPlane::Left) {
            ClipResult::Kept(out) => {
                assert_eq!(out.pos[0], input.pos[0]);
                assert_abs_diff_eq!(out.pos[1].x, 0.0, epsilon = 1e-5);
                assert_abs_diff_eq!(out.pos[2].x, 0.0, epsilon = 1e-5);
                // Crossing at t = 0.5 along each edge.
                assert_abs_diff_eq!(out.pos[1].y, 1.0, epsilon = 1e-5);
                assert_abs_diff_eq!(out.uv[1].u, 0.5, epsilon = 1e-5);
            }
            other => panic!("expected Kept, got {other:?}"),
        }
    }

    #[test]
    fn two_inside_vertices_yield_a_split_quad() {
        // Vertices 0 and 1 inside x >= 0, vertex 2 outside at x = -2.
        let input = tri((2.0, 0.0, 5.0), (2.0, 4.0, 5.0), (-2.0, 0.0, 5.0));
        match clip(&input, ClipPlane::Left) {
            ClipResult::Split(t1, t2) => {
                for t in [&t1, &t2] {
                    for p in &t.pos {
                        assert!(p.x >= -1e-5, "vertex left of the plane: {p:?}");
                    }
                }
                // The quad's area equals the original area minus the cut
                // corner beyond the plane.
                let original = xy_area(&input);
                let clipped = xy_area(&t1) + xy_area(&t2);
                assert!(clipped < original);
                // Cut corner: triangle (0,0)-(-2,0)-(crossing at x=0).
                let expected = original - 2.0;
                assert_abs_diff_eq!(clipped, expected, epsilon = 1e-4);
            }
            other => panic!("expected Split, got {other:?}"),
        }
    }

    #[test]
    fn near_plane_uses_configured_distance() {
        let input = tri((0.0, 0.0, 2.0), (1.0, 0.0, 0.1), (0.0, 1.0, 0.1));
        match clip(&input, ClipPlane::Near(0.5)) {
            ClipResult::Kept(out) => {
                assert_abs_diff_eq!(out.pos[1].z, 0.5, epsilon = 1e-5);
                assert_abs_diff_eq!(out.pos[2].z, 0.5, epsilon = 1e-5);
            }
            other => panic!("expected Kept, got {other:?}"),
        }
    }

    #[test]
    fn screen_clip_bounds_every_survivor() {
        // A triangle much larger than the viewport.
        let input = tri((-500.0, -500.0, 0.5), (1500.0, -200.0, 0.5), (400.0, 1500.0, 0.5));
        let mut out = Vec::new();
        clip_to_screen(input, 800.0, 600.0, &mut out);
        assert!(!out.is_empty());
        for t in &out {
            for p in &t.pos {
                assert!(p.x >= -1e-3 && p.x <= 799.0 + 1e-3);
                assert!(p.y >= -1e-3 && p.y <= 599.0 + 1e-3);
            }
        }
    }

    #[test]
    fn offscreen_triangle_survives_no_stage() {
        let input = tri((-50.0, 10.0, 0.5), (-10.0, 10.0, 0.5), (-30.0, 40.0, 0.5));
        let mut out = Vec::new();
        clip_to_screen(input, 800.0, 600.0, &mut out);
        assert!(out.is_empty());
    }
}
