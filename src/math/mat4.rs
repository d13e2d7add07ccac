//! 4x4 transformation matrix using the row-vector convention.
//!
//! # Convention
//! - Vectors are **row vectors** on the left: `v * Mat4`
//! - Translation is stored in **row 3**
//! - Transforms chain **left-to-right**: `v * A * B` applies A first, then B
//!
//! The perspective projection built by [`crate::projection::Projection`]
//! places the view-space depth in the w output channel, so `v * proj` leaves
//! the original depth available for perspective division.

use std::ops::Mul;

use super::vec3::Vec3;
use super::vec4::Vec4;

/// 4x4 matrix stored as `m[row][col]` with row-vector convention.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    m: [[f32; 4]; 4],
}

impl Mat4 {
    pub const fn new(m: [[f32; 4]; 4]) -> Self {
        Mat4 { m }
    }

    pub fn identity() -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a translation matrix.
    ///
    /// Translation lives in row 3 so it only affects points (w=1),
    /// never directions (w=0).
    pub fn translation(x: f32, y: f32, z: f32) -> Self {
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [x, y, z, 1.0],
        ])
    }

    /// Creates a rotation matrix around the X axis (angle in radians).
    pub fn rotation_x(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the Y axis (angle in radians).
    pub fn rotation_y(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the Z axis (angle in radians).
    pub fn rotation_z(angle: f32) -> Self {
        let c = angle.cos();
        let s = angle.sin();
        Mat4::new([
            [c, s, 0.0, 0.0],
            [-s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Builds the camera-to-world matrix for a camera at `pos` looking at
    /// `target`, with `up` re-orthogonalized against the forward direction.
    ///
    /// Invert with [`Mat4::rigid_inverse`] to get the view matrix.
    pub fn point_at(pos: Vec3, target: Vec3, up: Vec3) -> Self {
        let forward = (target - pos).normalize();
        let new_up = (up - forward * forward.dot(up)).normalize();
        let right = new_up.cross(forward);

        Mat4::new([
            [right.x, right.y, right.z, 0.0],
            [new_up.x, new_up.y, new_up.z, 0.0],
            [forward.x, forward.y, forward.z, 0.0],
            [pos.x, pos.y, pos.z, 1.0],
        ])
    }

    /// Inverts a rigid transform (orthonormal rotation + translation).
    ///
    /// The 3x3 rotation block is transposed and the translation row is
    /// negated and re-rotated. Not valid for matrices with scale or
    /// perspective terms.
    pub fn rigid_inverse(&self) -> Self {
        let m = &self.m;
        let mut out = [[0.0f32; 4]; 4];
        for r in 0..3 {
            for c in 0..3 {
                out[r][c] = m[c][r];
            }
        }
        for c in 0..3 {
            out[3][c] = -(m[3][0] * out[0][c] + m[3][1] * out[1][c] + m[3][2] * out[2][c]);
        }
        out[3][3] = 1.0;
        Mat4::new(out)
    }

    /// Access element at [row][col].
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.m[row][col]
    }
}

/// Matrix multiplication: Mat4 * Mat4.
///
/// For the row-vector convention, `v * (A * B)` applies A first, then B.
impl Mul<Mat4> for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let mut result = [[0.0f32; 4]; 4];

        for row in 0..4 {
            for col in 0..4 {
                result[row][col] = self.m[row][0] * rhs.m[0][col]
                    + self.m[row][1] * rhs.m[1][col]
                    + self.m[row][2] * rhs.m[2][col]
                    + self.m[row][3] * rhs.m[3][col];
            }
        }

        Mat4::new(result)
    }
}

/// Transform a Vec4 by a matrix: row vector times Mat4.
impl Mul<Mat4> for Vec4 {
    type Output = Vec4;

    fn mul(self, rhs: Mat4) -> Self::Output {
        let m = &rhs.m;
        Vec4::new(
            self.x * m[0][0] + self.y * m[1][0] + self.z * m[2][0] + self.w * m[3][0],
            self.x * m[0][1] + self.y * m[1][1] + self.z * m[2][1] + self.w * m[3][1],
            self.x * m[0][2] + self.y * m[1][2] + self.z * m[2][2] + self.w * m[3][2],
            self.x * m[0][3] + self.y * m[1][3] + self.z * m[2][3] + self.w * m[3][3],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_2, FRAC_PI_3};

    fn assert_vec4_eq(a: Vec4, b: Vec4) {
        assert_relative_eq!(a.x, b.x, epsilon = 1e-5);
        assert_relative_eq!(a.y, b.y, epsilon = 1e-5);
        assert_relative_eq!(a.z, b.z, epsilon = 1e-5);
        assert_relative_eq!(a.w, b.w, epsilon = 1e-5);
    }

    #[test]
    fn identity_leaves_vector_unchanged() {
        let v = Vec4::point(1.0, -2.0, 3.0);
        assert_vec4_eq(v * Mat4::identity(), v);
    }

    #[test]
    fn translation_moves_points_not_directions() {
        let t = Mat4::translation(1.0, 2.0, 3.0);
        let p = Vec4::point(0.0, 0.0, 0.0) * t;
        assert_vec4_eq(p, Vec4::point(1.0, 2.0, 3.0));

        let d = Vec4::direction(0.0, 0.0, 1.0) * t;
        assert_vec4_eq(d, Vec4::direction(0.0, 0.0, 1.0));
    }

    #[test]
    fn rotation_z_quarter_turn() {
        let v = Vec4::point(1.0, 0.0, 0.0) * Mat4::rotation_z(FRAC_PI_2);
        assert_vec4_eq(v, Vec4::point(0.0, 1.0, 0.0));
    }

    #[test]
    fn multiply_chains_left_to_right() {
        let rot_then_move = Mat4::rotation_y(FRAC_PI_2) * Mat4::translation(5.0, 0.0, 0.0);
        let v = Vec4::point(0.0, 0.0, 1.0) * rot_then_move;
        // The quarter turn maps +z to -x, then the translation shifts x by 5.
        assert_vec4_eq(v, Vec4::point(4.0, 0.0, 0.0));
    }

    #[test]
    fn rigid_inverse_round_trips_rotation() {
        let m = Mat4::rotation_x(0.3) * Mat4::rotation_y(1.2) * Mat4::translation(4.0, -1.0, 2.5);
        let v = Vec4::point(0.7, -0.2, 1.9);
        let round_trip = (v * m) * m.rigid_inverse();
        assert_vec4_eq(round_trip, v);
    }

    #[test]
    fn point_at_inverse_is_view_matrix() {
        let pos = Vec3::new(1.0, 2.0, -3.0);
        let cam = Mat4::point_at(pos, pos + Vec3::FORWARD, Vec3::UP);
        let view = cam.rigid_inverse();
        // The camera position maps to the view-space origin.
        let origin = Vec4::from_vec3(pos, 1.0) * view;
        assert_vec4_eq(origin, Vec4::point(0.0, 0.0, 0.0));
    }

    #[test]
    fn rotations_preserve_length() {
        let m = Mat4::rotation_z(FRAC_PI_3) * Mat4::rotation_x(0.8);
        let v = Vec4::direction(1.0, 2.0, 2.0) * m;
        assert_relative_eq!(v.magnitude(), 3.0, epsilon = 1e-5);
    }
}
