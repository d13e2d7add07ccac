//! Texture coordinates with a perspective weight.

/// A (u, v) texture coordinate plus the perspective weight `w`.
///
/// `w` starts out as 1 on a model-space triangle. After projection each
/// coordinate is divided by the vertex's clip-space w, which turns this field
/// into the reciprocal depth the rasterizer interpolates for depth testing
/// and perspective correction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TexCoord {
    pub u: f32,
    pub v: f32,
    pub w: f32,
}

impl TexCoord {
    pub const ZERO: Self = Self {
        u: 0.0,
        v: 0.0,
        w: 1.0,
    };

    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v, w: 1.0 }
    }

    /// Linearly interpolate between two coordinates, weight included.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self {
            u: self.u + (other.u - self.u) * t,
            v: self.v + (other.v - self.v) * t,
            w: self.w + (other.w - self.w) * t,
        }
    }
}

impl std::ops::Div<f32> for TexCoord {
    type Output = TexCoord;

    fn div(self, rhs: f32) -> Self::Output {
        Self {
            u: self.u / rhs,
            v: self.v / rhs,
            w: self.w / rhs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn division_scales_all_components() {
        let c = TexCoord { u: 0.5, v: 1.0, w: 1.0 } / 4.0;
        assert_relative_eq!(c.u, 0.125);
        assert_relative_eq!(c.v, 0.25);
        assert_relative_eq!(c.w, 0.25);
    }
}
