//! Point-light source with inverse-square falloff.

use std::f32::consts::PI;

use crate::colors::Rgba8;
use crate::math::vec3::Vec3;

/// A point light with a position, a direction, a color and a radiant power.
///
/// The direction is renormalized whenever it is set, and power is clamped
/// to be non-negative, so the intensity formula never sees bad inputs.
#[derive(Clone, Copy, Debug)]
pub struct PointLight {
    position: Vec3,
    direction: Vec3,
    color: Rgba8,
    power: f32,
}

impl PointLight {
    pub fn new() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::new(0.0, 0.0, -1.0),
            color: Rgba8::BLACK,
            power: 1.0,
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec3::new(x, y, z);
    }

    /// Set the light direction. Renormalized so intensity math can assume
    /// a unit vector.
    pub fn set_direction(&mut self, x: f32, y: f32, z: f32) {
        self.direction = Vec3::new(x, y, z).normalize();
    }

    pub fn set_color(&mut self, color: Rgba8) {
        self.color = color;
    }

    /// Set the radiant power, clamped to be non-negative.
    pub fn set_power(&mut self, power: f32) {
        self.power = power.max(0.0);
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn color(&self) -> Rgba8 {
        self.color
    }

    pub fn power(&self) -> f32 {
        self.power
    }

    /// Radiometric intensity at a surface point with the given unit normal:
    /// `dot(normal, direction) * power / (4 pi * distance^2)`, clamped to 0
    /// when the surface faces away from the light.
    ///
    /// Used once per face for flat shading and once per vertex for
    /// Gouraud-style shading.
    pub fn intensity(&self, normal: Vec3, point: Vec3) -> f32 {
        let falloff = 4.0 * PI * point.squared_distance(self.position);
        (normal.dot(self.direction) * self.power / falloff).max(0.0)
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self::new()
    }
}
