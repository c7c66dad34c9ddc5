use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Attenuated omnidirectional light.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            ambient: Vec3::splat(0.1),
            diffuse: Vec3::new(0.75, 0.2, 0.2),
            specular: Vec3::new(1.0, 0.3, 0.3),
            constant: 1.0,
            linear: 0.001,
            quadratic: 0.005,
        }
    }
}

impl PointLight {
    /// Distance attenuation factor used by the Phong shader.
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Sun-style light with a fixed direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl Default for DirLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.15, -1.0, 0.2).normalize(),
            ambient: Vec3::splat(0.25),
            diffuse: Vec3::splat(0.4),
            specular: Vec3::splat(0.4),
        }
    }
}

impl DirLight {
    /// Same direction, every channel multiplied by `factor`.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            direction: self.direction,
            ambient: self.ambient * factor,
            diffuse: self.diffuse * factor,
            specular: self.specular * factor,
        }
    }
}

/// Cone light. `cut_off` and `outer_cut_off` are cosines of the half-angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub cut_off: f32,
    pub outer_cut_off: f32,
}

impl Default for SpotLight {
    /// Dormant: zero intensity, pointing straight down.
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Vec3::NEG_Y,
            ambient: Vec3::ZERO,
            diffuse: Vec3::ZERO,
            specular: Vec3::ZERO,
            cut_off: 15.0_f32.to_radians().cos(),
            outer_cut_off: 17.2_f32.to_radians().cos(),
        }
    }
}

impl SpotLight {
    pub fn is_dark(&self) -> bool {
        self.ambient == Vec3::ZERO && self.diffuse == Vec3::ZERO && self.specular == Vec3::ZERO
    }
}
