use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::Camera;

/// Number of point light slots in the lighting uniform.
pub const MAX_POINT_LIGHTS: usize = 4;

/// Light with parallel rays, such as the sun.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub enabled: bool,
    pub visible: bool,
}

impl DirectionalLight {
    pub const DEFAULT_DIRECTION: Vec3 = Vec3::new(-0.2, -1.0, -0.3);
    pub const DEFAULT_AMBIENT: Vec3 = Vec3::splat(0.05);
    pub const DEFAULT_DIFFUSE: Vec3 = Vec3::splat(0.4);
    pub const DEFAULT_SPECULAR: Vec3 = Vec3::splat(0.5);

    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: normalize_direction(direction, Self::DEFAULT_DIRECTION),
            ..Self::default()
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: Self::DEFAULT_DIRECTION.normalize(),
            ambient: Self::DEFAULT_AMBIENT,
            diffuse: Self::DEFAULT_DIFFUSE,
            specular: Self::DEFAULT_SPECULAR,
            enabled: true,
            visible: true,
        }
    }
}

/// Omnidirectional light with distance attenuation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    pub position: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub enabled: bool,
    pub visible: bool,
}

impl PointLight {
    pub const DEFAULT_CONSTANT: f32 = 1.0;
    pub const DEFAULT_LINEAR: f32 = 0.09;
    pub const DEFAULT_QUADRATIC: f32 = 0.032;
    pub const DEFAULT_AMBIENT: Vec3 = Vec3::splat(0.05);
    pub const DEFAULT_DIFFUSE: Vec3 = Vec3::splat(0.8);
    pub const DEFAULT_SPECULAR: Vec3 = Vec3::ONE;

    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn attenuation(&self, distance: f32) -> f32 {
        attenuation(self.constant, self.linear, self.quadratic, distance)
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            constant: Self::DEFAULT_CONSTANT,
            linear: Self::DEFAULT_LINEAR,
            quadratic: Self::DEFAULT_QUADRATIC,
            ambient: Self::DEFAULT_AMBIENT,
            diffuse: Self::DEFAULT_DIFFUSE,
            specular: Self::DEFAULT_SPECULAR,
            enabled: true,
            visible: true,
        }
    }
}

/// Cone light. Cut-offs are stored as cosines of the half-angles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    pub inner_cut_off: f32,
    pub outer_cut_off: f32,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub enabled: bool,
    pub visible: bool,
}

impl SpotLight {
    pub const DEFAULT_DIRECTION: Vec3 = Vec3::NEG_Z;
    pub const DEFAULT_INNER_CUT_OFF_DEGREES: f32 = 12.5;
    pub const DEFAULT_OUTER_CUT_OFF_DEGREES: f32 = 15.0;
    pub const DEFAULT_CONSTANT: f32 = 1.0;
    pub const DEFAULT_LINEAR: f32 = 0.09;
    pub const DEFAULT_QUADRATIC: f32 = 0.032;
    pub const DEFAULT_AMBIENT: Vec3 = Vec3::ZERO;
    pub const DEFAULT_DIFFUSE: Vec3 = Vec3::ONE;
    pub const DEFAULT_SPECULAR: Vec3 = Vec3::ONE;

    pub fn new(position: Vec3, direction: Vec3) -> Self {
        Self {
            position,
            direction: normalize_direction(direction, Self::DEFAULT_DIRECTION),
            ..Self::default()
        }
    }

    pub fn inner_cut_off_degrees(&self) -> f32 {
        self.inner_cut_off.clamp(-1.0, 1.0).acos().to_degrees()
    }

    pub fn outer_cut_off_degrees(&self) -> f32 {
        self.outer_cut_off.clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Sets both cone half-angles in degrees. The outer cone never ends up
    /// narrower than the inner one.
    pub fn set_cut_off_degrees(&mut self, inner: f32, outer: f32) {
        let inner = inner.clamp(0.0, 90.0);
        let outer = outer.clamp(inner, 90.0);
        self.inner_cut_off = inner.to_radians().cos();
        self.outer_cut_off = outer.to_radians().cos();
    }

    pub fn attenuation(&self, distance: f32) -> f32 {
        attenuation(self.constant, self.linear, self.quadratic, distance)
    }

    /// Light intensity factor reaching `point`, including the soft cone edge
    /// and distance attenuation. Mirrors the fragment shader.
    pub fn intensity_at(&self, point: Vec3) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let to_point = point - self.position;
        let distance = to_point.length();
        if distance <= f32::EPSILON {
            return 1.0;
        }
        let theta = (to_point / distance).dot(self.direction.normalize_or_zero());
        let epsilon = self.inner_cut_off - self.outer_cut_off;
        let cone = if epsilon.abs() <= f32::EPSILON {
            if theta >= self.outer_cut_off {
                1.0
            } else {
                0.0
            }
        } else {
            ((theta - self.outer_cut_off) / epsilon).clamp(0.0, 1.0)
        };
        cone * self.attenuation(distance)
    }
}

impl Default for SpotLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            direction: Self::DEFAULT_DIRECTION,
            inner_cut_off: Self::DEFAULT_INNER_CUT_OFF_DEGREES.to_radians().cos(),
            outer_cut_off: Self::DEFAULT_OUTER_CUT_OFF_DEGREES.to_radians().cos(),
            constant: Self::DEFAULT_CONSTANT,
            linear: Self::DEFAULT_LINEAR,
            quadratic: Self::DEFAULT_QUADRATIC,
            ambient: Self::DEFAULT_AMBIENT,
            diffuse: Self::DEFAULT_DIFFUSE,
            specular: Self::DEFAULT_SPECULAR,
            enabled: true,
            visible: true,
        }
    }
}

/// Every light contributing to a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lights {
    pub directional: DirectionalLight,
    pub points: Vec<PointLight>,
    pub spot: SpotLight,
    /// When set, the spot light is re-anchored to the camera every frame.
    pub flashlight: bool,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            directional: DirectionalLight::default(),
            points: Vec::new(),
            spot: SpotLight::default(),
            flashlight: true,
        }
    }
}

impl Lights {
    /// The four point lights of the classic multiple-lights scene.
    pub fn tutorial() -> Self {
        Self {
            points: [
                Vec3::new(0.7, 0.2, 2.0),
                Vec3::new(2.3, -3.3, -4.0),
                Vec3::new(-4.0, 2.0, -12.0),
                Vec3::new(0.0, 0.0, -3.0),
            ]
            .into_iter()
            .map(PointLight::new)
            .collect(),
            ..Self::default()
        }
    }

    /// Adds a point light, returning `false` when every slot is taken.
    pub fn add_point(&mut self, light: PointLight) -> bool {
        if self.points.len() >= MAX_POINT_LIGHTS {
            return false;
        }
        self.points.push(light);
        true
    }

    pub fn enabled_point_count(&self) -> usize {
        self.points.iter().filter(|light| light.enabled).count()
    }

    /// Moves the spot light to the camera eye, pointing where it looks.
    pub fn attach_spot_to(&mut self, camera: &Camera) {
        self.spot.position = camera.position;
        self.spot.direction = camera.front();
    }
}

/// Point on a figure-eight path at time `t`, centred on the origin.
pub fn figure_eight(t: f32) -> Vec3 {
    let scale = 2.0 / (3.0 - (2.0 * t).cos());
    Vec3::new(
        3.0 * scale * t.cos(),
        3.0 * t.sin(),
        6.0 * scale * (2.0 * t).sin() / 2.0,
    )
}

fn attenuation(constant: f32, linear: f32, quadratic: f32, distance: f32) -> f32 {
    let denominator = constant + linear * distance + quadratic * distance * distance;
    if denominator <= f32::EPSILON {
        1.0
    } else {
        1.0 / denominator
    }
}

fn normalize_direction(direction: Vec3, fallback: Vec3) -> Vec3 {
    direction
        .try_normalize()
        .unwrap_or_else(|| fallback.normalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directional_direction_is_normalized() {
        let light = DirectionalLight::new(Vec3::new(0.0, -10.0, 0.0));
        assert_eq!(light.direction, Vec3::NEG_Y);
        assert!((DirectionalLight::default().direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_direction_falls_back_to_default() {
        let light = SpotLight::new(Vec3::ZERO, Vec3::ZERO);
        assert_eq!(light.direction, Vec3::NEG_Z);
    }

    #[test]
    fn point_attenuation_uses_coefficients() {
        let light = PointLight::default();
        assert_eq!(light.attenuation(0.0), 1.0);
        let expected = 1.0 / (1.0 + 0.09 * 10.0 + 0.032 * 100.0);
        assert!((light.attenuation(10.0) - expected).abs() < 1e-6);
    }

    #[test]
    fn spot_cut_offs_default_to_cosines() {
        let light = SpotLight::default();
        assert!((light.inner_cut_off_degrees() - 12.5).abs() < 1e-3);
        assert!((light.outer_cut_off_degrees() - 15.0).abs() < 1e-3);
        assert!(light.inner_cut_off > light.outer_cut_off);
    }

    #[test]
    fn outer_cut_off_never_narrower_than_inner() {
        let mut light = SpotLight::default();
        light.set_cut_off_degrees(30.0, 10.0);
        assert!((light.outer_cut_off_degrees() - 30.0).abs() < 1e-3);
    }

    #[test]
    fn spot_intensity_fades_across_cone_edge() {
        let light = SpotLight::default();
        let ahead = light.intensity_at(Vec3::new(0.0, 0.0, -1.0));
        assert!((ahead - light.attenuation(1.0)).abs() < 1e-6);
        let outside = light.intensity_at(Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(outside, 0.0);
        let edge_dir = (13.75_f32).to_radians();
        let edge = light.intensity_at(Vec3::new(edge_dir.sin(), 0.0, -edge_dir.cos()));
        assert!(edge > 0.0 && edge < ahead);
    }

    #[test]
    fn disabled_spot_emits_nothing() {
        let light = SpotLight {
            enabled: false,
            ..SpotLight::default()
        };
        assert_eq!(light.intensity_at(Vec3::NEG_Z), 0.0);
    }

    #[test]
    fn point_slots_are_bounded() {
        let mut lights = Lights::tutorial();
        assert_eq!(lights.points.len(), MAX_POINT_LIGHTS);
        assert!(!lights.add_point(PointLight::default()));
        lights.points[0].enabled = false;
        assert_eq!(lights.enabled_point_count(), 3);
    }

    #[test]
    fn flashlight_follows_camera() {
        let mut lights = Lights::default();
        let mut camera = Camera::at(Vec3::new(1.0, 2.0, 3.0));
        camera.set_orientation(0.0, 0.0);
        lights.attach_spot_to(&camera);
        assert_eq!(lights.spot.position, camera.position);
        assert!((lights.spot.direction - Vec3::X).length() < 1e-5);
    }

    #[test]
    fn figure_eight_starts_on_x_axis() {
        let start = figure_eight(0.0);
        assert!((start - Vec3::new(3.0, 0.0, 0.0)).length() < 1e-5);
    }
}
