use std::path::PathBuf;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};

use crate::app::FrameData;
use crate::light::{DirectionalLight, Lights, PointLight, SpotLight, MAX_POINT_LIGHTS};
use crate::scene::{Scene, SceneObject};

/// Edge length of the cube drawn at each visible light.
pub const LIGHT_MARKER_SCALE: f32 = 0.2;
/// Fraction of the window height covered by the corner axis gizmo.
pub const GIZMO_FRACTION: f32 = 0.18;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DirectionalUniform {
    /// xyz direction, w = 1 when enabled.
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
}

impl DirectionalUniform {
    fn new(light: &DirectionalLight) -> Self {
        Self {
            direction: light.direction.extend(enabled(light.enabled)).into(),
            ambient: light.ambient.extend(0.0).into(),
            diffuse: light.diffuse.extend(0.0).into(),
            specular: light.specular.extend(0.0).into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointUniform {
    /// xyz position, w = 1 when enabled.
    pub position: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    /// constant, linear, quadratic.
    pub attenuation: [f32; 4],
}

impl PointUniform {
    fn new(light: &PointLight) -> Self {
        Self {
            position: light.position.extend(enabled(light.enabled)).into(),
            ambient: light.ambient.extend(0.0).into(),
            diffuse: light.diffuse.extend(0.0).into(),
            specular: light.specular.extend(0.0).into(),
            attenuation: [light.constant, light.linear, light.quadratic, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpotUniform {
    /// xyz position, w = 1 when enabled.
    pub position: [f32; 4],
    pub direction: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub attenuation: [f32; 4],
    /// Cosines of the inner and outer cone angles.
    pub cut_off: [f32; 4],
}

impl SpotUniform {
    fn new(light: &SpotLight) -> Self {
        Self {
            position: light.position.extend(enabled(light.enabled)).into(),
            direction: light.direction.extend(0.0).into(),
            ambient: light.ambient.extend(0.0).into(),
            diffuse: light.diffuse.extend(0.0).into(),
            specular: light.specular.extend(0.0).into(),
            attenuation: [light.constant, light.linear, light.quadratic, 0.0],
            cut_off: [light.inner_cut_off, light.outer_cut_off, 0.0, 0.0],
        }
    }
}

/// Per-frame uniform shared by the lit, marker and grid pipelines.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub view_proj: [[f32; 4]; 4],
    /// xyz camera position, w = elapsed seconds.
    pub camera_position: [f32; 4],
    pub directional: DirectionalUniform,
    pub points: [PointUniform; MAX_POINT_LIGHTS],
    pub spot: SpotUniform,
}

impl GlobalUniform {
    pub fn from_frame(frame: &FrameData) -> Self {
        Self {
            view_proj: frame.view_proj().to_cols_array_2d(),
            camera_position: frame.camera_position.extend(frame.elapsed).into(),
            ..Self::from_lights(&frame.lights)
        }
    }

    /// Light slots only; unused point slots stay zeroed and therefore off.
    pub fn from_lights(lights: &Lights) -> Self {
        let mut points = [PointUniform::zeroed(); MAX_POINT_LIGHTS];
        for (slot, light) in points.iter_mut().zip(&lights.points) {
            *slot = PointUniform::new(light);
        }
        Self {
            view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_position: [0.0; 4],
            directional: DirectionalUniform::new(&lights.directional),
            points,
            spot: SpotUniform::new(&lights.spot),
        }
    }
}

/// Per-draw transform and material for lit meshes and light markers.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub tint: [f32; 4],
    /// x = shininess.
    pub material: [f32; 4],
}

impl ObjectUniform {
    pub fn new(model: Mat4, tint: Vec3, shininess: f32) -> Self {
        let normal = normal_matrix(model);
        Self {
            model: model.to_cols_array_2d(),
            normal: mat3_to_3x4(normal),
            tint: tint.extend(1.0).into(),
            material: [shininess.max(1.0), 0.0, 0.0, 0.0],
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineUniform {
    pub view_proj: [[f32; 4]; 4],
}

impl LineUniform {
    pub fn new(view_proj: Mat4) -> Self {
        Self {
            view_proj: view_proj.to_cols_array_2d(),
        }
    }
}

/// Inverse-transpose of the upper 3x3, falling back to the plain rotation
/// part for degenerate (zero-scale) models.
pub fn normal_matrix(model: Mat4) -> Mat3 {
    let upper = Mat3::from_mat4(model);
    if upper.determinant().abs() <= f32::EPSILON {
        upper
    } else {
        upper.inverse().transpose()
    }
}

/// A cube drawn at each visible, enabled light.
///
/// The directional light has no position and the flashlight sits inside the
/// camera, so neither gets a marker.
pub fn light_markers(lights: &Lights) -> Vec<(Mat4, Vec3)> {
    let marker = |position: Vec3| {
        Mat4::from_translation(position) * Mat4::from_scale(Vec3::splat(LIGHT_MARKER_SCALE))
    };
    let mut markers: Vec<_> = lights
        .points
        .iter()
        .filter(|light| light.enabled && light.visible)
        .map(|light| (marker(light.position), light.diffuse))
        .collect();
    if lights.spot.enabled && lights.spot.visible && !lights.flashlight {
        markers.push((marker(lights.spot.position), lights.spot.diffuse));
    }
    markers
}

/// Projection for the corner gizmo: the view's rotation only, looked at
/// from a fixed distance through a square orthographic box.
pub fn gizmo_view_proj(view: Mat4) -> Mat4 {
    let rotation = Mat4::from_mat3(Mat3::from_mat4(view));
    let pull_back = Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0));
    Mat4::orthographic_rh(-1.2, 1.2, -1.2, 1.2, 0.1, 4.0) * pull_back * rotation
}

/// Texture files an object's bind group samples; `None` selects the
/// renderer's default texture. Bind groups are rebuilt only when this changes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SlotTextures {
    pub diffuse: Option<PathBuf>,
    pub specular: Option<PathBuf>,
}

impl SlotTextures {
    pub fn for_object(scene: &Scene, object: &SceneObject) -> Self {
        Self {
            diffuse: object.diffuse.as_deref().map(|asset| scene.resolve(asset)),
            specular: object.specular.as_deref().map(|asset| scene.resolve(asset)),
        }
    }
}

/// Square viewport in the bottom-left corner: `(x, y, size)` in pixels.
/// `None` when the surface is too small to hold one.
pub fn gizmo_viewport(width: u32, height: u32) -> Option<(f32, f32, f32)> {
    let size = height.min(width) as f32 * GIZMO_FRACTION;
    if size < 1.0 {
        return None;
    }
    let margin = size * 0.1;
    Some((margin, height as f32 - size - margin, size))
}

pub fn clear_color(color: Vec3) -> wgpu::Color {
    let color = Vec4::from((color.clamp(Vec3::ZERO, Vec3::ONE), 1.0)).as_dvec4();
    wgpu::Color {
        r: color.x,
        g: color.y,
        b: color.z,
        a: color.w,
    }
}

fn enabled(flag: bool) -> f32 {
    if flag {
        1.0
    } else {
        0.0
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::App;
    use crate::scene::Scene;

    #[test]
    fn uniform_sizes_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<DirectionalUniform>(), 64);
        assert_eq!(std::mem::size_of::<PointUniform>(), 80);
        assert_eq!(std::mem::size_of::<SpotUniform>(), 112);
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 64 + 16 + 64 + 4 * 80 + 112);
        assert_eq!(std::mem::size_of::<ObjectUniform>(), 144);
    }

    #[test]
    fn globals_mirror_frame() {
        let app = App::new(Scene::demo());
        let frame = app.frame(16.0 / 9.0);
        let globals = GlobalUniform::from_frame(&frame);
        assert_eq!(globals.view_proj, frame.view_proj().to_cols_array_2d());
        assert_eq!(globals.camera_position[..3], frame.camera_position.to_array());
        for (slot, light) in globals.points.iter().zip(&frame.lights.points) {
            assert_eq!(slot.position[..3], light.position.to_array());
            assert_eq!(slot.position[3], 1.0);
            assert_eq!(slot.attenuation[..3], [light.constant, light.linear, light.quadratic]);
        }
        assert_eq!(globals.spot.cut_off[0], frame.lights.spot.inner_cut_off);
    }

    #[test]
    fn unused_and_disabled_slots_are_off() {
        let mut lights = Lights::default();
        lights.add_point(PointLight::new(Vec3::X));
        lights.add_point(PointLight {
            enabled: false,
            ..PointLight::new(Vec3::Y)
        });
        lights.directional.enabled = false;
        let globals = GlobalUniform::from_lights(&lights);
        assert_eq!(globals.points[0].position[3], 1.0);
        assert_eq!(globals.points[1].position[3], 0.0);
        assert_eq!(globals.points[2], PointUniform::zeroed());
        assert_eq!(globals.directional.direction[3], 0.0);
    }

    #[test]
    fn markers_skip_hidden_lights_and_flashlight() {
        let mut lights = Lights::tutorial();
        lights.points[1].visible = false;
        lights.points[2].enabled = false;
        assert_eq!(light_markers(&lights).len(), 2);
        lights.flashlight = false;
        assert_eq!(light_markers(&lights).len(), 3);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let model = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let normal = normal_matrix(model) * Vec3::X;
        assert!((normal - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn gizmo_ignores_camera_translation() {
        let view = Mat4::look_at_rh(Vec3::new(5.0, 3.0, 9.0), Vec3::new(5.0, 3.0, 8.0), Vec3::Y);
        let projected = gizmo_view_proj(view).project_point3(Vec3::X);
        let origin = gizmo_view_proj(view).project_point3(Vec3::ZERO);
        assert!(origin.x.abs() < 1e-5 && origin.y.abs() < 1e-5);
        assert!(projected.x > 0.5);
        assert!(projected.y.abs() < 1e-5);
    }

    #[test]
    fn slot_textures_track_object_assets() {
        let mut scene = Scene::demo();
        scene.base_dir = PathBuf::from("assets");
        let plain = SlotTextures::for_object(&scene, &scene.objects[0]);
        assert_eq!(plain, SlotTextures::default());

        scene.objects[0].diffuse = Some("crate.png".into());
        let textured = SlotTextures::for_object(&scene, &scene.objects[0]);
        assert_eq!(textured.diffuse, Some(PathBuf::from("assets/crate.png")));
        assert_ne!(textured, plain);

        // Moving the object alone keeps the same bind group.
        scene.objects[0].position += Vec3::X;
        assert_eq!(SlotTextures::for_object(&scene, &scene.objects[0]), textured);
    }

    #[test]
    fn gizmo_sits_in_bottom_left() {
        let (x, y, size) = gizmo_viewport(1000, 500).unwrap();
        assert_eq!(size, 90.0);
        assert!(x > 0.0);
        assert!(y + size < 500.0);
    }

    #[test]
    fn tiny_surfaces_skip_the_gizmo() {
        assert_eq!(gizmo_viewport(1000, 1), None);
        assert_eq!(gizmo_viewport(3, 800), None);
        let (x, y, size) = gizmo_viewport(6, 6).unwrap();
        assert!(x >= 0.0 && y >= 0.0);
        assert!(x + size <= 6.0 && y + size <= 6.0);
    }
}
