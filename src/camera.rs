use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

pub const DEFAULT_YAW: f32 = -90.0;
pub const DEFAULT_PITCH: f32 = 0.0;
pub const DEFAULT_SPEED: f32 = 5.0;
pub const DEFAULT_SENSITIVITY: f32 = 10.0;
pub const DEFAULT_DRAG_SENSITIVITY: f32 = 3.0;
pub const DEFAULT_FOV: f32 = 45.0;
pub const DEFAULT_ORTHOGRAPHIC_FACTOR: f32 = 5.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 100.0;

pub const MIN_FOV: f32 = 1.0;
pub const MAX_FOV: f32 = 100.0;
pub const PITCH_LIMIT: f32 = 89.0;
/// Smallest half-extent the orthographic volume may shrink to.
pub const MIN_ORTHOGRAPHIC_FACTOR: f32 = 0.1;

/// Direction requested by a movement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Projection model used by the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Projection {
    #[default]
    Perspective,
    Orthographic,
}

impl Projection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Perspective => Self::Orthographic,
            Self::Orthographic => Self::Perspective,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Perspective => "perspective",
            Self::Orthographic => "orthographic",
        }
    }
}

/// Free-fly camera driven by yaw/pitch Euler angles (in degrees).
///
/// The orientation angles and the derived basis are private so that the
/// pitch/yaw bounds and the orthonormal basis can never be observed out of
/// sync; use [`Camera::set_orientation`] to change them directly.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub world_up: Vec3,
    pub movement_speed: f32,
    pub mouse_sensitivity: f32,
    pub drag_sensitivity: f32,
    pub orthographic_factor: f32,
    pub projection: Projection,
    pub near: f32,
    pub far: f32,
    yaw: f32,
    pitch: f32,
    fov: f32,
    front: Vec3,
    right: Vec3,
    up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(
            Vec3::ZERO,
            Vec3::Y,
            DEFAULT_YAW,
            DEFAULT_PITCH,
            Projection::Perspective,
        )
    }
}

impl Camera {
    pub fn new(
        position: Vec3,
        world_up: Vec3,
        yaw: f32,
        pitch: f32,
        projection: Projection,
    ) -> Self {
        let mut camera = Self {
            position,
            world_up: world_up.try_normalize().unwrap_or(Vec3::Y),
            movement_speed: DEFAULT_SPEED,
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            drag_sensitivity: DEFAULT_DRAG_SENSITIVITY,
            orthographic_factor: DEFAULT_ORTHOGRAPHIC_FACTOR,
            projection,
            near: DEFAULT_NEAR,
            far: DEFAULT_FAR,
            yaw: wrap_degrees(yaw),
            pitch: pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT),
            fov: DEFAULT_FOV,
            front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    /// Camera placed at `position` looking down -Z with default settings.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    pub fn up(&self) -> Vec3 {
        self.up
    }

    /// Replaces the orientation, applying the pitch clamp and yaw wrap.
    /// Non-finite angles are ignored.
    pub fn set_orientation(&mut self, yaw: f32, pitch: f32) {
        if !(yaw.is_finite() && pitch.is_finite()) {
            return;
        }
        self.yaw = wrap_degrees(yaw);
        self.pitch = pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    pub fn set_fov(&mut self, fov: f32) {
        if !fov.is_finite() {
            return;
        }
        self.fov = fov.clamp(MIN_FOV, MAX_FOV);
    }

    pub fn toggle_projection(&mut self) -> Projection {
        self.projection = self.projection.toggled();
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.world_up)
    }

    pub fn perspective_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(
            self.fov.to_radians(),
            sanitize_aspect(aspect),
            self.near,
            self.far,
        )
    }

    pub fn orthographic_matrix(&self, aspect: f32) -> Mat4 {
        let half_height = self.orthographic_factor.max(MIN_ORTHOGRAPHIC_FACTOR);
        let half_width = half_height * sanitize_aspect(aspect);
        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far,
        )
    }

    /// Projection for the current mode, without any blending.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        match self.projection {
            Projection::Perspective => self.perspective_matrix(aspect),
            Projection::Orthographic => self.orthographic_matrix(aspect),
        }
    }

    pub fn process_keyboard(&mut self, movement: CameraMovement, delta_time: f32) {
        let step = self.movement_speed * delta_time;
        match movement {
            CameraMovement::Forward => self.position += self.front * step,
            CameraMovement::Backward => self.position -= self.front * step,
            CameraMovement::Left => self.position -= self.right * step,
            CameraMovement::Right => self.position += self.right * step,
            CameraMovement::Up => self.position += self.world_up * step,
            CameraMovement::Down => self.position -= self.world_up * step,
        }
    }

    /// Mouse-look: cursor deltas become yaw/pitch deltas.
    pub fn process_mouse_movement(&mut self, delta_time: f32, delta_x: f32, delta_y: f32) {
        let scale = self.mouse_sensitivity * delta_time;
        self.set_orientation(self.yaw + delta_x * scale, self.pitch + delta_y * scale);
    }

    /// Drag panning in the camera plane; the scene follows the cursor.
    pub fn process_mouse_drag(&mut self, delta_time: f32, delta_x: f32, delta_y: f32) {
        let scale = self.drag_sensitivity * delta_time;
        self.position -= self.right * (delta_x * scale);
        self.position -= self.up * (delta_y * scale);
    }

    pub fn process_mouse_scroll(&mut self, y_offset: f32) {
        match self.projection {
            Projection::Perspective => self.set_fov(self.fov - y_offset),
            Projection::Orthographic => {
                self.orthographic_factor =
                    (self.orthographic_factor - y_offset / 5.0).max(MIN_ORTHOGRAPHIC_FACTOR);
            }
        }
    }

    fn update_vectors(&mut self) {
        let (yaw_sin, yaw_cos) = self.yaw.to_radians().sin_cos();
        let (pitch_sin, pitch_cos) = self.pitch.to_radians().sin_cos();
        self.front = Vec3::new(yaw_cos * pitch_cos, pitch_sin, yaw_sin * pitch_cos).normalize();
        self.right = self.front.cross(self.world_up).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

/// Wraps an angle in degrees into `[-180, 180]`.
pub fn wrap_degrees(angle: f32) -> f32 {
    if (-180.0..=180.0).contains(&angle) {
        angle
    } else {
        (angle + 180.0).rem_euclid(360.0) - 180.0
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.01 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn default_camera_looks_down_negative_z() {
        let camera = Camera::default();
        assert!(approx(camera.front(), Vec3::NEG_Z));
        assert!(approx(camera.right(), Vec3::X));
        assert!(approx(camera.up(), Vec3::Y));
        assert_eq!(camera.fov(), DEFAULT_FOV);
    }

    #[test]
    fn pitch_is_clamped() {
        let mut camera = Camera::default();
        camera.process_mouse_movement(1.0, 0.0, 50.0);
        assert_eq!(camera.pitch(), PITCH_LIMIT);
        camera.process_mouse_movement(1.0, 0.0, -500.0);
        assert_eq!(camera.pitch(), -PITCH_LIMIT);
    }

    #[test]
    fn yaw_wraps_around() {
        let mut camera = Camera::default();
        camera.set_orientation(170.0, 0.0);
        camera.process_mouse_movement(1.0, 2.0, 0.0);
        assert!((camera.yaw() - (-170.0)).abs() < 1e-3);
        camera.set_orientation(-175.0, 0.0);
        camera.process_mouse_movement(1.0, -1.0, 0.0);
        assert!((camera.yaw() - 175.0).abs() < 1e-3);
    }

    #[test]
    fn non_finite_setters_are_ignored() {
        let mut camera = Camera::default();
        camera.set_fov(f32::NAN);
        camera.set_fov(f32::INFINITY);
        assert_eq!(camera.fov(), DEFAULT_FOV);
        camera.set_orientation(f32::INFINITY, 10.0);
        camera.set_orientation(20.0, f32::NAN);
        assert_eq!(camera.yaw(), DEFAULT_YAW);
        assert_eq!(camera.pitch(), DEFAULT_PITCH);
        assert!(approx(camera.front(), Vec3::NEG_Z));
    }

    #[test]
    fn wrap_handles_multiple_turns() {
        assert!((wrap_degrees(900.0) - (-180.0)).abs() < 1e-3);
        assert!((wrap_degrees(-725.0) - (-5.0)).abs() < 1e-3);
        assert_eq!(wrap_degrees(180.0), 180.0);
    }

    #[test]
    fn basis_stays_orthonormal() {
        let mut camera = Camera::default();
        camera.set_orientation(33.0, 71.0);
        let (f, r, u) = (camera.front(), camera.right(), camera.up());
        for v in [f, r, u] {
            assert!((v.length() - 1.0).abs() < 1e-4);
        }
        assert!(f.dot(r).abs() < 1e-4);
        assert!(f.dot(u).abs() < 1e-4);
        assert!(r.dot(u).abs() < 1e-4);
    }

    #[test]
    fn keyboard_movement_is_velocity_integrated() {
        let mut camera = Camera::default();
        camera.process_keyboard(CameraMovement::Forward, 0.5);
        assert!(approx(camera.position, Vec3::new(0.0, 0.0, -2.5)));
        camera.process_keyboard(CameraMovement::Right, 0.2);
        assert!(approx(camera.position, Vec3::new(1.0, 0.0, -2.5)));
        camera.process_keyboard(CameraMovement::Up, 0.2);
        assert!(approx(camera.position, Vec3::new(1.0, 1.0, -2.5)));
    }

    #[test]
    fn drag_moves_against_cursor() {
        let mut camera = Camera::default();
        camera.process_mouse_drag(1.0, 1.0, 0.0);
        assert!(approx(camera.position, Vec3::new(-DEFAULT_DRAG_SENSITIVITY, 0.0, 0.0)));
    }

    #[test]
    fn scroll_clamps_fov() {
        let mut camera = Camera::default();
        camera.process_mouse_scroll(100.0);
        assert_eq!(camera.fov(), MIN_FOV);
        camera.process_mouse_scroll(-500.0);
        assert_eq!(camera.fov(), MAX_FOV);
    }

    #[test]
    fn scroll_in_orthographic_changes_factor() {
        let mut camera = Camera::default();
        camera.toggle_projection();
        camera.process_mouse_scroll(5.0);
        assert!((camera.orthographic_factor - 4.0).abs() < 1e-5);
        assert_eq!(camera.fov(), DEFAULT_FOV);
        camera.process_mouse_scroll(1000.0);
        assert_eq!(camera.orthographic_factor, MIN_ORTHOGRAPHIC_FACTOR);
    }

    #[test]
    fn orthographic_bounds_follow_factor_and_aspect() {
        let camera = Camera::default();
        let ortho = camera.orthographic_matrix(2.0);
        // x scale is 2 / (right - left) = 2 / (2 * factor * aspect)
        assert!((ortho.x_axis.x - 1.0 / (DEFAULT_ORTHOGRAPHIC_FACTOR * 2.0)).abs() < 1e-6);
        assert!((ortho.y_axis.y - 1.0 / DEFAULT_ORTHOGRAPHIC_FACTOR).abs() < 1e-6);
    }

    #[test]
    fn view_matrix_moves_position_to_origin() {
        let camera = Camera::at(Vec3::new(1.0, 2.0, 3.0));
        let eye = camera.view_matrix().transform_point3(camera.position);
        assert!(approx(eye, Vec3::ZERO));
    }
}
