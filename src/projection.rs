//! Animated switch between perspective and orthographic projection.
//!
//! The two matrices are mixed column by column with a cubic-Bezier ease, so
//! the scene appears to flatten (or regain depth) over a short duration
//! instead of snapping.

use glam::{Mat4, Vec2};

use crate::camera::{Camera, Projection};

pub const DEFAULT_BLEND_DURATION: f32 = 0.6;

const EASE_P0: Vec2 = Vec2::new(0.0, 0.0);
const EASE_P1: Vec2 = Vec2::new(0.0, 1.0);
const EASE_P2: Vec2 = Vec2::new(0.0, 1.0);
const EASE_P3: Vec2 = Vec2::new(1.0, 1.0);

/// Evaluates a cubic Bezier curve in Bernstein form.
pub fn cubic_bezier(t: f32, p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u * u) + p1 * (3.0 * u * u * t) + p2 * (3.0 * u * t * t) + p3 * (t * t * t)
}

/// Ease-out curve used for the projection blend, `1 - (1 - t)^3`.
pub fn ease(t: f32) -> f32 {
    cubic_bezier(t.clamp(0.0, 1.0), EASE_P0, EASE_P1, EASE_P2, EASE_P3).y
}

/// Mixes two projection matrices column-wise with the eased factor.
pub fn lerp_projection_matrices(perspective: &Mat4, ortho: &Mat4, t: f32) -> Mat4 {
    let mix = ease(t);
    Mat4::from_cols(
        perspective.x_axis.lerp(ortho.x_axis, mix),
        perspective.y_axis.lerp(ortho.y_axis, mix),
        perspective.z_axis.lerp(ortho.z_axis, mix),
        perspective.w_axis.lerp(ortho.w_axis, mix),
    )
}

/// Time-driven progress of the projection transition.
///
/// `progress` is 0 for fully perspective and 1 for fully orthographic.
/// Retargeting mid-way reverses from wherever the blend currently is.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionBlend {
    duration: f32,
    progress: f32,
    target: Projection,
}

impl Default for ProjectionBlend {
    fn default() -> Self {
        Self::new(Projection::Perspective, DEFAULT_BLEND_DURATION)
    }
}

impl ProjectionBlend {
    pub fn new(initial: Projection, duration: f32) -> Self {
        Self {
            duration: duration.max(0.0),
            progress: endpoint(initial),
            target: initial,
        }
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
    }

    pub fn target(&self) -> Projection {
        self.target
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn set_target(&mut self, target: Projection) {
        self.target = target;
        if self.duration <= f32::EPSILON {
            self.progress = endpoint(target);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.progress != endpoint(self.target)
    }

    pub fn update(&mut self, delta_time: f32) {
        let goal = endpoint(self.target);
        if self.progress == goal {
            return;
        }
        if self.duration <= f32::EPSILON {
            self.progress = goal;
            return;
        }
        let step = delta_time.max(0.0) / self.duration;
        self.progress = if goal > self.progress {
            (self.progress + step).min(goal)
        } else {
            (self.progress - step).max(goal)
        };
    }

    /// Projection matrix for the current point of the blend.
    pub fn matrix(&self, camera: &Camera, aspect: f32) -> Mat4 {
        if self.progress <= 0.0 {
            camera.perspective_matrix(aspect)
        } else if self.progress >= 1.0 {
            camera.orthographic_matrix(aspect)
        } else {
            lerp_projection_matrices(
                &camera.perspective_matrix(aspect),
                &camera.orthographic_matrix(aspect),
                self.progress,
            )
        }
    }
}

fn endpoint(projection: Projection) -> f32 {
    match projection {
        Projection::Perspective => 0.0,
        Projection::Orthographic => 1.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_hits_endpoints_and_is_monotonic() {
        assert_eq!(ease(0.0), 0.0);
        assert!((ease(1.0) - 1.0).abs() < 1e-6);
        let mut previous = 0.0;
        for step in 1..=20 {
            let value = ease(step as f32 / 20.0);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn ease_matches_closed_form() {
        for t in [0.1_f32, 0.25, 0.5, 0.9] {
            let expected = 1.0 - (1.0 - t).powi(3);
            assert!((ease(t) - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn lerp_endpoints_return_inputs() {
        let camera = Camera::default();
        let perspective = camera.perspective_matrix(1.5);
        let ortho = camera.orthographic_matrix(1.5);
        assert!(lerp_projection_matrices(&perspective, &ortho, 0.0).abs_diff_eq(perspective, 1e-6));
        assert!(lerp_projection_matrices(&perspective, &ortho, 1.0).abs_diff_eq(ortho, 1e-6));
    }

    #[test]
    fn blend_advances_towards_target() {
        let mut blend = ProjectionBlend::new(Projection::Perspective, 1.0);
        assert!(!blend.is_animating());
        blend.set_target(Projection::Orthographic);
        assert!(blend.is_animating());
        blend.update(0.25);
        assert!((blend.progress() - 0.25).abs() < 1e-6);
        blend.update(5.0);
        assert_eq!(blend.progress(), 1.0);
        assert!(!blend.is_animating());
    }

    #[test]
    fn retarget_reverses_midway() {
        let mut blend = ProjectionBlend::new(Projection::Perspective, 1.0);
        blend.set_target(Projection::Orthographic);
        blend.update(0.4);
        blend.set_target(Projection::Perspective);
        blend.update(0.1);
        assert!((blend.progress() - 0.3).abs() < 1e-5);
    }

    #[test]
    fn zero_duration_snaps() {
        let mut blend = ProjectionBlend::new(Projection::Perspective, 0.0);
        blend.set_target(Projection::Orthographic);
        assert_eq!(blend.progress(), 1.0);
    }

    #[test]
    fn matrix_uses_pure_projection_at_rest() {
        let camera = Camera::default();
        let blend = ProjectionBlend::new(Projection::Orthographic, 1.0);
        assert_eq!(blend.matrix(&camera, 1.0), camera.orthographic_matrix(1.0));
    }
}
