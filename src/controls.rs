use glam::Vec3;

use crate::camera::{Camera, CameraMovement};
use crate::input::{InputState, KeyCode, MouseButton, NamedKey};

const MOVEMENT_KEYS: [(KeyCode, CameraMovement); 6] = [
    (KeyCode::Character('W'), CameraMovement::Forward),
    (KeyCode::Character('S'), CameraMovement::Backward),
    (KeyCode::Character('A'), CameraMovement::Left),
    (KeyCode::Character('D'), CameraMovement::Right),
    (KeyCode::Named(NamedKey::Space), CameraMovement::Up),
    (KeyCode::Named(NamedKey::LeftCtrl), CameraMovement::Down),
];

const CLEAR_COLOR_KEYS: [(u8, Vec3); 6] = [
    (7, Vec3::new(CLEAR_COLOR_STEP, 0.0, 0.0)),
    (4, Vec3::new(-CLEAR_COLOR_STEP, 0.0, 0.0)),
    (8, Vec3::new(0.0, CLEAR_COLOR_STEP, 0.0)),
    (5, Vec3::new(0.0, -CLEAR_COLOR_STEP, 0.0)),
    (9, Vec3::new(0.0, 0.0, CLEAR_COLOR_STEP)),
    (6, Vec3::new(0.0, 0.0, -CLEAR_COLOR_STEP)),
];

pub const CLEAR_COLOR_STEP: f32 = 0.1;
pub const DEFAULT_SPRINT_MULTIPLIER: f32 = 3.0;

pub const LOOK_BUTTON: MouseButton = MouseButton::RIGHT;
pub const DRAG_BUTTON: MouseButton = MouseButton::MIDDLE;

/// Which input streams reach the scene rather than the debug UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFocus {
    pub keyboard: bool,
    pub pointer: bool,
}

impl Default for InputFocus {
    fn default() -> Self {
        Self {
            keyboard: true,
            pointer: true,
        }
    }
}

/// Edge-triggered requests produced by one frame of input.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameActions {
    pub quit: bool,
    pub toggle_wireframe: bool,
    pub toggle_projection: bool,
    pub toggle_grid: bool,
    pub toggle_flashlight: bool,
    pub toggle_animation: bool,
    pub clear_color_delta: Vec3,
}

impl FrameActions {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Maps held keys and mouse motion onto the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Controls {
    /// Holding shift multiplies movement speed by this factor.
    pub sprint_multiplier: f32,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            sprint_multiplier: DEFAULT_SPRINT_MULTIPLIER,
        }
    }
}

impl Controls {
    /// Applies one frame of input to the camera and reports the toggles.
    ///
    /// Movement keys, mouse-look (right button), drag panning (middle button)
    /// and scrolling act on the camera directly; everything else is returned.
    pub fn apply(
        &self,
        input: &InputState,
        camera: &mut Camera,
        delta_time: f32,
        focus: InputFocus,
    ) -> FrameActions {
        let mut actions = FrameActions::default();

        if focus.keyboard {
            let sprint = input.is_key_down(KeyCode::Named(NamedKey::LeftShift));
            let step = if sprint {
                delta_time * self.sprint_multiplier
            } else {
                delta_time
            };
            for (key, movement) in MOVEMENT_KEYS {
                if input.is_key_down(key) {
                    camera.process_keyboard(movement, step);
                }
            }

            actions.quit = input.was_pressed(KeyCode::Named(NamedKey::Escape));
            actions.toggle_wireframe = input.was_pressed(KeyCode::Character('Z'));
            actions.toggle_projection = input.was_pressed(KeyCode::Character('P'));
            actions.toggle_grid = input.was_pressed(KeyCode::Character('G'));
            actions.toggle_flashlight = input.was_pressed(KeyCode::Character('F'));
            actions.toggle_animation = input.was_pressed(KeyCode::Character('L'));
            for (digit, delta) in CLEAR_COLOR_KEYS {
                if input.was_pressed(KeyCode::Keypad(digit)) {
                    actions.clear_color_delta += delta;
                }
            }
        }

        if focus.pointer {
            // Window y grows downwards; camera pitch grows upwards.
            let delta = input.mouse_delta();
            if delta != glam::Vec2::ZERO {
                if input.is_mouse_button_down(LOOK_BUTTON) {
                    camera.process_mouse_movement(delta_time, delta.x, -delta.y);
                } else if input.is_mouse_button_down(DRAG_BUTTON) {
                    camera.process_mouse_drag(delta_time, delta.x, -delta.y);
                }
            }
            if input.scroll() != 0.0 {
                camera.process_mouse_scroll(input.scroll());
            }
        }

        actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{DEFAULT_FOV, DEFAULT_SPEED};
    use glam::Vec2;

    fn pressed(keys: &[KeyCode]) -> InputState {
        let mut input = InputState::new();
        for key in keys {
            input.set_key_down(*key);
        }
        input
    }

    #[test]
    fn wasd_moves_camera() {
        let mut camera = Camera::default();
        let input = pressed(&[KeyCode::Character('W'), KeyCode::Character('D')]);
        let actions = Controls::default().apply(&input, &mut camera, 0.1, InputFocus::default());
        assert!(actions.is_empty());
        assert!((camera.position - Vec3::new(0.5, 0.0, -0.5)).length() < 1e-5);
    }

    #[test]
    fn shift_sprints() {
        let mut camera = Camera::default();
        let input = pressed(&[
            KeyCode::Character('W'),
            KeyCode::Named(NamedKey::LeftShift),
        ]);
        Controls::default().apply(&input, &mut camera, 0.1, InputFocus::default());
        let expected = -DEFAULT_SPEED * 0.1 * DEFAULT_SPRINT_MULTIPLIER;
        assert!((camera.position.z - expected).abs() < 1e-5);
    }

    #[test]
    fn toggles_fire_once_per_press() {
        let mut camera = Camera::default();
        let mut input = pressed(&[KeyCode::Character('Z'), KeyCode::Character('P')]);
        let first = Controls::default().apply(&input, &mut camera, 0.016, InputFocus::default());
        assert!(first.toggle_wireframe && first.toggle_projection);
        input.end_frame();
        let second = Controls::default().apply(&input, &mut camera, 0.016, InputFocus::default());
        assert!(!second.toggle_wireframe && !second.toggle_projection);
    }

    #[test]
    fn keypad_adjusts_clear_color() {
        let mut camera = Camera::default();
        let input = pressed(&[KeyCode::Keypad(7), KeyCode::Keypad(6)]);
        let actions = Controls::default().apply(&input, &mut camera, 0.016, InputFocus::default());
        assert_eq!(
            actions.clear_color_delta,
            Vec3::new(CLEAR_COLOR_STEP, 0.0, -CLEAR_COLOR_STEP)
        );
    }

    #[test]
    fn right_drag_looks_around() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.set_mouse_button_down(LOOK_BUTTON);
        input.set_mouse_position(Vec2::new(0.0, 0.0));
        input.set_mouse_position(Vec2::new(10.0, -5.0));
        Controls::default().apply(&input, &mut camera, 0.1, InputFocus::default());
        assert!((camera.yaw() - (-80.0)).abs() < 1e-4);
        assert!((camera.pitch() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn ui_focus_blocks_scene_input() {
        let mut camera = Camera::default();
        let mut input = pressed(&[KeyCode::Character('W'), KeyCode::Named(NamedKey::Escape)]);
        input.add_scroll(3.0);
        let focus = InputFocus {
            keyboard: false,
            pointer: false,
        };
        let actions = Controls::default().apply(&input, &mut camera, 0.1, focus);
        assert!(!actions.quit);
        assert_eq!(camera.position, Vec3::ZERO);
        assert_eq!(camera.fov(), DEFAULT_FOV);
    }

    #[test]
    fn scroll_zooms() {
        let mut camera = Camera::default();
        let mut input = InputState::new();
        input.add_scroll(5.0);
        Controls::default().apply(&input, &mut camera, 0.016, InputFocus::default());
        assert_eq!(camera.fov(), DEFAULT_FOV - 5.0);
    }
}
