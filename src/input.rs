use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Keypad(u8),
    Function(u8),
}

/// Keys without a printable character that the controls care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    LeftShift,
    RightShift,
    LeftCtrl,
    RightCtrl,
    LeftAlt,
    RightAlt,
}

/// Identifier for a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const MIDDLE: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// Per-frame input snapshot fed by window events.
///
/// Held keys are tracked alongside the previous frame's set so toggles can
/// fire once per press. Cursor motion and scrolling accumulate until
/// [`InputState::end_frame`].
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
    previous_keys: HashSet<KeyCode>,
    mouse_buttons: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll: f32,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&mut self, key: KeyCode) {
        self.keys.insert(key);
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn set_mouse_button_down(&mut self, button: MouseButton) {
        self.mouse_buttons.insert(button);
    }

    pub fn set_mouse_button_up(&mut self, button: MouseButton) {
        self.mouse_buttons.remove(&button);
    }

    /// Records an absolute cursor position. The first sample only seeds the
    /// position so the camera does not jump when the cursor enters.
    pub fn set_mouse_position(&mut self, position: Vec2) {
        if let Some(last) = self.mouse_position {
            self.mouse_delta += position - last;
        }
        self.mouse_position = Some(position);
    }

    pub fn cursor_left(&mut self) {
        self.mouse_position = None;
    }

    pub fn add_scroll(&mut self, lines: f32) {
        self.scroll += lines;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// True only on the frame the key went down.
    pub fn was_pressed(&self, key: KeyCode) -> bool {
        self.keys.contains(&key) && !self.previous_keys.contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.contains(&button)
    }

    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Cursor movement since the last frame, in window pixels (y down).
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    /// Drops held state, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys.clear();
        self.mouse_buttons.clear();
    }

    pub fn end_frame(&mut self) {
        self.previous_keys.clone_from(&self.keys);
        self.mouse_delta = Vec2::ZERO;
        self.scroll = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_state_tracks_keys() {
        let mut state = InputState::new();
        state.set_key_down(KeyCode::Named(NamedKey::Space));
        assert!(state.is_key_down(KeyCode::Named(NamedKey::Space)));
        state.set_key_up(KeyCode::Named(NamedKey::Space));
        assert!(!state.is_key_down(KeyCode::Named(NamedKey::Space)));
    }

    #[test]
    fn press_edge_lasts_one_frame() {
        let mut state = InputState::new();
        let z = KeyCode::Character('Z');
        state.set_key_down(z);
        assert!(state.was_pressed(z));
        state.end_frame();
        assert!(state.is_key_down(z));
        assert!(!state.was_pressed(z));
        state.set_key_up(z);
        state.end_frame();
        state.set_key_down(z);
        assert!(state.was_pressed(z));
    }

    #[test]
    fn first_cursor_sample_only_seeds() {
        let mut state = InputState::new();
        state.set_mouse_position(Vec2::new(100.0, 100.0));
        assert_eq!(state.mouse_delta(), Vec2::ZERO);
        state.set_mouse_position(Vec2::new(110.0, 95.0));
        state.set_mouse_position(Vec2::new(112.0, 95.0));
        assert_eq!(state.mouse_delta(), Vec2::new(12.0, -5.0));
        state.end_frame();
        assert_eq!(state.mouse_delta(), Vec2::ZERO);
    }

    #[test]
    fn scroll_accumulates_until_frame_end() {
        let mut state = InputState::new();
        state.add_scroll(1.0);
        state.add_scroll(0.5);
        assert_eq!(state.scroll(), 1.5);
        state.end_frame();
        assert_eq!(state.scroll(), 0.0);
    }

    #[test]
    fn mouse_buttons_are_tracked() {
        let mut state = InputState::new();
        state.set_mouse_button_down(MouseButton::RIGHT);
        assert!(state.is_mouse_button_down(MouseButton::new(1)));
        state.release_all();
        assert!(!state.is_mouse_button_down(MouseButton::RIGHT));
    }
}
