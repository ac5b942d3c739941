use std::io::{self, Write};
use std::time::{Duration, Instant};

use glam::{Mat4, Vec3};
use log::{debug, info};

use crate::camera::{Camera, Projection};
use crate::controls::{Controls, FrameActions, InputFocus};
use crate::input::InputState;
use crate::light::{figure_eight, Lights};
use crate::projection::{ProjectionBlend, DEFAULT_BLEND_DURATION};
use crate::scene::Scene;

/// Longest step fed into the simulation; longer stalls are clamped.
pub const MAX_FRAME_DELTA: f32 = 0.1;
const SUMMARY_STEP: f32 = 1.0 / 60.0;

/// Toggles and colours that drive how a frame is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub wireframe: bool,
    pub show_grid: bool,
    pub show_gizmo: bool,
    pub show_light_markers: bool,
    pub animate_lights: bool,
    /// Each channel stays within `[0, 1]`.
    pub clear_color: Vec3,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            wireframe: false,
            show_grid: true,
            show_gizmo: true,
            show_light_markers: true,
            animate_lights: false,
            clear_color: Vec3::ZERO,
        }
    }
}

impl RenderSettings {
    pub fn adjust_clear_color(&mut self, delta: Vec3) {
        self.clear_color = (self.clear_color + delta).clamp(Vec3::ZERO, Vec3::ONE);
    }
}

/// Everything the renderer needs for one frame, detached from the app.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameData {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub camera_front: Vec3,
    pub lights: Lights,
    pub settings: RenderSettings,
    pub elapsed: f32,
}

impl FrameData {
    pub fn view_proj(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// Simulation state of the demo: camera, lights, projection blend.
#[derive(Debug, Clone)]
pub struct App {
    pub camera: Camera,
    pub blend: ProjectionBlend,
    pub lights: Lights,
    pub scene: Scene,
    pub settings: RenderSettings,
    pub controls: Controls,
    elapsed: f32,
    animation_time: f32,
    quit_requested: bool,
}

impl App {
    pub fn new(scene: Scene) -> Self {
        let camera = scene.camera.clone();
        let mut lights = scene.lights.clone();
        if lights.flashlight {
            lights.attach_spot_to(&camera);
        }
        Self {
            blend: ProjectionBlend::new(camera.projection, DEFAULT_BLEND_DURATION),
            camera,
            lights,
            scene,
            settings: RenderSettings::default(),
            controls: Controls::default(),
            elapsed: 0.0,
            animation_time: 0.0,
            quit_requested: false,
        }
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    /// Advances the simulation by one frame of input.
    pub fn update(&mut self, delta_time: f32, input: &InputState, focus: InputFocus) -> FrameActions {
        let delta_time = delta_time.clamp(0.0, MAX_FRAME_DELTA);
        let actions = self.controls.apply(input, &mut self.camera, delta_time, focus);
        self.apply_actions(&actions);
        self.step(delta_time);
        actions
    }

    /// Time-driven part of a frame: animations, blend and flashlight.
    pub fn step(&mut self, delta_time: f32) {
        self.elapsed += delta_time;
        if self.settings.animate_lights {
            self.animation_time += delta_time;
            if let Some(light) = self.lights.points.first_mut() {
                light.position = figure_eight(self.animation_time);
            }
        }
        self.blend.update(delta_time);
        if self.lights.flashlight {
            self.lights.attach_spot_to(&self.camera);
        }
    }

    pub fn apply_actions(&mut self, actions: &FrameActions) {
        if actions.quit {
            info!("Quit requested");
            self.quit_requested = true;
        }
        if actions.toggle_wireframe {
            self.settings.wireframe = !self.settings.wireframe;
            debug!("Wireframe {}", on_off(self.settings.wireframe));
        }
        if actions.toggle_projection {
            self.toggle_projection();
        }
        if actions.toggle_grid {
            self.settings.show_grid = !self.settings.show_grid;
        }
        if actions.toggle_flashlight {
            self.lights.flashlight = !self.lights.flashlight;
            debug!("Flashlight {}", on_off(self.lights.flashlight));
        }
        if actions.toggle_animation {
            self.settings.animate_lights = !self.settings.animate_lights;
        }
        if actions.clear_color_delta != Vec3::ZERO {
            self.settings.adjust_clear_color(actions.clear_color_delta);
        }
    }

    pub fn toggle_projection(&mut self) -> Projection {
        let target = self.camera.toggle_projection();
        self.blend.set_target(target);
        info!("Switching to {} projection", target.label());
        target
    }

    /// Selects a projection mode, animating only when it actually changes.
    pub fn set_projection(&mut self, projection: Projection) {
        if self.camera.projection != projection {
            self.toggle_projection();
        }
    }

    pub fn frame(&self, aspect: f32) -> FrameData {
        FrameData {
            view: self.camera.view_matrix(),
            projection: self.blend.matrix(&self.camera, aspect),
            camera_position: self.camera.position,
            camera_front: self.camera.front(),
            lights: self.lights.clone(),
            settings: self.settings,
            elapsed: self.elapsed,
        }
    }
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

/// Per-frame delta time and a smoothed frames-per-second estimate.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Option<Instant>,
    delta: f32,
    fps: f32,
    frames: u64,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    const SMOOTHING: f32 = 0.1;

    pub fn new() -> Self {
        Self {
            last: None,
            delta: 0.0,
            fps: 0.0,
            frames: 0,
        }
    }

    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Records a frame boundary at `now` and returns the delta in seconds.
    /// The first tick only starts the clock.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = self
            .last
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO)
            .as_secs_f32();
        self.last = Some(now);
        self.delta = delta;
        self.frames += 1;
        if delta > 0.0 {
            let instant_fps = 1.0 / delta;
            self.fps = if self.fps == 0.0 {
                instant_fps
            } else {
                self.fps + (instant_fps - self.fps) * Self::SMOOTHING
            };
        }
        delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Prints the scene, lights and camera, then runs a projection toggle
/// through the blend to show the animation converging.
pub fn write_summary(out: &mut impl Write, scene: &Scene) -> io::Result<()> {
    let lights = &scene.lights;
    writeln!(
        out,
        "Loaded scene with {} objects ({} point lights)",
        scene.objects.len(),
        lights.points.len()
    )?;
    for object in &scene.objects {
        writeln!(
            out,
            " - {} [{}] pos=({:.2}, {:.2}, {:.2})",
            object.name,
            object.mesh.key(),
            object.position.x,
            object.position.y,
            object.position.z
        )?;
    }

    let camera = &scene.camera;
    writeln!(
        out,
        "Camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1} fov={:.1} projection={}",
        camera.position.x,
        camera.position.y,
        camera.position.z,
        camera.yaw(),
        camera.pitch(),
        camera.fov(),
        camera.projection.label()
    )?;

    let directional = &lights.directional;
    writeln!(
        out,
        "Directional light: dir=({:.2}, {:.2}, {:.2}) enabled={}",
        directional.direction.x,
        directional.direction.y,
        directional.direction.z,
        directional.enabled
    )?;
    for (index, point) in lights.points.iter().enumerate() {
        writeln!(
            out,
            "Point light {index}: pos=({:.2}, {:.2}, {:.2}) enabled={}",
            point.position.x, point.position.y, point.position.z, point.enabled
        )?;
    }
    writeln!(
        out,
        "Spot light: cut-off={:.1}/{:.1} enabled={} flashlight={}",
        lights.spot.inner_cut_off_degrees(),
        lights.spot.outer_cut_off_degrees(),
        lights.spot.enabled,
        lights.flashlight
    )?;

    let mut app = App::new(scene.clone());
    let from = app.camera.projection;
    let to = app.toggle_projection();
    let mut frames = 0u32;
    while app.blend.is_animating() {
        app.step(SUMMARY_STEP);
        frames += 1;
    }
    writeln!(
        out,
        "Projection blend: {} -> {} in {} frames",
        from.label(),
        to.label(),
        frames
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyCode;

    fn app() -> App {
        App::new(Scene::demo())
    }

    #[test]
    fn projection_toggle_animates_to_orthographic() {
        let mut app = app();
        let input = {
            let mut input = InputState::new();
            input.set_key_down(KeyCode::Character('P'));
            input
        };
        app.update(0.016, &input, InputFocus::default());
        assert_eq!(app.camera.projection, Projection::Orthographic);
        assert!(app.blend.is_animating());
        for _ in 0..100 {
            app.step(0.05);
        }
        assert!(!app.blend.is_animating());
        let frame = app.frame(1.5);
        assert_eq!(frame.projection, app.camera.orthographic_matrix(1.5));
    }

    #[test]
    fn flashlight_follows_camera() {
        let mut app = app();
        app.camera.position = Vec3::new(4.0, 1.0, 2.0);
        app.step(0.016);
        assert_eq!(app.lights.spot.position, Vec3::new(4.0, 1.0, 2.0));
        assert_eq!(app.lights.spot.direction, app.camera.front());

        app.lights.flashlight = false;
        app.camera.position = Vec3::ZERO;
        app.step(0.016);
        assert_eq!(app.lights.spot.position, Vec3::new(4.0, 1.0, 2.0));
    }

    #[test]
    fn clear_color_stays_in_range() {
        let mut settings = RenderSettings::default();
        settings.adjust_clear_color(Vec3::new(-0.1, 0.1, 0.0));
        assert_eq!(settings.clear_color, Vec3::new(0.0, 0.1, 0.0));
        for _ in 0..20 {
            settings.adjust_clear_color(Vec3::new(0.1, 0.0, 0.0));
        }
        assert_eq!(settings.clear_color.x, 1.0);
    }

    #[test]
    fn animation_moves_first_point_light() {
        let mut app = app();
        let before = app.lights.points[0].position;
        app.settings.animate_lights = true;
        app.step(0.5);
        assert_ne!(app.lights.points[0].position, before);
        assert_eq!(app.lights.points[0].position, figure_eight(0.5));
    }

    #[test]
    fn escape_requests_quit() {
        let mut app = app();
        let mut input = InputState::new();
        input.set_key_down(KeyCode::Named(crate::input::NamedKey::Escape));
        let actions = app.update(0.016, &input, InputFocus::default());
        assert!(actions.quit);
        assert!(app.quit_requested());
    }

    #[test]
    fn long_stalls_are_clamped() {
        let mut app = app();
        app.update(5.0, &InputState::new(), InputFocus::default());
        assert!((app.elapsed() - MAX_FRAME_DELTA).abs() < 1e-6);
    }

    #[test]
    fn set_projection_ignores_current_mode() {
        let mut app = app();
        app.set_projection(Projection::Perspective);
        assert!(!app.blend.is_animating());
        app.set_projection(Projection::Orthographic);
        assert!(app.blend.is_animating());
    }

    #[test]
    fn frame_clock_smooths_fps() {
        let mut clock = FrameClock::new();
        let start = Instant::now();
        assert_eq!(clock.tick_at(start), 0.0);
        let delta = clock.tick_at(start + Duration::from_millis(20));
        assert!((delta - 0.02).abs() < 1e-4);
        assert!((clock.fps() - 50.0).abs() < 0.1);
        clock.tick_at(start + Duration::from_millis(30));
        assert!(clock.fps() > 50.0 && clock.fps() < 100.0);
        assert_eq!(clock.frames(), 3);
    }

    #[test]
    fn summary_lists_scene_and_blend() {
        let mut out = Vec::new();
        write_summary(&mut out, &Scene::demo()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Loaded scene with 10 objects (4 point lights)"));
        assert!(text.contains("Crate0 [cube]"));
        assert!(text.contains("Projection blend: perspective -> orthographic in"));
    }
}
