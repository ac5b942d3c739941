//! Debug panels drawn with egui on top of the scene.
//!
//! The panels edit the live [`App`] state directly; the renderer only sees
//! the tessellated [`GuiFrame`].

use egui::{CollapsingHeader, Context, DragValue, Slider, Ui};
use glam::Vec3;
use winit::event::WindowEvent;
use winit::window::Window;

use crate::app::{App, RenderSettings};
use crate::camera::{Camera, Projection, MAX_FOV, MIN_FOV, MIN_ORTHOGRAPHIC_FACTOR, PITCH_LIMIT};
use crate::controls::InputFocus;
use crate::light::{DirectionalLight, Lights, PointLight, SpotLight};

/// Tessellated UI output ready for painting.
pub struct GuiFrame {
    pub paint_jobs: Vec<egui::ClippedPrimitive>,
    pub textures_delta: egui::TexturesDelta,
    pub pixels_per_point: f32,
}

/// Read-only facts shown in the render panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiStats {
    pub fps: f32,
    pub wireframe_supported: bool,
}

pub struct DebugUi {
    ctx: Context,
    state: egui_winit::State,
}

impl DebugUi {
    pub fn new(window: &Window) -> Self {
        let ctx = Context::default();
        let state = egui_winit::State::new(
            ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        Self { ctx, state }
    }

    /// Feeds a window event to egui. Returns true when egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        self.state.on_window_event(window, event).consumed
    }

    /// Input streams egui is not currently using.
    pub fn focus(&self) -> InputFocus {
        InputFocus {
            keyboard: !self.ctx.wants_keyboard_input(),
            pointer: !self.ctx.wants_pointer_input(),
        }
    }

    pub fn run(&mut self, window: &Window, app: &mut App, stats: UiStats) -> GuiFrame {
        let raw_input = self.state.take_egui_input(window);
        let output = self.ctx.run(raw_input, |ctx| draw_panels(ctx, app, stats));
        self.state
            .handle_platform_output(window, output.platform_output);
        let paint_jobs = self.ctx.tessellate(output.shapes, output.pixels_per_point);
        GuiFrame {
            paint_jobs,
            textures_delta: output.textures_delta,
            pixels_per_point: output.pixels_per_point,
        }
    }
}

pub fn draw_panels(ctx: &Context, app: &mut App, stats: UiStats) {
    egui::Window::new("Camera")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| camera_panel(ui, app));
    egui::Window::new("Lights")
        .default_pos([10.0, 330.0])
        .default_open(false)
        .show(ctx, |ui| lights_panel(ui, &mut app.lights, &mut app.settings.animate_lights));
    egui::Window::new("Render")
        .default_pos([300.0, 10.0])
        .show(ctx, |ui| render_panel(ui, &mut app.settings, stats));
}

pub fn camera_panel(ui: &mut Ui, app: &mut App) {
    let camera = &mut app.camera;
    edit_vec3(ui, "Position", &mut camera.position, 0.05);

    let (mut yaw, mut pitch) = (camera.yaw(), camera.pitch());
    let yaw_changed = ui
        .add(Slider::new(&mut yaw, -180.0..=180.0).text("Yaw"))
        .changed();
    let pitch_changed = ui
        .add(Slider::new(&mut pitch, -PITCH_LIMIT..=PITCH_LIMIT).text("Pitch"))
        .changed();
    if yaw_changed || pitch_changed {
        camera.set_orientation(yaw, pitch);
    }

    let mut fov = camera.fov();
    if ui
        .add(Slider::new(&mut fov, MIN_FOV..=MAX_FOV).text("FOV"))
        .changed()
    {
        camera.set_fov(fov);
    }
    ui.add(
        Slider::new(&mut camera.orthographic_factor, MIN_ORTHOGRAPHIC_FACTOR..=20.0)
            .text("Ortho factor"),
    );
    speed_controls(ui, camera);

    let mut projection = camera.projection;
    ui.horizontal(|ui| {
        ui.radio_value(&mut projection, Projection::Perspective, "Perspective");
        ui.radio_value(&mut projection, Projection::Orthographic, "Orthographic");
    });
    app.set_projection(projection);

    let mut duration = app.blend.duration();
    if ui
        .add(Slider::new(&mut duration, 0.0..=3.0).text("Blend seconds"))
        .changed()
    {
        app.blend.set_duration(duration);
    }
    ui.label(format!("Blend progress: {:.2}", app.blend.progress()));
}

fn speed_controls(ui: &mut Ui, camera: &mut Camera) {
    ui.add(Slider::new(&mut camera.movement_speed, 0.1..=50.0).text("Speed"));
    ui.add(Slider::new(&mut camera.mouse_sensitivity, 0.1..=50.0).text("Look sensitivity"));
    ui.add(Slider::new(&mut camera.drag_sensitivity, 0.1..=20.0).text("Drag sensitivity"));
}

pub fn lights_panel(ui: &mut Ui, lights: &mut Lights, animate: &mut bool) {
    ui.checkbox(&mut lights.flashlight, "Flashlight follows camera (F)");
    ui.checkbox(animate, "Animate first point light (L)");

    CollapsingHeader::new("Directional")
        .default_open(true)
        .show(ui, |ui| directional_controls(ui, &mut lights.directional));
    ui.label(format!(
        "Point lights: {}/{} enabled",
        lights.enabled_point_count(),
        lights.points.len()
    ));
    for (index, light) in lights.points.iter_mut().enumerate() {
        CollapsingHeader::new(format!("Point {index}"))
            .show(ui, |ui| point_controls(ui, light));
    }
    CollapsingHeader::new("Spot").show(ui, |ui| spot_controls(ui, &mut lights.spot));
}

fn directional_controls(ui: &mut Ui, light: &mut DirectionalLight) {
    toggles(ui, &mut light.enabled, &mut light.visible);
    let mut direction = light.direction;
    if edit_vec3(ui, "Direction", &mut direction, 0.01) {
        if let Some(direction) = direction.try_normalize() {
            light.direction = direction;
        }
    }
    edit_color(ui, "Ambient", &mut light.ambient);
    edit_color(ui, "Diffuse", &mut light.diffuse);
    edit_color(ui, "Specular", &mut light.specular);
}

fn point_controls(ui: &mut Ui, light: &mut PointLight) {
    toggles(ui, &mut light.enabled, &mut light.visible);
    edit_vec3(ui, "Position", &mut light.position, 0.05);
    attenuation(ui, &mut light.constant, &mut light.linear, &mut light.quadratic);
    edit_color(ui, "Ambient", &mut light.ambient);
    edit_color(ui, "Diffuse", &mut light.diffuse);
    edit_color(ui, "Specular", &mut light.specular);
}

fn spot_controls(ui: &mut Ui, light: &mut SpotLight) {
    toggles(ui, &mut light.enabled, &mut light.visible);
    edit_vec3(ui, "Position", &mut light.position, 0.05);
    let mut direction = light.direction;
    if edit_vec3(ui, "Direction", &mut direction, 0.01) {
        if let Some(direction) = direction.try_normalize() {
            light.direction = direction;
        }
    }
    let mut inner = light.inner_cut_off_degrees();
    let mut outer = light.outer_cut_off_degrees();
    let inner_changed = ui
        .add(Slider::new(&mut inner, 0.0..=90.0).text("Inner cut-off"))
        .changed();
    let outer_changed = ui
        .add(Slider::new(&mut outer, 0.0..=90.0).text("Outer cut-off"))
        .changed();
    if inner_changed || outer_changed {
        light.set_cut_off_degrees(inner, outer);
    }
    attenuation(ui, &mut light.constant, &mut light.linear, &mut light.quadratic);
    edit_color(ui, "Ambient", &mut light.ambient);
    edit_color(ui, "Diffuse", &mut light.diffuse);
    edit_color(ui, "Specular", &mut light.specular);
}

pub fn render_panel(ui: &mut Ui, settings: &mut RenderSettings, stats: UiStats) {
    ui.label(format!("{:.1} FPS", stats.fps));
    ui.add_enabled(
        stats.wireframe_supported,
        egui::Checkbox::new(&mut settings.wireframe, "Wireframe (Z)"),
    );
    ui.checkbox(&mut settings.show_grid, "Grid (G)");
    ui.checkbox(&mut settings.show_gizmo, "Axis gizmo");
    ui.checkbox(&mut settings.show_light_markers, "Light markers");
    let mut clear = settings.clear_color;
    if edit_color(ui, "Clear colour", &mut clear) {
        settings.clear_color = clear.clamp(Vec3::ZERO, Vec3::ONE);
    }
}

fn toggles(ui: &mut Ui, enabled: &mut bool, visible: &mut bool) {
    ui.horizontal(|ui| {
        ui.checkbox(enabled, "Enabled");
        ui.checkbox(visible, "Visible");
    });
}

fn attenuation(ui: &mut Ui, constant: &mut f32, linear: &mut f32, quadratic: &mut f32) {
    ui.horizontal(|ui| {
        ui.label("Attenuation");
        ui.add(DragValue::new(constant).speed(0.01).clamp_range(0.0..=10.0));
        ui.add(DragValue::new(linear).speed(0.001).clamp_range(0.0..=1.0));
        ui.add(DragValue::new(quadratic).speed(0.001).clamp_range(0.0..=2.0));
    });
}

fn edit_vec3(ui: &mut Ui, label: &str, value: &mut Vec3, speed: f64) -> bool {
    ui.horizontal(|ui| {
        ui.label(label);
        let x = ui.add(DragValue::new(&mut value.x).speed(speed)).changed();
        let y = ui.add(DragValue::new(&mut value.y).speed(speed)).changed();
        let z = ui.add(DragValue::new(&mut value.z).speed(speed)).changed();
        x || y || z
    })
    .inner
}

fn edit_color(ui: &mut Ui, label: &str, color: &mut Vec3) -> bool {
    ui.horizontal(|ui| {
        let mut rgb = color.to_array();
        let changed = ui.color_edit_button_rgb(&mut rgb).changed();
        ui.label(label);
        if changed {
            *color = Vec3::from_array(rgb);
        }
        changed
    })
    .inner
}
