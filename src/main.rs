use std::any::Any;
use std::fmt;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use glam::Vec2;
use log::{info, warn};
use pollster::block_on;
use thiserror::Error;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::{KeyCode as WinitKey, PhysicalKey};
use winit::platform::run_on_demand::EventLoopExtRunOnDemand;
use winit::window::WindowBuilder;

use phong_lab::{
    write_summary, App, CliOptions, DebugUi, FrameClock, InputState, KeyCode, MouseButton,
    NamedKey, Renderer, Scene, UiStats,
};

/// Scroll distance in pixels treated as one wheel notch.
const PIXELS_PER_LINE: f32 = 20.0;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let scene = match &options.scene {
        Some(path) => Scene::load(path)?,
        None => {
            info!("No scene file given; using the built-in demo scene");
            Scene::demo()
        }
    };

    if options.summary_only {
        return run_headless(&scene);
    }
    match run_interactive(&options, scene.clone()) {
        Ok(()) => Ok(()),
        Err(err) if err.downcast_ref::<WindowInitError>().is_some() => {
            eprintln!(
                "{err}. Falling back to --summary-only mode (set DISPLAY or install a GPU driver to enable rendering)."
            );
            run_headless(&scene)
        }
        Err(err) => Err(err),
    }
}

fn run_headless(scene: &Scene) -> Result<()> {
    let stdout = io::stdout();
    write_summary(&mut stdout.lock(), scene).context("failed to write scene summary")
}

fn run_interactive(options: &CliOptions, scene: Scene) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop = event_loop
        .map_err(|panic| WindowInitError::from_panic("event loop", panic))?
        .map_err(|err| WindowInitError::from_error("event loop", err))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Phong Lab")
            .with_inner_size(PhysicalSize::new(options.width, options.height))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window), options.vsync))
        .map_err(|err| WindowInitError::from_error("renderer", format!("{err:#}")))?;
    let ui = DebugUi::new(&window);

    println!(
        "Loaded scene with {} objects ({} point lights)",
        scene.objects.len(),
        scene.lights.points.len()
    );
    let mut state = AppState {
        renderer,
        ui,
        app: App::new(scene),
        input: InputState::new(),
        clock: FrameClock::new(),
        frame_limit: options.frames,
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop
        .run_on_demand(|event, target| {
            target.set_control_flow(ControlFlow::Poll);
            if let Err(err) = state.process_event(event, target) {
                state.last_error = Some(err);
                target.exit();
            }
        })
        .map_err(|err| anyhow!("event loop terminated abnormally: {err}"))?;

    state.shutdown();

    if let Some(err) = state.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    ui: DebugUi,
    app: App,
    input: InputState,
    clock: FrameClock,
    frame_limit: Option<u64>,
    last_error: Option<anyhow::Error>,
}

#[derive(Debug, Error)]
#[error("failed to initialize {stage}: {message}")]
struct WindowInitError {
    stage: &'static str,
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &'static str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            stage,
            message: panic_message(panic),
        }
    }

    fn from_error(stage: &'static str, err: impl fmt::Display) -> Self {
        Self {
            stage,
            message: err.to_string(),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

impl AppState {
    fn process_event(&mut self, event: Event<()>, target: &EventLoopWindowTarget<()>) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if window_id == self.renderer.window_id() => {
                let consumed = self.ui.on_window_event(self.renderer.window(), &event);
                match event {
                    WindowEvent::CloseRequested => target.exit(),
                    WindowEvent::Resized(size) => self.renderer.resize(size),
                    WindowEvent::Focused(false) => self.input.release_all(),
                    WindowEvent::KeyboardInput { event, .. } => self.handle_keyboard(&event, consumed),
                    WindowEvent::MouseInput { state, button, .. } => {
                        self.handle_mouse_button(state, button, consumed);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let pos = Vec2::new(position.x as f32, position.y as f32);
                        self.input.set_mouse_position(pos);
                    }
                    WindowEvent::CursorLeft { .. } => self.input.cursor_left(),
                    WindowEvent::MouseWheel { delta, .. } if !consumed => {
                        let lines = match delta {
                            MouseScrollDelta::LineDelta(_, y) => y,
                            MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / PIXELS_PER_LINE,
                        };
                        self.input.add_scroll(lines);
                    }
                    WindowEvent::RedrawRequested => self.redraw(target)?,
                    _ => {}
                }
            }
            Event::AboutToWait => self.renderer.window().request_redraw(),
            _ => {}
        }
        Ok(())
    }

    fn redraw(&mut self, target: &EventLoopWindowTarget<()>) -> Result<()> {
        let delta_time = self.clock.tick();
        let stats = UiStats {
            fps: self.clock.fps(),
            wireframe_supported: self.renderer.supports_wireframe(),
        };
        let gui = self.ui.run(self.renderer.window(), &mut self.app, stats);
        self.app.update(delta_time, &self.input, self.ui.focus());
        self.input.end_frame();
        if self.app.quit_requested() {
            target.exit();
            return Ok(());
        }

        let frame = self.app.frame(self.renderer.aspect());
        if let Err(err) = self.renderer.render(&frame, &self.app.scene, Some(&gui)) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    warn!("Surface timeout; retrying next frame");
                }
            }
        }

        if let Some(limit) = self.frame_limit {
            if self.clock.frames() >= limit {
                info!("Rendered {limit} frames; exiting");
                target.exit();
            }
        }
        Ok(())
    }

    fn handle_keyboard(&mut self, event: &KeyEvent, consumed: bool) {
        let PhysicalKey::Code(code) = event.physical_key else {
            return;
        };
        let Some(key) = map_keycode(code) else {
            return;
        };
        match event.state {
            ElementState::Pressed if !consumed => self.input.set_key_down(key),
            ElementState::Pressed => {}
            ElementState::Released => self.input.set_key_up(key),
        }
    }

    fn handle_mouse_button(
        &mut self,
        state: ElementState,
        button: winit::event::MouseButton,
        consumed: bool,
    ) {
        use winit::event::MouseButton as Winit;
        let index = match button {
            Winit::Left => 0,
            Winit::Right => 1,
            Winit::Middle => 2,
            Winit::Back => 3,
            Winit::Forward => 4,
            Winit::Other(value) => value.min(u8::MAX as u16) as u8,
        };
        let button = MouseButton::new(index);
        match state {
            ElementState::Pressed if !consumed => self.input.set_mouse_button_down(button),
            ElementState::Pressed => {}
            ElementState::Released => self.input.set_mouse_button_up(button),
        }
    }

    fn shutdown(&self) {
        let camera = &self.app.camera;
        println!(
            "Final camera: pos=({:.2}, {:.2}, {:.2}) yaw={:.1} pitch={:.1} projection={} after {} frames",
            camera.position.x,
            camera.position.y,
            camera.position.z,
            camera.yaw(),
            camera.pitch(),
            camera.projection.label(),
            self.clock.frames()
        );
    }
}

fn map_keycode(code: WinitKey) -> Option<KeyCode> {
    Some(match code {
        WinitKey::Space => KeyCode::Named(NamedKey::Space),
        WinitKey::Enter => KeyCode::Named(NamedKey::Enter),
        WinitKey::Tab => KeyCode::Named(NamedKey::Tab),
        WinitKey::ArrowLeft => KeyCode::Named(NamedKey::Left),
        WinitKey::ArrowRight => KeyCode::Named(NamedKey::Right),
        WinitKey::ArrowUp => KeyCode::Named(NamedKey::Up),
        WinitKey::ArrowDown => KeyCode::Named(NamedKey::Down),
        WinitKey::Escape => KeyCode::Named(NamedKey::Escape),
        WinitKey::Backspace => KeyCode::Named(NamedKey::Backspace),
        WinitKey::ShiftLeft => KeyCode::Named(NamedKey::LeftShift),
        WinitKey::ShiftRight => KeyCode::Named(NamedKey::RightShift),
        WinitKey::ControlLeft => KeyCode::Named(NamedKey::LeftCtrl),
        WinitKey::ControlRight => KeyCode::Named(NamedKey::RightCtrl),
        WinitKey::AltLeft => KeyCode::Named(NamedKey::LeftAlt),
        WinitKey::AltRight => KeyCode::Named(NamedKey::RightAlt),
        WinitKey::Digit0 => KeyCode::Digit(0),
        WinitKey::Digit1 => KeyCode::Digit(1),
        WinitKey::Digit2 => KeyCode::Digit(2),
        WinitKey::Digit3 => KeyCode::Digit(3),
        WinitKey::Digit4 => KeyCode::Digit(4),
        WinitKey::Digit5 => KeyCode::Digit(5),
        WinitKey::Digit6 => KeyCode::Digit(6),
        WinitKey::Digit7 => KeyCode::Digit(7),
        WinitKey::Digit8 => KeyCode::Digit(8),
        WinitKey::Digit9 => KeyCode::Digit(9),
        WinitKey::Numpad0 => KeyCode::Keypad(0),
        WinitKey::Numpad1 => KeyCode::Keypad(1),
        WinitKey::Numpad2 => KeyCode::Keypad(2),
        WinitKey::Numpad3 => KeyCode::Keypad(3),
        WinitKey::Numpad4 => KeyCode::Keypad(4),
        WinitKey::Numpad5 => KeyCode::Keypad(5),
        WinitKey::Numpad6 => KeyCode::Keypad(6),
        WinitKey::Numpad7 => KeyCode::Keypad(7),
        WinitKey::Numpad8 => KeyCode::Keypad(8),
        WinitKey::Numpad9 => KeyCode::Keypad(9),
        WinitKey::KeyA => KeyCode::Character('A'),
        WinitKey::KeyB => KeyCode::Character('B'),
        WinitKey::KeyC => KeyCode::Character('C'),
        WinitKey::KeyD => KeyCode::Character('D'),
        WinitKey::KeyE => KeyCode::Character('E'),
        WinitKey::KeyF => KeyCode::Character('F'),
        WinitKey::KeyG => KeyCode::Character('G'),
        WinitKey::KeyH => KeyCode::Character('H'),
        WinitKey::KeyI => KeyCode::Character('I'),
        WinitKey::KeyJ => KeyCode::Character('J'),
        WinitKey::KeyK => KeyCode::Character('K'),
        WinitKey::KeyL => KeyCode::Character('L'),
        WinitKey::KeyM => KeyCode::Character('M'),
        WinitKey::KeyN => KeyCode::Character('N'),
        WinitKey::KeyO => KeyCode::Character('O'),
        WinitKey::KeyP => KeyCode::Character('P'),
        WinitKey::KeyQ => KeyCode::Character('Q'),
        WinitKey::KeyR => KeyCode::Character('R'),
        WinitKey::KeyS => KeyCode::Character('S'),
        WinitKey::KeyT => KeyCode::Character('T'),
        WinitKey::KeyU => KeyCode::Character('U'),
        WinitKey::KeyV => KeyCode::Character('V'),
        WinitKey::KeyW => KeyCode::Character('W'),
        WinitKey::KeyX => KeyCode::Character('X'),
        WinitKey::KeyY => KeyCode::Character('Y'),
        WinitKey::KeyZ => KeyCode::Character('Z'),
        WinitKey::F1 => KeyCode::Function(1),
        WinitKey::F2 => KeyCode::Function(2),
        WinitKey::F3 => KeyCode::Function(3),
        WinitKey::F4 => KeyCode::Function(4),
        WinitKey::F5 => KeyCode::Function(5),
        WinitKey::F6 => KeyCode::Function(6),
        WinitKey::F7 => KeyCode::Function(7),
        WinitKey::F8 => KeyCode::Function(8),
        WinitKey::F9 => KeyCode::Function(9),
        WinitKey::F10 => KeyCode::Function(10),
        WinitKey::F11 => KeyCode::Function(11),
        WinitKey::F12 => KeyCode::Function(12),
        _ => return None,
    })
}
