//! Phong lighting playground: a free-fly camera, three kinds of light and an
//! eased switch between perspective and orthographic projection.
//!
//! Everything except [`render`] and [`ui`] is plain data and math, so the
//! camera, light and projection logic can be exercised without a GPU or a
//! window.

pub mod app;
pub mod camera;
pub mod config;
pub mod controls;
pub mod input;
pub mod light;
pub mod mesh;
pub mod obj;
pub mod projection;
pub mod render;
pub mod scene;
pub mod texture;
pub mod ui;

pub use app::{write_summary, App, FrameClock, FrameData, RenderSettings};
pub use camera::{Camera, CameraMovement, Projection};
pub use config::CliOptions;
pub use controls::{Controls, FrameActions, InputFocus};
pub use input::{InputState, KeyCode, MouseButton, NamedKey};
pub use light::{DirectionalLight, Lights, PointLight, SpotLight, MAX_POINT_LIGHTS};
pub use mesh::{MeshData, Vertex};
pub use obj::{load_obj, load_obj_from_str};
pub use projection::{ease, lerp_projection_matrices, ProjectionBlend};
pub use render::Renderer;
pub use scene::{MeshSource, Scene, SceneObject};
pub use texture::{TextureData, TextureError};
pub use ui::{DebugUi, GuiFrame, UiStats};
