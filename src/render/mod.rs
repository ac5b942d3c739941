pub mod common;
mod native;
mod shader;

pub use common::{GlobalUniform, LineUniform, ObjectUniform};
pub use native::Renderer;
