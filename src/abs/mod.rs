//! This module contains the core components shared by the demos,
//! including window and context setup, capability detection, shader management,
//! vertex arrays and cubemap textures.

pub mod app;
pub mod caps;
pub mod mesh;
pub mod shader;
pub mod texture;

pub use app::*;
pub use caps::*;
pub use mesh::*;
pub use shader::*;
pub use texture::*;
