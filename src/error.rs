//! Error type shared by both demos.
//!
//! Every variant is an initialization failure. Optional GL features that are
//! missing are not errors; they are logged as warnings where they are probed.

use std::path::PathBuf;

use crate::abs::{FaceFormat, ShaderStage};
use crate::application::Lifecycle;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DemoError>;

#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("windowing system unavailable: {0}")]
    Windowing(String),

    #[error("failed to create the window: {0}")]
    WindowCreation(String),

    #[error("failed to create the OpenGL context: {0}")]
    Context(String),

    #[error("this demo requires {0}")]
    MissingCapability(String),

    #[error("could not compile {stage} shader:\n{log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    #[error("could not link program:\n{log}")]
    ProgramLink { log: String },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to load image {}: {reason}", .path.display())]
    ImageDecode { path: PathBuf, reason: String },

    #[error("cubemap face {face} is {found}, expected {expected} like the first face")]
    CubemapFaceMismatch {
        face: usize,
        expected: FaceFormat,
        found: FaceFormat,
    },

    #[error("cubemap face {face} is not square ({format})")]
    CubemapFaceNotSquare { face: usize, format: FaceFormat },

    #[error("failed to create {what}: {reason}")]
    GlResource { what: &'static str, reason: String },

    #[error("invalid lifecycle transition from {from:?} to {to:?}")]
    InvalidTransition { from: Lifecycle, to: Lifecycle },
}
