//! Context capability detection.
//!
//! Optional features are probed here and degrade to a warning when absent. Only
//! [`Capabilities::require`] turns a missing feature into an error.

use std::collections::HashSet;

use glow::HasContext;

use crate::error::{DemoError, Result};

/// The version and extension set advertised by the current context.
#[derive(Debug, Clone)]
pub struct Capabilities {
    major: u32,
    minor: u32,
    extensions: HashSet<String>,
}

impl Capabilities {
    /// Creates a capability set from a version and the advertised extension names.
    pub fn new(major: u32, minor: u32, extensions: HashSet<String>) -> Self {
        Self {
            major,
            minor,
            extensions,
        }
    }

    /// Reads the capabilities of the current context.
    pub fn detect(gl: &glow::Context) -> Self {
        let version = gl.version();
        Self::new(
            version.major,
            version.minor,
            gl.supported_extensions().clone(),
        )
    }

    /// Returns whether the context version is at least `major.minor`.
    pub fn at_least(&self, major: u32, minor: u32) -> bool {
        (self.major, self.minor) >= (major, minor)
    }

    /// Returns whether the named extension is advertised.
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// Fails unless the context version is at least `major.minor`.
    pub fn require(&self, major: u32, minor: u32, what: &str) -> Result<()> {
        if self.at_least(major, minor) {
            Ok(())
        } else {
            Err(DemoError::MissingCapability(format!(
                "{what} (OpenGL {major}.{minor}, got {}.{})",
                self.major, self.minor
            )))
        }
    }

    pub fn anisotropic_filtering(&self) -> bool {
        self.at_least(4, 6)
            || self.has_extension("GL_EXT_texture_filter_anisotropic")
            || self.has_extension("GL_ARB_texture_filter_anisotropic")
    }

    pub fn mipmap_generation(&self) -> bool {
        self.at_least(3, 0) || self.has_extension("GL_ARB_framebuffer_object")
    }

    pub fn seamless_cubemap(&self) -> bool {
        self.at_least(3, 2) || self.has_extension("GL_ARB_seamless_cube_map")
    }

    pub fn debug_output(&self) -> bool {
        self.at_least(4, 3) || self.has_extension("GL_KHR_debug")
    }
}
