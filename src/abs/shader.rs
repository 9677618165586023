//! OpenGL Shaders
//!
//! This module defines the [`Shader`] and [`ShaderProgram`] structs for managing OpenGL shaders.
//! Uniform locations are resolved once after linking and kept in [`UniformSlots`]; the
//! [`Uniform`] trait uploads values to a resolved slot.

use std::{collections::HashMap, fmt, sync::Arc};

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::error::{DemoError, Result};

/// A programmable pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => f.write_str("vertex"),
            ShaderStage::Fragment => f.write_str("fragment"),
        }
    }
}

/// Represents an individual OpenGL shader.
pub struct Shader {
    gl: Arc<glow::Context>,
    id: glow::Shader,
}

impl Shader {
    /// Compiles a new shader from the given source code.
    ///
    /// A non-empty info log is logged as a warning even when compilation succeeds.
    pub fn new(gl: &Arc<glow::Context>, stage: ShaderStage, source: &str) -> Result<Self> {
        unsafe {
            let shader = gl
                .create_shader(stage.gl_enum())
                .map_err(|reason| DemoError::GlResource {
                    what: "shader",
                    reason,
                })?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            let log = gl.get_shader_info_log(shader);
            if !gl.get_shader_compile_status(shader) {
                gl.delete_shader(shader);
                return Err(DemoError::ShaderCompile { stage, log });
            }
            if !log.trim().is_empty() {
                log::warn!("{stage} shader compiled with diagnostics:\n{}", log.trim_end());
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: shader,
            })
        }
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_shader(self.id);
        }
    }
}

/// Represents a value that can be uploaded to a uniform slot.
pub trait Uniform {
    /// Uploads the value to the given location of the currently bound program.
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation);
}

impl Uniform for f32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_1_f32(Some(location), *self);
        }
    }
}

impl Uniform for i32 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_1_i32(Some(location), *self);
        }
    }
}

impl Uniform for Vec3 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_3_f32(Some(location), self.x, self.y, self.z);
        }
    }
}

impl Uniform for Mat4 {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        unsafe {
            gl.uniform_matrix_4_f32_slice(Some(location), false, self.as_ref());
        }
    }
}

impl<T: Uniform> Uniform for &T {
    fn upload(&self, gl: &glow::Context, location: &glow::UniformLocation) {
        (*self).upload(gl, location);
    }
}

/// Uniform name to location mapping of a linked program.
///
/// A name the program does not use resolves to `None`. Looking up such a name, or one that
/// was never resolved, yields no slot and uploads are skipped.
#[derive(Debug, Default)]
pub struct UniformSlots {
    slots: HashMap<&'static str, Option<glow::UniformLocation>>,
}

impl UniformSlots {
    /// Records the resolved location for `name`.
    pub fn insert(&mut self, name: &'static str, location: Option<glow::UniformLocation>) {
        self.slots.insert(name, location);
    }

    /// Returns the location for `name`, if it was resolved to a valid slot.
    pub fn get(&self, name: &str) -> Option<&glow::UniformLocation> {
        self.slots.get(name).and_then(Option::as_ref)
    }

    /// Returns whether `name` was requested at link time, valid or not.
    #[cfg(test)]
    fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }
}

/// Represents an OpenGL shader program composed of multiple shaders.
pub struct ShaderProgram {
    gl: Arc<glow::Context>,
    id: glow::Program,
    slots: UniformSlots,
}

impl ShaderProgram {
    /// Links a new shader program from the given shaders and resolves the given uniforms.
    pub fn new(
        gl: &Arc<glow::Context>,
        shaders: &[&Shader],
        uniforms: &[&'static str],
    ) -> Result<Self> {
        unsafe {
            let program = gl
                .create_program()
                .map_err(|reason| DemoError::GlResource {
                    what: "program",
                    reason,
                })?;

            for shader in shaders {
                gl.attach_shader(program, shader.id);
            }

            gl.link_program(program);

            let log = gl.get_program_info_log(program);
            if !gl.get_program_link_status(program) {
                gl.delete_program(program);
                return Err(DemoError::ProgramLink { log });
            }
            if !log.trim().is_empty() {
                log::warn!("program linked with diagnostics:\n{}", log.trim_end());
            }

            for shader in shaders {
                gl.detach_shader(program, shader.id);
            }

            let mut slots = UniformSlots::default();
            for &name in uniforms {
                let location = gl.get_uniform_location(program, name);
                if location.is_none() {
                    log::debug!("uniform `{name}` is not used by the program");
                }
                slots.insert(name, location);
            }

            Ok(Self {
                gl: Arc::clone(gl),
                id: program,
                slots,
            })
        }
    }

    /// Binds the shader program for use.
    pub fn use_program(&self) {
        unsafe {
            self.gl.use_program(Some(self.id));
        }
    }

    /// Sets the sampler uniform `name` to the given texture unit.
    ///
    /// Sampler bindings are program state, so this only needs to happen once after linking.
    pub fn bind_sampler(&self, name: &str, unit: i32) {
        unsafe {
            self.gl.use_program(Some(self.id));
            if let Some(location) = self.gl.get_uniform_location(self.id, name) {
                self.gl.uniform_1_i32(Some(&location), unit);
            }
            self.gl.use_program(None);
        }
    }

    /// Sets a uniform of the bound program through its resolved slot.
    pub fn set_uniform<T: Uniform>(&self, name: &str, value: T) {
        if let Some(location) = self.slots.get(name) {
            value.upload(&self.gl, location);
        }
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_program(self.id);
        }
    }
}

/// Compiles the vertex and fragment shaders bundled under `src/shaders/<name>/` and links
/// them into a [`ShaderProgram`] resolving the listed uniforms.
#[macro_export]
macro_rules! shader_program {
    ($gl:expr, $name:literal, [$($uniform:literal),* $(,)?]) => {{
        let vert = $crate::abs::Shader::new(
            &$gl,
            $crate::abs::ShaderStage::Vertex,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/shaders/", $name, "/vert.glsl")),
        )?;
        let frag = $crate::abs::Shader::new(
            &$gl,
            $crate::abs::ShaderStage::Fragment,
            include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/src/shaders/", $name, "/frag.glsl")),
        )?;
        $crate::abs::ShaderProgram::new(&$gl, &[&vert, &frag], &[$($uniform),*])?
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_slots_sentinel() {
        let mut slots = UniformSlots::default();
        slots.insert("transform", Some(glow::NativeUniformLocation(0)));
        slots.insert("lod", None);

        assert_eq!(slots.get("transform"), Some(&glow::NativeUniformLocation(0)));
        assert!(slots.contains("lod"));
        assert_eq!(slots.get("lod"), None);
        assert!(!slots.contains("debug"));
        assert_eq!(slots.get("debug"), None);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(ShaderStage::Vertex.to_string(), "vertex");
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
    }
}
