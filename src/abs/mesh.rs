//! Vertex array management.
//!
//! This module defines the [`Mesh`] struct, a vertex array object with an optional vertex
//! buffer. Attributeless meshes bind no buffer at all; their vertices are synthesized by the
//! vertex shader from `gl_VertexID`.

use std::sync::Arc;

use glam::Vec2;
use glow::HasContext;

use crate::error::{DemoError, Result};

/// Two triangles covering the whole of normalized device coordinates.
pub const FULLSCREEN_QUAD: [Vec2; 6] = [
    Vec2::new(-1.0, -1.0),
    Vec2::new(1.0, -1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(-1.0, 1.0),
    Vec2::new(-1.0, -1.0),
];

/// Represents a mesh stored on the GPU side.
pub struct Mesh {
    gl: Arc<glow::Context>,
    draw_mode: u32,
    vao: glow::VertexArray,
    vbo: Option<glow::Buffer>,
    vertex_count: i32,
}

impl Mesh {
    /// Creates a mesh whose attribute 0 is the given 2D positions.
    pub fn new(gl: &Arc<glow::Context>, vertices: &[Vec2], draw_mode: u32) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(|reason| DemoError::GlResource {
                what: "vertex array",
                reason,
            })?;
            let vbo = match gl.create_buffer() {
                Ok(vbo) => vbo,
                Err(reason) => {
                    gl.delete_vertex_array(vao);
                    return Err(DemoError::GlResource {
                        what: "vertex buffer",
                        reason,
                    });
                }
            };

            let data: Vec<f32> = vertices.iter().flat_map(|v| [v.x, v.y]).collect();

            gl.bind_vertex_array(Some(vao));
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                std::slice::from_raw_parts(
                    data.as_ptr() as *const u8,
                    data.len() * std::mem::size_of::<f32>(),
                ),
                glow::STATIC_DRAW,
            );
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(0, 2, glow::FLOAT, false, 0, 0);

            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                gl: Arc::clone(gl),
                draw_mode,
                vao,
                vbo: Some(vbo),
                vertex_count: vertices.len() as i32,
            })
        }
    }

    /// Creates a mesh with no vertex data.
    ///
    /// Core profiles still need a bound vertex array to draw, so this owns an empty one.
    pub fn attributeless(gl: &Arc<glow::Context>, draw_mode: u32) -> Result<Self> {
        unsafe {
            let vao = gl.create_vertex_array().map_err(|reason| DemoError::GlResource {
                what: "vertex array",
                reason,
            })?;
            Ok(Self {
                gl: Arc::clone(gl),
                draw_mode,
                vao,
                vbo: None,
                vertex_count: 0,
            })
        }
    }

    /// Draws every vertex stored in the mesh.
    pub fn draw(&self) {
        self.draw_count(self.vertex_count);
    }

    /// Draws `count` vertices, whether or not they are backed by a buffer.
    pub fn draw_count(&self, count: i32) {
        unsafe {
            self.gl.bind_vertex_array(Some(self.vao));
            self.gl.draw_arrays(self.draw_mode, 0, count);
            self.gl.bind_vertex_array(None);
        }
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            if let Some(vbo) = self.vbo {
                self.gl.delete_buffer(vbo);
            }
            self.gl.delete_vertex_array(self.vao);
        }
    }
}
