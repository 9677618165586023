//! Cubic B-spline drawn without any vertex data.
//!
//! The vertex shader evaluates the curve from `gl_VertexID`: each of the 7 segments is split
//! into `lod` pieces and the draw requests one vertex per piece boundary.
//!
//! Press `Up`/`Down` to change the level of detail.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use crate::abs::{App, Mesh, ShaderProgram, Viewport};
use crate::config::{DemoConfig, WindowConfig};
use crate::error::Result;
use crate::frame::{FrameHandler, Spin};
use crate::input::KeyEvent;
use crate::shader_program;

pub const TITLE: &str = "No vertices cubic B-splines shader demo";

/// Curve segments of the spline: its 10 control points minus the cubic degree.
pub const SEGMENTS: i32 = 7;
pub const DEFAULT_LOD: i32 = 10;

const FOV_Y_DEGREES: f32 = 45.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;
const EYE: Vec3 = Vec3::new(0.0, 6.0, 10.0);
const TARGET: Vec3 = Vec3::new(0.0, 1.0, 0.0);
const SPIN_DEGREES_PER_SECOND: f32 = 20.0;

/// Default configuration for this demo.
pub fn config() -> DemoConfig {
    DemoConfig::new(WindowConfig::new(TITLE, 1024, 768))
}

/// Number of vertices drawn for a given level of detail.
pub fn vertex_count(lod: i32) -> i32 {
    lod * SEGMENTS + 1
}

/// Mutable state of the demo.
#[derive(Debug)]
pub struct BSplineScene {
    lod: i32,
    spin: Spin,
    transform: Mat4,
}

impl Default for BSplineScene {
    fn default() -> Self {
        Self {
            lod: DEFAULT_LOD,
            spin: Spin::default(),
            transform: Mat4::IDENTITY,
        }
    }
}

impl BSplineScene {
    pub fn lod(&self) -> i32 {
        self.lod
    }

    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    pub fn vertex_count(&self) -> i32 {
        vertex_count(self.lod)
    }

    pub fn increase_lod(&mut self) {
        self.lod += 1;
        log::info!("Increased LOD to {}", self.lod);
    }

    /// Lowers the level of detail, never below 1.
    pub fn decrease_lod(&mut self) {
        self.lod = (self.lod - 1).max(1);
        log::info!("Decreased LOD to {}", self.lod);
    }

    pub fn handle_key(&mut self, event: KeyEvent) {
        match event.released() {
            Some(Keycode::Up) => self.increase_lod(),
            Some(Keycode::Down) => self.decrease_lod(),
            _ => {}
        }
    }

    /// Advances the spin by `delta` seconds and rebuilds the transform.
    pub fn update(&mut self, delta: f32, viewport: Viewport) {
        self.spin.advance(delta);
        let proj = Mat4::perspective_rh_gl(
            FOV_Y_DEGREES.to_radians(),
            viewport.aspect_ratio(),
            Z_NEAR,
            Z_FAR,
        );
        let view = Mat4::look_at_rh(EYE, TARGET, Vec3::Y);
        let spin = Mat4::from_rotation_y(self.rotation());
        self.transform = proj * view * spin;
    }

    /// Current spin angle in radians.
    pub fn rotation(&self) -> f32 {
        self.spin.angle(SPIN_DEGREES_PER_SECOND.to_radians())
    }
}

/// GPU resources and state of the B-spline demo.
pub struct BSplineDemo {
    program: ShaderProgram,
    curve: Mesh,
    scene: BSplineScene,
}

impl BSplineDemo {
    pub fn new(app: &App, _config: &DemoConfig) -> Result<Self> {
        app.caps.require(3, 0, "gl_VertexID and integer uniforms")?;

        let gl = Arc::clone(&app.gl);

        unsafe {
            gl.clear_color(1.0, 1.0, 1.0, 1.0);
            gl.polygon_mode(glow::FRONT_AND_BACK, glow::LINE);
        }

        let program = shader_program!(gl, "bspline", ["transform", "lod"]);
        let curve = Mesh::attributeless(&gl, glow::LINE_STRIP)?;

        log::info!("Press 'arrow up' to increase the lod");
        log::info!("Press 'arrow down' to decrease the lod");

        Ok(Self {
            program,
            curve,
            scene: BSplineScene::default(),
        })
    }
}

impl FrameHandler for BSplineDemo {
    fn on_key(&mut self, event: KeyEvent) {
        self.scene.handle_key(event);
    }

    fn update(&mut self, delta: f32, viewport: Viewport) {
        self.scene.update(delta, viewport);
    }

    fn render(&mut self, gl: &glow::Context) {
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT);
        }

        self.program.use_program();
        self.program.set_uniform("transform", self.scene.transform());
        self.program.set_uniform("lod", self.scene.lod());
        self.curve.draw_count(self.scene.vertex_count());

        unsafe {
            gl.use_program(None);
        }
    }
}
