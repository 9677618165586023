//! Cubemap sky with a black hole rendered on a projected billboard quad.
//!
//! The background program draws a full-screen quad that samples the cubemap along each view
//! ray. The black-hole program draws a quad that only covers the black hole's circle of
//! influence and bends the view rays passing through it.
//!
//! Press `D` to toggle the debug visualization.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use glow::HasContext;
use sdl2::keyboard::Keycode;

use crate::abs::{App, Cubemap, CubemapSource, FULLSCREEN_QUAD, Mesh, ShaderProgram, Viewport};
use crate::config::{DemoConfig, WindowConfig};
use crate::error::Result;
use crate::frame::{FrameHandler, Spin};
use crate::input::KeyEvent;
use crate::shader_program;

pub const TITLE: &str = "Cubemap texture sampling with projected quad";

const FOV_Y_DEGREES: f32 = 60.0;
const Z_NEAR: f32 = 0.01;
const Z_FAR: f32 = 100.0;
const EYE: Vec3 = Vec3::new(0.0, 5.0, 10.0);
/// Camera orbit speed in radians per second.
const ORBIT_RATE: f32 = 0.1;
const RATE_X: f32 = 0.23;
const RATE_Z: f32 = -0.562;

/// Default configuration for this demo.
pub fn config() -> DemoConfig {
    let mut window = WindowConfig::new(TITLE, 1024, 768);
    window.vsync = false;
    DemoConfig::new(window)
}

/// Camera matrices derived for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub view_proj: Mat4,
    pub inv_view_proj: Mat4,
    /// World-space point the view matrix maps to the origin.
    pub position: Vec3,
}

impl Camera {
    pub fn orbit(rot: f32, aspect_ratio: f32) -> Self {
        let proj = Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect_ratio, Z_NEAR, Z_FAR);
        let view = Mat4::look_at_rh(EYE, Vec3::ZERO, Vec3::Y)
            * Mat4::from_rotation_y(rot)
            * Mat4::from_rotation_x(rot * RATE_X)
            * Mat4::from_rotation_z(rot * RATE_Z);
        let view_proj = proj * view;
        Self {
            view_proj,
            inv_view_proj: view_proj.inverse(),
            position: view.inverse().transform_point3(Vec3::ZERO),
        }
    }
}

/// Mutable state of the demo.
#[derive(Debug)]
pub struct BlackholeScene {
    pub blackhole_position: Vec3,
    pub blackhole_size: f32,
    pub debug: bool,
    spin: Spin,
    camera: Camera,
}

impl Default for BlackholeScene {
    fn default() -> Self {
        Self {
            blackhole_position: Vec3::new(1.0, 2.0, 0.0),
            blackhole_size: 5.0,
            debug: false,
            spin: Spin::default(),
            camera: Camera::orbit(0.0, 1.0),
        }
    }
}

impl BlackholeScene {
    pub fn handle_key(&mut self, event: KeyEvent) {
        if event.released() == Some(Keycode::D) {
            self.debug = !self.debug;
            log::info!("blackhole debug view {}", if self.debug { "on" } else { "off" });
        }
    }

    /// Derives this frame's camera from the current orbit angle, then advances the orbit.
    pub fn update(&mut self, delta: f32, viewport: Viewport) {
        self.camera = Camera::orbit(self.rotation(), viewport.aspect_ratio());
        self.spin.advance(delta);
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Current orbit angle in radians.
    pub fn rotation(&self) -> f32 {
        self.spin.angle(ORBIT_RATE)
    }
}

/// GPU resources and state of the black-hole demo.
pub struct BlackholeDemo {
    background: ShaderProgram,
    blackhole: ShaderProgram,
    sky: Cubemap,
    quad: Mesh,
    scene: BlackholeScene,
}

impl BlackholeDemo {
    pub fn new(app: &App, config: &DemoConfig) -> Result<Self> {
        app.caps.require(2, 0, "shader objects")?;
        app.caps.require(1, 3, "cube map textures")?;

        let gl = Arc::clone(&app.gl);

        let source = CubemapSource::new(&config.assets_dir, "space_", "jpg");
        let sky = Cubemap::load(&gl, &app.caps, &source)?;
        log::info!("loaded cubemap with {0}x{0} faces", sky.size());

        let quad = Mesh::new(&gl, &FULLSCREEN_QUAD, glow::TRIANGLES)?;

        let background = shader_program!(gl, "cubemap_back", ["invViewProj", "cameraPosition"]);
        background.bind_sampler("tex", 0);

        let blackhole = shader_program!(
            gl,
            "cubemap_blackhole",
            [
                "invViewProj",
                "viewProj",
                "cameraPosition",
                "blackholePosition",
                "blackholeSize",
                "debug",
            ]
        );
        blackhole.bind_sampler("tex", 0);

        log::info!("Press 'D' to debug the blackhole rendering.");

        Ok(Self {
            background,
            blackhole,
            sky,
            quad,
            scene: BlackholeScene::default(),
        })
    }

    fn upload_uniforms(&self) {
        let camera = self.scene.camera();

        self.background.use_program();
        self.background.set_uniform("invViewProj", camera.inv_view_proj);
        self.background.set_uniform("cameraPosition", camera.position);

        self.blackhole.use_program();
        self.blackhole.set_uniform("invViewProj", camera.inv_view_proj);
        self.blackhole.set_uniform("viewProj", camera.view_proj);
        self.blackhole.set_uniform("cameraPosition", camera.position);
        self.blackhole
            .set_uniform("blackholePosition", self.scene.blackhole_position);
        self.blackhole
            .set_uniform("blackholeSize", self.scene.blackhole_size);
        self.blackhole
            .set_uniform("debug", if self.scene.debug { 1.0f32 } else { 0.0 });
    }
}

impl FrameHandler for BlackholeDemo {
    fn on_key(&mut self, event: KeyEvent) {
        self.scene.handle_key(event);
    }

    fn update(&mut self, delta: f32, viewport: Viewport) {
        self.scene.update(delta, viewport);
        self.upload_uniforms();
    }

    fn render(&mut self, gl: &glow::Context) {
        self.sky.bind(0);

        self.background.use_program();
        self.quad.draw();

        self.blackhole.use_program();
        self.quad.draw();

        unsafe {
            gl.use_program(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::KeyAction;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_camera_at_rest_sits_at_eye() {
        let camera = Camera::orbit(0.0, 4.0 / 3.0);
        assert!(approx(camera.position, EYE));
    }

    #[test]
    fn test_inverse_view_projection() {
        let camera = Camera::orbit(1.3, 16.0 / 9.0);
        let identity = camera.view_proj * camera.inv_view_proj;
        assert!(identity.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn test_orbit_keeps_distance_to_origin() {
        let distance = EYE.length();
        for rot in [0.5, 2.0, 7.25] {
            let camera = Camera::orbit(rot, 1.0);
            assert!((camera.position.length() - distance).abs() < 1e-3);
            assert!(!approx(camera.position, EYE));
        }
    }

    #[test]
    fn test_debug_toggle_edge_triggered() {
        let mut scene = BlackholeScene::default();
        scene.handle_key(KeyEvent::new(Keycode::D, KeyAction::Press));
        for _ in 0..10 {
            scene.handle_key(KeyEvent::new(Keycode::D, KeyAction::Repeat));
        }
        assert!(!scene.debug);
        scene.handle_key(KeyEvent::new(Keycode::D, KeyAction::Release));
        assert!(scene.debug);
        scene.handle_key(KeyEvent::new(Keycode::D, KeyAction::Press));
        scene.handle_key(KeyEvent::new(Keycode::D, KeyAction::Release));
        assert!(!scene.debug);
    }

    #[test]
    fn test_other_keys_do_not_toggle() {
        let mut scene = BlackholeScene::default();
        scene.handle_key(KeyEvent::new(Keycode::E, KeyAction::Release));
        assert!(!scene.debug);
    }

    #[test]
    fn test_update_uses_angle_before_advancing() {
        let mut scene = BlackholeScene::default();
        let viewport = Viewport::new(1024, 768);
        scene.update(2.0, viewport);
        assert!(approx(scene.camera().position, EYE));
        assert!((scene.rotation() - 0.2).abs() < 1e-6);

        scene.update(1.0, viewport);
        assert_eq!(*scene.camera(), Camera::orbit(0.2, viewport.aspect_ratio()));
        assert!((scene.rotation() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_defaults() {
        let scene = BlackholeScene::default();
        assert_eq!(scene.blackhole_position, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.blackhole_size, 5.0);
        assert!(!config().window.vsync);
    }
}
