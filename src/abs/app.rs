//! SDL2 and OpenGL application management.
//!
//! This module defines the [`App`] struct which encapsulates the SDL2
//! and OpenGL context necessary for creating a windowed application,
//! and the [`Viewport`] tracking the framebuffer size.

use std::sync::{Arc, mpsc};

use glow::HasContext;
use sdl2::video::{GLProfile, SwapInterval, WindowPos};

use crate::abs::Capabilities;
use crate::config::WindowConfig;
use crate::error::{DemoError, Result};

/// Framebuffer size in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Applies a resize event.
    ///
    /// Non-positive sizes (a minimized window) and the current size are ignored. Returns
    /// whether the stored size changed.
    pub fn resize(&mut self, width: i32, height: i32) -> bool {
        if width <= 0 || height <= 0 || (width == self.width && height == self.height) {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }
}

/// A message reported by the driver through the GL debug output.
#[derive(Clone, Debug)]
pub struct GlMessage {
    pub source: u32,
    pub kind: u32,
    pub id: u32,
    pub severity: u32,
    pub text: String,
}

/// The [`App`] struct encapsulates the SDL2 and OpenGL context.
///
/// Fields are declared in reverse acquisition order so they are released in that order.
pub struct App {
    pub event_pump: sdl2::EventPump,
    pub gl: Arc<glow::Context>,
    pub caps: Capabilities,
    gl_messages: Option<mpsc::Receiver<GlMessage>>,
    pub gl_context: sdl2::video::GLContext,
    pub window: sdl2::video::Window,
    pub video_subsystem: sdl2::VideoSubsystem,
    pub sdl: sdl2::Sdl,
    viewport: Viewport,
    should_close: bool,
}

impl App {
    /// Creates a new [`App`]: a hidden resizable window centered on the primary display, with
    /// a current GL context of the requested version. The window is shown once everything is
    /// set up.
    pub fn new(config: &WindowConfig) -> Result<Self> {
        let sdl = sdl2::init().map_err(DemoError::Windowing)?;
        let video_subsystem = sdl.video().map_err(DemoError::Windowing)?;

        let gl_attr = video_subsystem.gl_attr();
        gl_attr.set_context_profile(GLProfile::Core);
        let (major, minor) = config.gl_version;
        gl_attr.set_context_version(major, minor);
        if config.debug_context {
            gl_attr.set_context_flags().debug().set();
        }

        let mut window = video_subsystem
            .window(&config.title, config.width, config.height)
            .opengl()
            .resizable()
            .hidden()
            .build()
            .map_err(|e| DemoError::WindowCreation(e.to_string()))?;

        match video_subsystem.desktop_display_mode(0) {
            Ok(mode) => window.set_position(
                WindowPos::Positioned((mode.w - config.width as i32) / 2),
                WindowPos::Positioned((mode.h - config.height as i32) / 2),
            ),
            Err(e) => log::warn!("could not query the display mode, leaving window unplaced: {e}"),
        }

        let gl_context = window.gl_create_context().map_err(|e| {
            DemoError::Context(format!("OpenGL {major}.{minor} core context: {e}"))
        })?;
        window.gl_make_current(&gl_context).map_err(DemoError::Context)?;

        let interval = if config.vsync {
            SwapInterval::VSync
        } else {
            SwapInterval::Immediate
        };
        if let Err(e) = video_subsystem.gl_set_swap_interval(interval) {
            log::warn!("could not set swap interval {interval:?}: {e}");
        }

        let mut gl = unsafe {
            glow::Context::from_loader_function(|s| {
                video_subsystem.gl_get_proc_address(s) as *const _
            })
        };
        let caps = Capabilities::detect(&gl);
        log::info!(
            "OpenGL {} ({})",
            unsafe { gl.get_parameter_string(glow::VERSION) },
            unsafe { gl.get_parameter_string(glow::RENDERER) }
        );

        let gl_messages = if caps.debug_output() {
            let (sender, receiver) = mpsc::channel();
            unsafe {
                gl.enable(glow::DEBUG_OUTPUT);
                gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
                gl.debug_message_callback(move |source, kind, id, severity, text| {
                    let _ = sender.send(GlMessage {
                        source,
                        kind,
                        id,
                        severity,
                        text: text.to_string(),
                    });
                });
            }
            Some(receiver)
        } else {
            log::warn!("GL debug output unavailable: driver messages will not be reported");
            None
        };

        let event_pump = sdl.event_pump().map_err(DemoError::Windowing)?;

        window.show();
        let (width, height) = window.drawable_size();

        Ok(Self {
            event_pump,
            gl: Arc::new(gl),
            caps,
            gl_messages,
            gl_context,
            window,
            video_subsystem,
            sdl,
            viewport: Viewport::new(width as i32, height as i32),
            should_close: false,
        })
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Re-reads the drawable size after a window size event.
    ///
    /// Returns the new viewport when it changed.
    pub fn refresh_viewport(&mut self) -> Option<Viewport> {
        let (width, height) = self.window.drawable_size();
        if self.viewport.resize(width as i32, height as i32) {
            Some(self.viewport)
        } else {
            None
        }
    }

    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn request_close(&mut self) {
        self.should_close = true;
    }

    /// Returns the GL debug messages reported since the last call.
    pub fn drain_gl_messages(&self) -> Vec<GlMessage> {
        self.gl_messages
            .as_ref()
            .map(|receiver| receiver.try_iter().collect())
            .unwrap_or_default()
    }

    pub fn swap_buffers(&self) {
        self.window.gl_swap_window();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if self.gl_messages.is_some() {
            unsafe {
                self.gl.disable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
                self.gl.disable(glow::DEBUG_OUTPUT);
            }
        }
        log::debug!("releasing window and OpenGL context");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_ignores_non_positive() {
        let mut viewport = Viewport::new(1024, 768);
        for (w, h) in [(0, 0), (0, 600), (800, 0), (-1, 600), (800, -5), (-3, -3)] {
            assert!(!viewport.resize(w, h));
            assert_eq!(viewport, Viewport::new(1024, 768));
        }
    }

    #[test]
    fn test_resize_same_size_is_noop() {
        let mut viewport = Viewport::new(1024, 768);
        assert!(!viewport.resize(1024, 768));
        assert_eq!(viewport, Viewport::new(1024, 768));
    }

    #[test]
    fn test_resize_updates() {
        let mut viewport = Viewport::new(1024, 768);
        assert!(viewport.resize(800, 600));
        assert_eq!(viewport, Viewport::new(800, 600));
        assert!(viewport.resize(800, 601));
        assert_eq!(viewport.height, 601);
        assert!(!viewport.resize(800, 601));
    }

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(Viewport::new(1024, 768).aspect_ratio(), 1024.0 / 768.0);
    }
}
