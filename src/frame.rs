//! The per-frame loop shared by the demos.
//!
//! [`run_frame_loop`] polls events, dispatches them to a [`FrameHandler`], updates it with the
//! frame's delta time, renders and presents, until the window is asked to close.

use std::time::Instant;

use glow::HasContext;
use sdl2::{
    event::{Event, WindowEvent},
    keyboard::Keycode,
};

use crate::abs::{App, GlMessage, Viewport};
use crate::input::KeyEvent;
use crate::logging::gl_severity_level;

/// Callbacks driven by [`run_frame_loop`], all on the thread that owns the window.
pub trait FrameHandler {
    /// The framebuffer changed to a new, positive size.
    fn on_resize(&mut self, _viewport: Viewport) {}

    /// A key was pressed, repeated or released. Escape releases are handled by the loop.
    fn on_key(&mut self, _event: KeyEvent) {}

    /// The driver reported a debug message.
    fn on_error(&mut self, message: &GlMessage) {
        log::log!(
            gl_severity_level(message.severity),
            "GL debug message {:#x} (source {:#x}, type {:#x}): {}",
            message.id,
            message.source,
            message.kind,
            message.text
        );
    }

    /// Advances the scene by `delta` seconds.
    fn update(&mut self, delta: f32, viewport: Viewport);

    /// Issues this frame's draw calls.
    fn render(&mut self, gl: &glow::Context);
}

/// Monotonic frame timer.
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    max_delta: Option<f32>,
}

impl FrameClock {
    pub fn new(max_delta: Option<f32>) -> Self {
        Self {
            last: Instant::now(),
            max_delta,
        }
    }

    /// Moves the baseline to now, dropping any time spent before the call.
    pub fn restart(&mut self) {
        self.last = Instant::now();
    }

    /// Returns the seconds since the previous tick, clamped to the maximum delta.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        clamp_delta(delta, self.max_delta)
    }
}

/// Clamps a frame delta to `max`, when one is set.
pub fn clamp_delta(delta: f32, max: Option<f32>) -> f32 {
    match max {
        Some(max) => delta.min(max),
        None => delta,
    }
}

/// Seconds accumulated towards a continuous rotation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Spin {
    elapsed: f32,
}

impl Spin {
    pub fn advance(&mut self, delta: f32) {
        self.elapsed += delta;
    }

    #[cfg(test)]
    fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// The accumulated angle for a rotation of `rate` radians per second.
    pub fn angle(&self, rate: f32) -> f32 {
        self.elapsed * rate
    }
}

/// What the frame loop does with one SDL event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopAction {
    Close,
    /// The window size changed; the drawable size has to be re-read.
    Resize,
    Key(KeyEvent),
}

/// Maps an event to the loop's reaction to it.
///
/// Quit and an Escape release close the window. Every other key event goes to the handler,
/// including Escape presses and repeats.
pub fn route(event: &Event) -> Option<LoopAction> {
    match event {
        Event::Quit { .. } => Some(LoopAction::Close),
        Event::Window {
            win_event: WindowEvent::SizeChanged(..) | WindowEvent::Resized(..),
            ..
        } => Some(LoopAction::Resize),
        _ => KeyEvent::from_sdl(event).map(|key| {
            if key.released() == Some(Keycode::Escape) {
                LoopAction::Close
            } else {
                LoopAction::Key(key)
            }
        }),
    }
}

/// Runs `handler` until the window is asked to close.
pub fn run_frame_loop(app: &mut App, clock: &mut FrameClock, handler: &mut impl FrameHandler) {
    clock.restart();

    while !app.should_close() {
        let events: Vec<Event> = app.event_pump.poll_iter().collect();
        for action in events.iter().filter_map(route) {
            match action {
                LoopAction::Close => app.request_close(),
                LoopAction::Resize => {
                    if let Some(viewport) = app.refresh_viewport() {
                        log::debug!("framebuffer resized to {}x{}", viewport.width, viewport.height);
                        handler.on_resize(viewport);
                    }
                }
                LoopAction::Key(key) => handler.on_key(key),
            }
        }

        let viewport = app.viewport();
        unsafe {
            app.gl.viewport(0, 0, viewport.width, viewport.height);
        }

        handler.update(clock.tick(), viewport);
        handler.render(&app.gl);

        for message in app.drain_gl_messages() {
            handler.on_error(&message);
        }

        app.swap_buffers();
    }
}
