//! Composition root shared by the demo binaries.

use crate::abs::App;
use crate::config::DemoConfig;
use crate::error::{DemoError, Result};
use crate::frame::{FrameClock, FrameHandler, run_frame_loop};

/// Where a demo is in its life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    Uninitialized,
    /// Window and context exist.
    Initialized,
    /// GPU resources exist and frames are being drawn.
    Running,
    ShuttingDown,
    Terminated,
}

impl Lifecycle {
    /// Returns whether `self -> next` is allowed.
    pub fn can_transition_to(self, next: Lifecycle) -> bool {
        use Lifecycle::*;
        matches!(
            (self, next),
            (Uninitialized, Initialized)
                | (Uninitialized, ShuttingDown)
                | (Initialized, Running)
                | (Initialized, ShuttingDown)
                | (Running, ShuttingDown)
                | (ShuttingDown, Terminated)
        )
    }

    /// Moves to `next`, failing on a transition the table does not allow.
    pub fn transition(&mut self, next: Lifecycle) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(DemoError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        log::debug!("{:?} -> {:?}", self, next);
        *self = next;
        Ok(())
    }
}

/// Creates the window, builds the demo with `build`, runs frames until close and tears
/// everything down.
///
/// The demo's GPU resources are dropped before the window and context on every path.
pub fn run<H, F>(config: &DemoConfig, build: F) -> Result<()>
where
    H: FrameHandler,
    F: FnOnce(&App, &DemoConfig) -> Result<H>,
{
    let mut state = Lifecycle::Uninitialized;
    drive(
        &mut state,
        || App::new(&config.window),
        |app| build(app, config),
        |app, demo| {
            let mut clock = FrameClock::new(config.max_frame_delta);
            run_frame_loop(app, &mut clock, demo);
        },
    )
}

/// Walks `state` through the lifecycle around the three stages and always ends in
/// [`Lifecycle::Terminated`].
///
/// A failing `open` or `build` goes straight to shutdown and its error is returned.
fn drive<W, H>(
    state: &mut Lifecycle,
    open: impl FnOnce() -> Result<W>,
    build: impl FnOnce(&W) -> Result<H>,
    frames: impl FnOnce(&mut W, &mut H),
) -> Result<()> {
    let result = drive_stages(state, open, build, frames);

    if *state != Lifecycle::ShuttingDown {
        state.transition(Lifecycle::ShuttingDown)?;
    }
    state.transition(Lifecycle::Terminated)?;
    result
}

fn drive_stages<W, H>(
    state: &mut Lifecycle,
    open: impl FnOnce() -> Result<W>,
    build: impl FnOnce(&W) -> Result<H>,
    frames: impl FnOnce(&mut W, &mut H),
) -> Result<()> {
    let mut window = open()?;
    state.transition(Lifecycle::Initialized)?;

    let mut demo = build(&window)?;
    state.transition(Lifecycle::Running)?;

    frames(&mut window, &mut demo);

    state.transition(Lifecycle::ShuttingDown)?;
    drop(demo);
    drop(window);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use super::*;

    type DropLog = Rc<RefCell<Vec<&'static str>>>;

    struct Tracked {
        name: &'static str,
        log: DropLog,
    }

    impl Tracked {
        fn new(name: &'static str, log: &DropLog) -> Self {
            Self {
                name,
                log: Rc::clone(log),
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.log.borrow_mut().push(self.name);
        }
    }

    #[test]
    fn test_drive_drops_demo_before_window() {
        let log = DropLog::default();
        let mut frames_run = 0;
        let mut state = Lifecycle::Uninitialized;

        drive(
            &mut state,
            || Ok(Tracked::new("window", &log)),
            |_| Ok(Tracked::new("demo", &log)),
            |_, _| frames_run += 1,
        )
        .unwrap();

        assert_eq!(frames_run, 1);
        assert_eq!(state, Lifecycle::Terminated);
        assert_eq!(*log.borrow(), ["demo", "window"]);
    }

    #[test]
    fn test_drive_build_failure_skips_running() {
        let log = DropLog::default();
        let mut state = Lifecycle::Uninitialized;

        let err = drive(
            &mut state,
            || Ok(Tracked::new("window", &log)),
            |_| -> Result<Tracked> { Err(DemoError::MissingCapability("OpenGL 3.0".into())) },
            |_, _| panic!("frames must not run after a failed build"),
        )
        .unwrap_err();

        assert!(matches!(err, DemoError::MissingCapability(_)));
        assert_eq!(state, Lifecycle::Terminated);
        assert_eq!(*log.borrow(), ["window"]);
    }

    #[test]
    fn test_drive_open_failure_never_builds() {
        let mut state = Lifecycle::Uninitialized;

        let err = drive(
            &mut state,
            || -> Result<()> { Err(DemoError::Windowing("no display".into())) },
            |_| -> Result<()> { panic!("build must not run without a window") },
            |_, _| panic!("frames must not run without a window"),
        )
        .unwrap_err();

        assert!(matches!(err, DemoError::Windowing(_)));
        assert_eq!(state, Lifecycle::Terminated);
    }

    #[test]
    fn test_happy_path() {
        let mut state = Lifecycle::Uninitialized;
        for next in [
            Lifecycle::Initialized,
            Lifecycle::Running,
            Lifecycle::ShuttingDown,
            Lifecycle::Terminated,
        ] {
            state.transition(next).unwrap();
        }
        assert_eq!(state, Lifecycle::Terminated);
    }

    #[test]
    fn test_failure_paths_skip_running() {
        assert!(Lifecycle::Initialized.can_transition_to(Lifecycle::ShuttingDown));
        assert!(Lifecycle::Uninitialized.can_transition_to(Lifecycle::ShuttingDown));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!Lifecycle::Uninitialized.can_transition_to(Lifecycle::Running));
        assert!(!Lifecycle::Running.can_transition_to(Lifecycle::Initialized));
        assert!(!Lifecycle::Running.can_transition_to(Lifecycle::Terminated));
        assert!(!Lifecycle::Terminated.can_transition_to(Lifecycle::Uninitialized));

        let mut state = Lifecycle::Terminated;
        let err = state.transition(Lifecycle::Running).unwrap_err();
        assert!(matches!(
            err,
            DemoError::InvalidTransition {
                from: Lifecycle::Terminated,
                to: Lifecycle::Running
            }
        ));
        assert_eq!(state, Lifecycle::Terminated);
    }
}
