//! Standalone OpenGL demos on SDL2 and glow: a cubemap black hole rendered on a billboard
//! quad, and a B-spline evaluated entirely in the vertex shader.

pub mod abs;
pub mod application;
pub mod config;
pub mod demos;
pub mod error;
pub mod frame;
pub mod input;
pub mod logging;

pub use error::{DemoError, Result};

/// Runs a demo binary: applies environment overrides to `config`, initializes logging and
/// runs the demo built by `build`.
///
/// Returns the process exit code.
pub fn main_with<H, F>(config: config::DemoConfig, build: F) -> std::process::ExitCode
where
    H: frame::FrameHandler,
    F: FnOnce(&abs::App, &config::DemoConfig) -> Result<H>,
{
    let (config, rejected) = config.with_env();
    logging::init_logging(config.log_level);
    logging::log_panics();
    for message in rejected {
        log::warn!("{message}");
    }

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        application::run(&config, build)
    }));
    match outcome {
        Ok(Ok(())) => std::process::ExitCode::SUCCESS,
        Ok(Err(e)) => {
            log::error!("{e}");
            std::process::ExitCode::FAILURE
        }
        // The hook has already logged the panic and unwinding released every resource.
        Err(_) => std::process::ExitCode::FAILURE,
    }
}
