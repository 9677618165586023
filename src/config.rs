//! Runtime configuration.
//!
//! Each binary builds its [`DemoConfig`] from hard-coded defaults and then applies overrides
//! from the environment. Nothing is read from files and there are no command-line flags.

use std::path::PathBuf;

use log::LevelFilter;

pub const ENV_ASSETS: &str = "GLDEMOS_ASSETS";
pub const ENV_LOG: &str = "GLDEMOS_LOG";
pub const ENV_VSYNC: &str = "GLDEMOS_VSYNC";
pub const ENV_MAX_FRAME_DELTA: &str = "GLDEMOS_MAX_FRAME_DELTA";

/// Hints used when creating the window and its GL context.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Context version requested from the windowing system, as `(major, minor)`.
    pub gl_version: (u8, u8),
    pub vsync: bool,
    /// Requests a debug context so driver messages reach the log.
    pub debug_context: bool,
}

impl WindowConfig {
    pub fn new(title: &str, width: u32, height: u32) -> Self {
        Self {
            title: title.to_string(),
            width,
            height,
            gl_version: (3, 3),
            vsync: true,
            debug_context: cfg!(debug_assertions),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub assets_dir: PathBuf,
    pub log_level: LevelFilter,
    /// Upper bound on a single frame's delta time, in seconds.
    pub max_frame_delta: Option<f32>,
}

impl DemoConfig {
    pub fn new(window: WindowConfig) -> Self {
        Self {
            window,
            assets_dir: PathBuf::from("assets"),
            log_level: LevelFilter::Info,
            max_frame_delta: Some(0.25),
        }
    }

    /// Applies overrides from the process environment.
    ///
    /// Returns the messages for rejected values so they can be logged once the logger is up.
    pub fn with_env(self) -> (Self, Vec<String>) {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Applies overrides read through `lookup`.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> (Self, Vec<String>) {
        let mut rejected = Vec::new();

        if let Some(dir) = lookup(ENV_ASSETS).filter(|d| !d.trim().is_empty()) {
            self.assets_dir = PathBuf::from(dir);
        }

        if let Some(value) = lookup(ENV_LOG) {
            match value.trim().parse::<LevelFilter>() {
                Ok(level) => self.log_level = level,
                Err(_) => rejected.push(format!("ignoring {ENV_LOG}={value:?}: not a log level")),
            }
        }

        if let Some(value) = lookup(ENV_VSYNC) {
            match parse_flag(&value) {
                Some(vsync) => self.window.vsync = vsync,
                None => rejected.push(format!("ignoring {ENV_VSYNC}={value:?}: expected 0 or 1")),
            }
        }

        if let Some(value) = lookup(ENV_MAX_FRAME_DELTA) {
            let value = value.trim().to_string();
            if value.eq_ignore_ascii_case("none") {
                self.max_frame_delta = None;
            } else {
                match value.parse::<f32>() {
                    Ok(seconds) if seconds.is_finite() && seconds > 0.0 => {
                        self.max_frame_delta = Some(seconds)
                    }
                    _ => rejected.push(format!(
                        "ignoring {ENV_MAX_FRAME_DELTA}={value:?}: expected positive seconds or `none`"
                    )),
                }
            }
        }

        (self, rejected)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn base() -> DemoConfig {
        DemoConfig::new(WindowConfig::new("test", 1024, 768))
    }

    #[test]
    fn test_defaults_without_overrides() {
        let (config, rejected) = base().with_lookup(lookup(&[]));
        assert_eq!(config, base());
        assert!(rejected.is_empty());
        assert_eq!(config.assets_dir, PathBuf::from("assets"));
        assert_eq!(config.max_frame_delta, Some(0.25));
    }

    #[test]
    fn test_overrides() {
        let (config, rejected) = base().with_lookup(lookup(&[
            (ENV_ASSETS, "/tmp/faces"),
            (ENV_LOG, "debug"),
            (ENV_VSYNC, "0"),
            (ENV_MAX_FRAME_DELTA, "none"),
        ]));
        assert!(rejected.is_empty());
        assert_eq!(config.assets_dir, PathBuf::from("/tmp/faces"));
        assert_eq!(config.log_level, LevelFilter::Debug);
        assert!(!config.window.vsync);
        assert_eq!(config.max_frame_delta, None);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let (config, rejected) = base().with_lookup(lookup(&[
            (ENV_LOG, "loud"),
            (ENV_VSYNC, "maybe"),
            (ENV_MAX_FRAME_DELTA, "-1"),
        ]));
        assert_eq!(config, base());
        assert_eq!(rejected.len(), 3);
    }

    #[test]
    fn test_frame_delta_seconds() {
        let (config, _) = base().with_lookup(lookup(&[(ENV_MAX_FRAME_DELTA, "0.1")]));
        assert_eq!(config.max_frame_delta, Some(0.1));
    }
}
