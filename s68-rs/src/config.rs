//! Interpreter configuration.
//!
//! Settings are layered, lowest priority first:
//!
//! | Source | Example |
//! |--------|---------|
//! | built-in defaults | `max_iterations = 10000` |
//! | rc file (`~/.strings68rc`, `./.strings68rc`, or `-f<file>`) | `max_iterations=500` |
//! | environment | `STRINGS68_MAX_ITERATIONS=500` |
//! | command line | `-m500`, `-d` |
//!
//! The rc file holds `name=value` lines; blank lines and `#` comments are
//! ignored.  Recognised names are `max_iterations` and `log`.

use std::path::Path;

use thiserror::Error;

/// Default cap on `while` loop iterations.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Environment variable overriding [`Config::max_iterations`].
pub const MAX_ITERATIONS_ENV: &str = "STRINGS68_MAX_ITERATIONS";

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    /// 1-based rc-file line; 0 for settings that did not come from a file.
    pub line: usize,
    pub message: String,
}

/// Interpreter settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of times a `while` body may run.
    pub max_iterations: usize,
    /// Default tracing filter (e.g. `debug`), used when no log env var is set.
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            log_level: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an rc file's contents on top of the defaults.
    ///
    /// Bad lines are reported and skipped.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = Config::new();
        let errors = config.apply_str(s);
        (config, errors)
    }

    /// Read and parse an rc file.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let src = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&src))
    }

    /// Apply `name=value` lines to this config.
    pub fn apply_str(&mut self, s: &str) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let Some((name, value)) = line.split_once('=') else {
                errors.push(ConfigError {
                    line: lineno,
                    message: format!("expected name=value, got '{line}'"),
                });
                continue;
            };

            if let Err(message) = self.set(name.trim(), value.trim()) {
                errors.push(ConfigError {
                    line: lineno,
                    message,
                });
            }
        }
        errors
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> Vec<ConfigError> {
        self.apply_env_from(|k| std::env::var(k).ok())
    }

    /// Apply environment overrides using `lookup` (exposed for testing).
    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(v) = lookup(MAX_ITERATIONS_ENV) {
            if let Err(message) = self.set("max_iterations", v.trim()) {
                errors.push(ConfigError {
                    line: 0,
                    message: format!("{MAX_ITERATIONS_ENV}: {message}"),
                });
            }
        }
        errors
    }

    /// Set one named setting from its textual value.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "max_iterations" => {
                self.max_iterations = value
                    .parse()
                    .map_err(|_| format!("max_iterations must be a non-negative integer, got '{value}'"))?;
            }
            "log" => {
                self.log_level = if value.is_empty() {
                    None
                } else {
                    Some(value.to_owned())
                };
            }
            other => return Err(format!("unknown setting '{other}'")),
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
