//! strings68: an interpreter for a string-only scripting language.
//!
//! The library is usable without the command-line front end:
//!
//! ```rust
//! let out = strings68::interpret("1 = \"strings68\"\nprint reverse(uppercase(1))").unwrap();
//! assert_eq!(out, vec!["86SGNIRTS"]);
//! ```

pub mod cli;
pub mod config;
pub mod script;
pub mod var;

use std::sync::Once;

pub use config::Config;
pub use script::{interpret, interpret_stmts, ErrorKind, InterpretError, Interpreter, ScriptError};

/// Environment variable holding a tracing filter (e.g. `strings68=debug`).
pub const LOG_ENV: &str = "STRINGS68_LOG";

static TRACING_INIT: Once = Once::new();

/// Install a stderr tracing subscriber.
///
/// The filter comes from `STRINGS68_LOG`, then `RUST_LOG`, then
/// `default_level`.  With none of them set, nothing is installed.  Only the
/// first call has any effect.
pub fn init_tracing(default_level: Option<&str>) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let directives = std::env::var(LOG_ENV)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok()
            .or_else(|| default_level.map(str::to_owned));
        let Some(directives) = directives else {
            return;
        };

        let filter = EnvFilter::try_new(&directives).unwrap_or_else(|e| {
            eprintln!("strings68: ignoring bad log filter '{directives}': {e}");
            EnvFilter::new("warn")
        });
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_level(true),
            )
            .with(filter)
            .init();
    });
}
