//! Command-line argument parsing.
//!
//! Usage:
//!   strings68 [-d] [-f[<rcfile>]] [-m<n>] [<program>]

use std::path::PathBuf;

pub const USAGE: &str = "Usage: strings68 [-d] [-f[<rcfile>]] [-m<n>] [<program>]";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Program file to run; `None` reads the program from stdin.
    pub program: Option<PathBuf>,
    /// Config-file specification.
    pub config: ConfigFile,
    /// `while` iteration cap override (`-m<n>`).
    pub max_iterations: Option<usize>,
    /// Debug logging (`-d`).
    pub debug: bool,
}

/// How to choose the rc file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Search `~/.strings68rc`, then `./.strings68rc` (default).
    #[default]
    Search,
    /// `-f` with no file argument: skip the rc file.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or(&[]))
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut positional: Vec<String> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            i += 1;
            positional.extend(argv[i..].iter().cloned());
            break;
        }

        // Non-flag argument.
        if !arg.starts_with('-') || arg == "-" {
            positional.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Flag argument: iterate over characters after the leading `-`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') && positional_follows(argv, i + 1) {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                // -m<n>
                'm' => {
                    let n = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-m requires an iteration count".to_owned());
                    };
                    let n = n
                        .parse()
                        .map_err(|_| format!("invalid iteration count: {n}"))?;
                    args.max_iterations = Some(n);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    match positional.len() {
        0 => {}
        1 => args.program = Some(PathBuf::from(positional.remove(0))),
        n => return Err(format!("too many arguments ({n})")),
    }

    Ok(args)
}

/// `-f <file>` takes the next argument only if a program path still
/// follows it; otherwise that argument is the program and `-f` stands alone.
fn positional_follows(argv: &[String], file_idx: usize) -> bool {
    argv[file_idx + 1..].iter().any(|a| !a.starts_with('-') || a == "-")
}

// ── Path helpers ──────────────────────────────────────────────────────────────

/// Search for the user rc file in the standard locations.
/// Returns the first path that exists, or `None`.
pub fn find_user_config() -> Option<PathBuf> {
    config_candidates(std::env::var_os("HOME").map(PathBuf::from))
        .into_iter()
        .find(|p| p.exists())
}

/// rc-file locations in search order; the home entry is skipped without `HOME`.
fn config_candidates(home: Option<PathBuf>) -> Vec<PathBuf> {
    home.filter(|h| !h.as_os_str().is_empty())
        .map(|h| h.join(".strings68rc"))
        .into_iter()
        .chain([PathBuf::from("./.strings68rc")])
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert!(a.program.is_none());
        assert!(!a.debug);
        assert!(matches!(a.config, ConfigFile::Search));
    }

    #[test]
    fn program_positional() {
        let a = parse_argv(&argv(&["hello.s68"])).unwrap();
        assert_eq!(a.program, Some(PathBuf::from("hello.s68")));
    }

    #[test]
    fn dash_is_positional() {
        let a = parse_argv(&argv(&["-"])).unwrap();
        assert_eq!(a.program, Some(PathBuf::from("-")));
    }

    #[test]
    fn debug_flag() {
        let a = parse_argv(&argv(&["-d", "p.s68"])).unwrap();
        assert!(a.debug);
        assert_eq!(a.program, Some(PathBuf::from("p.s68")));
    }

    #[test]
    fn max_iterations_embedded() {
        let a = parse_argv(&argv(&["-m500"])).unwrap();
        assert_eq!(a.max_iterations, Some(500));
    }

    #[test]
    fn max_iterations_separate() {
        let a = parse_argv(&argv(&["-m", "7", "p.s68"])).unwrap();
        assert_eq!(a.max_iterations, Some(7));
        assert_eq!(a.program, Some(PathBuf::from("p.s68")));
    }

    #[test]
    fn combined_flags() {
        let a = parse_argv(&argv(&["-dm9"])).unwrap();
        assert!(a.debug);
        assert_eq!(a.max_iterations, Some(9));
    }

    #[test]
    fn bad_iteration_count() {
        assert!(parse_argv(&argv(&["-mten"])).is_err());
        assert!(parse_argv(&argv(&["-m"])).is_err());
    }

    #[test]
    fn config_skip() {
        let a = parse_argv(&argv(&["-f"])).unwrap();
        assert!(matches!(a.config, ConfigFile::Skip));
    }

    #[test]
    fn config_skip_before_program() {
        let a = parse_argv(&argv(&["-f", "p.s68"])).unwrap();
        assert!(matches!(a.config, ConfigFile::Skip));
        assert_eq!(a.program, Some(PathBuf::from("p.s68")));
    }

    #[test]
    fn config_explicit_embedded() {
        let a = parse_argv(&argv(&["-fmyrc"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("myrc")));
    }

    #[test]
    fn config_explicit_separate() {
        let a = parse_argv(&argv(&["-f", "myrc", "p.s68"])).unwrap();
        assert!(matches!(&a.config, ConfigFile::Explicit(p) if p == &PathBuf::from("myrc")));
        assert_eq!(a.program, Some(PathBuf::from("p.s68")));
    }

    #[test]
    fn double_dash() {
        let a = parse_argv(&argv(&["--", "-odd-name.s68"])).unwrap();
        assert_eq!(a.program, Some(PathBuf::from("-odd-name.s68")));
    }

    #[test]
    fn too_many_positional() {
        assert!(parse_argv(&argv(&["a", "b"])).is_err());
    }

    #[test]
    fn config_candidates_with_home() {
        let c = config_candidates(Some(PathBuf::from("/home/u")));
        assert_eq!(
            c,
            vec![PathBuf::from("/home/u/.strings68rc"), PathBuf::from("./.strings68rc")]
        );
    }

    #[test]
    fn config_candidates_without_home() {
        assert_eq!(config_candidates(None), vec![PathBuf::from("./.strings68rc")]);
        assert_eq!(
            config_candidates(Some(PathBuf::new())),
            vec![PathBuf::from("./.strings68rc")]
        );
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }
}
