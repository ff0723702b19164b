use std::io::{self, BufRead, Read};
use std::process::ExitCode;

use strings68::cli::{self, ConfigFile, USAGE};
use strings68::{Config, Interpreter};

fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("strings68: {e}");
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    // ── Layered configuration: rc file, environment, command line ────────────
    let mut config = Config::new();
    let mut warnings = Vec::new();

    let rc_path = match args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(path) => Some(path),
        ConfigFile::Search => cli::find_user_config(),
    };
    if let Some(path) = &rc_path {
        match std::fs::read_to_string(path) {
            Ok(src) => {
                for e in config.apply_str(&src) {
                    warnings.push(format!("{}: {e}", path.display()));
                }
            }
            Err(e) => warnings.push(format!("{}: {e}", path.display())),
        }
    }
    for e in config.apply_env() {
        warnings.push(e.message);
    }
    if let Some(n) = args.max_iterations {
        config.max_iterations = n;
    }

    // Logging comes up after config so `log=` in the rc file takes effect;
    // rc warnings are replayed once a subscriber exists.
    let default_level = if args.debug {
        Some("debug")
    } else {
        config.log_level.as_deref()
    };
    strings68::init_tracing(default_level);
    for w in &warnings {
        tracing::warn!("{w}");
        eprintln!("strings68: warning: {w}");
    }
    if let Some(path) = &rc_path {
        tracing::debug!(path = %path.display(), "loaded rc file");
    }

    // ── Read the program ──────────────────────────────────────────────────────
    let interactive = args.program.is_none() && unsafe { libc::isatty(libc::STDIN_FILENO) != 0 };
    let source = match &args.program {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {e}", path.display())),
        _ if interactive => read_interactive(),
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map(|_| buf)
                .map_err(|e| format!("stdin: {e}"))
        }
    };
    let source = match source {
        Ok(s) => s,
        Err(e) => {
            eprintln!("strings68: {e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Run ───────────────────────────────────────────────────────────────────
    if interactive {
        println!("=== Output ===");
    }
    match Interpreter::with_config(config).run_script(&source) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            for line in &e.output {
                println!("{line}");
            }
            eprintln!("strings68: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Read program lines from a terminal until EOF or a line reading `exit`.
fn read_interactive() -> Result<String, String> {
    println!("strings68 Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Enter your program (type 'exit' or press Ctrl-D to finish):");

    let mut source = String::new();
    for line in io::stdin().lock().lines() {
        let line = line.map_err(|e| format!("stdin: {e}"))?;
        if line.trim() == "exit" {
            break;
        }
        source.push_str(&line);
        source.push('\n');
    }
    Ok(source)
}
