//! strings68 scripting language.
//!
//! A tree-walking interpreter for a string-only language whose variables
//! are digit sequences:
//!
//! - Assignment (`N = expr`) and `print expr`
//! - `if cond then … else … endif` with `equals` / `contains` /
//!   `startswith` / `endswith`
//! - `foreach [char|item] N in expr do … endfor` and `while cond do … endwhile`
//! - 14 built-in string functions, including `split`/`get` over
//!   array-encoded strings and modular `rotl`/`rotr`
//!
//! # Quick start
//!
//! ```rust
//! let out = strings68::interpret("1 = \"ABCDEF\"\nprint rotl(1, \"8\")").unwrap();
//! assert_eq!(out, vec!["CDEFAB"]);
//! ```

pub mod array;
pub mod builtins;
pub mod error;
pub mod expr;
pub mod interp;
pub mod stmt;

// Re-exports for convenience.
pub use error::{ErrorKind, InterpretError, ScriptError};
pub use expr::{Condition, EvalContext, Expr};
pub use interp::Interpreter;
pub use stmt::{parse_script, Stmt};

/// Parse and run a complete program with a fresh [`Interpreter`].
pub fn interpret(src: &str) -> Result<Vec<String>, InterpretError> {
    Interpreter::new().run_script(src)
}

/// Run pre-parsed statements with a fresh [`Interpreter`].
pub fn interpret_stmts(stmts: &[Stmt]) -> Result<Vec<String>, InterpretError> {
    Interpreter::new().run(stmts)
}
