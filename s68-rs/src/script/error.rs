//! Error taxonomy for the strings68 interpreter.
//!
//! Every failure aborts the running program.  [`ScriptError`] describes
//! what went wrong; [`InterpretError`] pairs it with the output lines that
//! were printed before the failure so hosts can still show partial progress.

use thiserror::Error;

// ── ScriptError ───────────────────────────────────────────────────────────────

/// A parse or runtime failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("Variable '{0}' not defined")]
    UndefinedVariable(String),

    #[error("Variable name must be digits: {0}")]
    InvalidVariableName(String),

    #[error("{function}: {message}")]
    InvalidArgument { function: String, message: String },

    /// `index` keeps the caller's digit text so huge indices print verbatim.
    #[error("Index {index} out of bounds (length: {length})")]
    IndexOutOfBounds { index: String, length: usize },

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("{function} expects {expected} argument{}, got {got}", plural(.expected))]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },

    #[error("While loop exceeded maximum iterations ({0})")]
    IterationLimit(usize),

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

fn plural(n: &usize) -> &'static str {
    if *n == 1 {
        ""
    } else {
        "s"
    }
}

/// Fieldless tag for matching on the kind of a [`ScriptError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UndefinedVariable,
    InvalidVariableName,
    InvalidArgument,
    IndexOutOfBounds,
    UnknownFunction,
    ArityMismatch,
    IterationLimit,
    Parse,
}

impl ScriptError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScriptError::UndefinedVariable(_) => ErrorKind::UndefinedVariable,
            ScriptError::InvalidVariableName(_) => ErrorKind::InvalidVariableName,
            ScriptError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            ScriptError::IndexOutOfBounds { .. } => ErrorKind::IndexOutOfBounds,
            ScriptError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            ScriptError::ArityMismatch { .. } => ErrorKind::ArityMismatch,
            ScriptError::IterationLimit(_) => ErrorKind::IterationLimit,
            ScriptError::Parse { .. } => ErrorKind::Parse,
        }
    }

    pub(crate) fn invalid_argument(function: &str, message: impl Into<String>) -> Self {
        ScriptError::InvalidArgument {
            function: function.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ScriptError::Parse {
            line,
            message: message.into(),
        }
    }
}

// ── InterpretError ────────────────────────────────────────────────────────────

/// A failed [`interpret`](super::interpret) call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct InterpretError {
    #[source]
    pub error: ScriptError,
    /// Lines printed before the failing statement.
    pub output: Vec<String>,
}

impl InterpretError {
    pub fn kind(&self) -> ErrorKind {
        self.error.kind()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
