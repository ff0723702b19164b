//! strings68 statement executor.
//!
//! The [`Interpreter`] owns the variable store for one program run and
//! executes parsed [`Stmt`] trees, collecting `print` output in
//! [`Interpreter::output`].  Expressions are evaluated against the store
//! through [`EvalContext`](super::expr::EvalContext), which only reads.

use tracing::{debug, trace};

use crate::config::Config;
use crate::var::{is_var_name, VarStore};
use super::{
    array,
    error::{InterpretError, ScriptError},
    expr::{eval, Condition, Expr},
    stmt::{parse_script, Stmt},
};

// ── Interpreter ───────────────────────────────────────────────────────────────

/// The strings68 interpreter.
#[derive(Debug, Default)]
pub struct Interpreter {
    vars: VarStore,
    /// Lines produced by `print`.
    pub output: Vec<String>,
    config: Config,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: Config) -> Self {
        Interpreter {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The variable store, read-only.
    pub fn vars(&self) -> &VarStore {
        &self.vars
    }

    /// Pre-seed a variable before running a program.
    pub fn set_var(&mut self, name: &str, value: impl Into<String>) -> Result<(), ScriptError> {
        check_var_name(name)?;
        self.vars.set(name, value);
        Ok(())
    }

    /// Drain and return the output produced so far.
    pub fn take_output(&mut self) -> Vec<String> {
        std::mem::take(&mut self.output)
    }

    // ── Running whole programs ────────────────────────────────────────────────

    /// Parse and run `src`, returning every line it printed.
    ///
    /// On failure the error carries the lines printed before it.
    pub fn run_script(&mut self, src: &str) -> Result<Vec<String>, InterpretError> {
        let stmts = parse_script(src).map_err(|error| InterpretError {
            error,
            output: self.take_output(),
        })?;
        self.run(&stmts)
    }

    /// Run pre-parsed statements, returning every line they printed.
    pub fn run(&mut self, stmts: &[Stmt]) -> Result<Vec<String>, InterpretError> {
        match self.exec_block(stmts) {
            Ok(()) => Ok(self.take_output()),
            Err(error) => {
                debug!(%error, lines = self.output.len(), "program aborted");
                Err(InterpretError {
                    error,
                    output: self.take_output(),
                })
            }
        }
    }

    // ── Execution ─────────────────────────────────────────────────────────────

    /// Parse and execute a script, leaving its output in [`output`](Self::output).
    pub fn exec_script(&mut self, src: &str) -> Result<(), ScriptError> {
        let stmts = parse_script(src)?;
        self.exec_block(&stmts)
    }

    /// Execute a pre-parsed block of statements.
    pub fn exec_block(&mut self, stmts: &[Stmt]) -> Result<(), ScriptError> {
        for stmt in stmts {
            self.exec_stmt(stmt)?;
        }
        Ok(())
    }

    /// Execute a single statement.
    pub fn exec_stmt(&mut self, stmt: &Stmt) -> Result<(), ScriptError> {
        match stmt {
            Stmt::Assign { target, expr } => {
                check_var_name(target)?;
                let value = self.eval(expr)?;
                trace!(var = target.as_str(), value = %value, "assign");
                self.vars.set(target.as_str(), value);
                Ok(())
            }

            Stmt::Print(expr) => {
                let line = self.eval(expr)?;
                debug!(%line, "print");
                self.output.push(line);
                Ok(())
            }

            Stmt::If {
                cond,
                then_block,
                else_block,
            } => {
                if self.test(cond)? {
                    self.exec_block(then_block)
                } else if let Some(block) = else_block {
                    self.exec_block(block)
                } else {
                    Ok(())
                }
            }

            Stmt::ForEachChar { var, source, body } => {
                check_var_name(var)?;
                let s = self.eval(source)?;
                self.run_loop(var, s.chars().map(String::from), body)
            }

            Stmt::ForEachItem { var, source, body } => {
                check_var_name(var)?;
                let s = self.eval(source)?;
                let items: Vec<String> = array::decode(&s).into_iter().map(str::to_owned).collect();
                self.run_loop(var, items, body)
            }

            Stmt::ForEach { var, source, body } => {
                check_var_name(var)?;
                let s = self.eval(source)?;
                if array::is_encoded(&s) {
                    let items: Vec<String> =
                        array::decode(&s).into_iter().map(str::to_owned).collect();
                    self.run_loop(var, items, body)
                } else {
                    self.run_loop(var, s.chars().map(String::from), body)
                }
            }

            Stmt::While { cond, body } => {
                let limit = self.config.max_iterations;
                let mut iterations = 0usize;
                while self.test(cond)? {
                    if iterations == limit {
                        return Err(ScriptError::IterationLimit(limit));
                    }
                    trace!(iteration = iterations, "while");
                    self.exec_block(body)?;
                    iterations += 1;
                }
                debug!(iterations, "while done");
                Ok(())
            }
        }
    }

    /// Evaluate an expression against the current variables.
    pub fn eval(&self, expr: &Expr) -> Result<String, ScriptError> {
        eval(expr, &self.vars)
    }

    fn test(&self, cond: &Condition) -> Result<bool, ScriptError> {
        let result = cond.eval(&self.vars)?;
        trace!(%cond, result, "condition");
        Ok(result)
    }

    /// Run `body` once per item with `var` bound to it.  Whatever `var`
    /// held before the loop (or its absence) is put back afterwards, also
    /// when the body fails.
    fn run_loop<I>(&mut self, var: &str, items: I, body: &[Stmt]) -> Result<(), ScriptError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut shadowed = None;
        let mut bound = false;
        let mut result = Ok(());

        for item in items {
            trace!(var, item = %item, "loop binding");
            let prev = self.vars.bind(var, item);
            if !bound {
                shadowed = prev;
                bound = true;
            }
            if let Err(e) = self.exec_block(body) {
                result = Err(e);
                break;
            }
        }

        if bound {
            self.vars.restore(var, shadowed);
        }
        result
    }
}

fn check_var_name(name: &str) -> Result<(), ScriptError> {
    if is_var_name(name) {
        Ok(())
    } else {
        Err(ScriptError::InvalidVariableName(name.to_owned()))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
