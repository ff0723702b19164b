//! Variable store.
//!
//! strings68 has a single flat table of digit-named, string-valued
//! variables per interpreter run.  Loop variables are bound into the same
//! table for the duration of the loop body and the previous binding is put
//! back afterwards (see [`VarStore::bind`] / [`VarStore::restore`]).

use std::collections::HashMap;

use crate::script::error::ScriptError;
use crate::script::expr::EvalContext;

/// Returns `true` if `name` is a valid variable name (`^[0-9]+$`).
pub fn is_var_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Digit-named key/value variable store.
#[derive(Debug, Default, Clone)]
pub struct VarStore {
    vars: HashMap<String, String>,
}

impl VarStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or overwrite) a variable.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    /// Get the value of a variable, failing if it was never assigned.
    pub fn get(&self, name: &str) -> Result<&str, ScriptError> {
        self.vars
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ScriptError::UndefinedVariable(name.to_owned()))
    }

    /// Returns `true` if the variable is set.
    pub fn has(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    /// Bind a loop variable, returning whatever it shadowed.
    pub fn bind(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.vars.insert(name.to_owned(), value.into())
    }

    /// Undo a [`bind`](Self::bind): reinstate the shadowed value, or remove
    /// the variable if there was none.
    pub fn restore(&mut self, name: &str, previous: Option<String>) {
        match previous {
            Some(v) => {
                self.vars.insert(name.to_owned(), v);
            }
            None => {
                self.vars.remove(name);
            }
        }
    }

    /// Iterate over all variables.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.vars.iter()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl EvalContext for VarStore {
    fn get_var(&self, name: &str) -> Result<&str, ScriptError> {
        self.get(name)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
