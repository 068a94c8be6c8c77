//! Lazily evaluated variables and `${...}` interpolation
//!
//! A [`VariableScope`] holds one deferred provider per declared variable.
//! Nothing is evaluated until a step that is actually executing interpolates
//! a string referencing it; the value is then memoized for the rest of the
//! run. Unused variables never run their `command`.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::configs::workspace::VariableConfig;
use crate::execution::command::{Invocation, Launcher};
use crate::types::{RookError, RookResult};

/// Built-in variable holding the absolute workspace root
pub const ROOT_VARIABLE: &str = "root";

type EnvLookup = Box<dyn Fn(&str) -> Option<String>>;

pub struct VariableScope<'a> {
    definitions: &'a BTreeMap<String, VariableConfig>,
    root: PathBuf,
    launcher: &'a dyn Launcher,
    env_lookup: EnvLookup,
    resolved: RefCell<HashMap<String, String>>,
    resolving: RefCell<Vec<String>>,
}

impl<'a> VariableScope<'a> {
    pub fn new(
        definitions: &'a BTreeMap<String, VariableConfig>,
        root: &Path,
        launcher: &'a dyn Launcher,
    ) -> Self {
        Self {
            definitions,
            root: root.to_path_buf(),
            launcher,
            env_lookup: Box::new(|key| std::env::var(key).ok()),
            resolved: RefCell::new(HashMap::new()),
            resolving: RefCell::new(Vec::new()),
        }
    }

    /// Replace the process environment lookup used by `env` sources
    pub fn with_env_lookup(mut self, lookup: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.env_lookup = Box::new(lookup);
        self
    }

    /// Expand `${name}` references and `$$` escapes in `text`.
    ///
    /// A `$` followed by anything else is kept, so shell expansions such as
    /// `$HOME` pass through to the child untouched.
    pub fn interpolate(&self, text: &str) -> RookResult<String> {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;

        while let Some(pos) = rest.find('$') {
            output.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if let Some(stripped) = after.strip_prefix('$') {
                output.push('$');
                rest = stripped;
            } else if let Some(body) = after.strip_prefix('{') {
                let end = body.find('}').ok_or_else(|| {
                    RookError::ConfigurationMismatch(format!(
                        "Unterminated variable reference in '{}'",
                        text
                    ))
                })?;
                let name = body[..end].trim();
                output.push_str(&self.resolve(name)?);
                rest = &body[end + 1..];
            } else {
                output.push('$');
                rest = after;
            }
        }

        output.push_str(rest);
        Ok(output)
    }

    /// Evaluate a single variable, memoizing the result
    pub fn resolve(&self, name: &str) -> RookResult<String> {
        if name == ROOT_VARIABLE {
            return Ok(self.root.display().to_string());
        }
        if let Some(value) = self.resolved.borrow().get(name) {
            return Ok(value.clone());
        }

        let definition = self.definitions.get(name).ok_or_else(|| {
            RookError::ConfigurationMismatch(format!("Unknown variable '{}'", name))
        })?;

        if self.resolving.borrow().iter().any(|n| n == name) {
            let mut chain = self.resolving.borrow().clone();
            chain.push(name.to_string());
            return Err(RookError::ConfigurationMismatch(format!(
                "Variable '{}' references itself: {}",
                name,
                chain.join(" -> ")
            )));
        }

        self.resolving.borrow_mut().push(name.to_string());
        let value = self.evaluate(name, definition);
        self.resolving.borrow_mut().pop();
        let value = value?;

        if value.is_empty() && !definition.allow_empty {
            return Err(RookError::ConfigurationMismatch(format!(
                "Variable '{}' resolved to an empty value",
                name
            )));
        }

        debug!(variable = name, value = %value, "resolved variable");
        self.resolved
            .borrow_mut()
            .insert(name.to_string(), value.clone());
        Ok(value)
    }

    fn evaluate(&self, name: &str, definition: &VariableConfig) -> RookResult<String> {
        if let Some(key) = &definition.env {
            if let Some(value) = (self.env_lookup)(key).filter(|v| !v.is_empty()) {
                return Ok(value);
            }
        }

        if let Some(command) = &definition.command {
            let line = self.interpolate(command)?;
            let captured = self
                .launcher
                .capture(&Invocation::shell(&line, &self.root))?;
            if captured.status != 0 {
                return Err(RookError::ConfigurationMismatch(format!(
                    "Command for variable '{}' failed with exit code {}",
                    name, captured.status
                )));
            }
            return Ok(captured.stdout.trim().to_string());
        }

        if let Some(value) = &definition.value {
            return self.interpolate(value);
        }

        match &definition.default {
            Some(default) => self.interpolate(default),
            None => Ok(String::new()),
        }
    }
}
