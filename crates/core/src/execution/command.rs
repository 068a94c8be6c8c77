//! Subprocess launching
//!
//! Every external tool is reached through the [`Launcher`] trait. The runner
//! only looks at exit statuses (and, for `command` variables, stdout), so the
//! trait is all that stands between the planner and the operating system.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use crate::configs::tasks::Command as TaskCommand;
use crate::types::{RookError, RookResult};

/// Status reported when a child was terminated without an exit code
pub const SIGNALLED_STATUS: i32 = -1;

/// A fully resolved subprocess request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    /// Variables set on the child on top of the inherited environment
    pub env: Vec<(String, String)>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    /// Run `line` through `sh -c`
    pub fn shell(line: &str, cwd: impl Into<PathBuf>) -> Self {
        let mut invocation = Self::new("sh", cwd);
        invocation.args = vec!["-c".to_string(), line.to_string()];
        invocation
    }

    /// Build an invocation for a declared command; an empty argv yields `None`
    pub fn from_command(command: &TaskCommand, cwd: &Path) -> Option<Self> {
        match command {
            TaskCommand::Single(line) => Some(Self::shell(line, cwd)),
            TaskCommand::Multiple(argv) => {
                let (program, args) = argv.split_first()?;
                let mut invocation = Self::new(program.clone(), cwd);
                invocation.args = args.to_vec();
                Some(invocation)
            }
        }
    }

    /// Set (or replace) a child variable
    pub fn set_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(existing, _)| *existing == key) {
            Some(entry) => entry.1 = value,
            None => self.env.push((key, value)),
        }
    }

    /// Value a child variable will have, if this invocation sets it
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Human readable command line
    pub fn display(&self) -> String {
        if self.program == "sh" && self.args.len() == 2 && self.args[0] == "-c" {
            return self.args[1].clone();
        }
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Output of a captured invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Captured {
    pub status: i32,
    pub stdout: String,
}

/// Runs subprocesses to completion
pub trait Launcher {
    /// Run with inherited stdio and return the exit status
    fn status(&self, invocation: &Invocation) -> RookResult<i32>;

    /// Run with stdout captured; stderr stays attached to the terminal
    fn capture(&self, invocation: &Invocation) -> RookResult<Captured>;
}

/// [`Launcher`] backed by `std::process::Command`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl SystemLauncher {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .envs(invocation.env.iter().map(|(k, v)| (k, v)));
        command
    }

    fn spawn_error(invocation: &Invocation, error: std::io::Error) -> RookError {
        if error.kind() == ErrorKind::NotFound && invocation.cwd.is_dir() {
            RookError::ToolMissing {
                tool: invocation.program.clone(),
            }
        } else {
            RookError::Io(std::io::Error::new(
                error.kind(),
                format!("Failed to execute '{}': {}", invocation.display(), error),
            ))
        }
    }
}

impl Launcher for SystemLauncher {
    fn status(&self, invocation: &Invocation) -> RookResult<i32> {
        debug!(command = %invocation.display(), cwd = %invocation.cwd.display(), "spawning");
        let status = Self::command(invocation)
            .status()
            .map_err(|e| Self::spawn_error(invocation, e))?;
        Ok(status.code().unwrap_or(SIGNALLED_STATUS))
    }

    fn capture(&self, invocation: &Invocation) -> RookResult<Captured> {
        debug!(command = %invocation.display(), cwd = %invocation.cwd.display(), "capturing");
        let output = Self::command(invocation)
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|e| Self::spawn_error(invocation, e))?;
        Ok(Captured {
            status: output.status.code().unwrap_or(SIGNALLED_STATUS),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}
