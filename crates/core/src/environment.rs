//! Isolated tool environments
//!
//! An [`Environment`] is a directory under the workspace holding its own
//! toolchain. [`Environment::ensure`] applies the provisioning policy:
//! lazy environments are reused whenever the directory exists, strict ones
//! are removed and rebuilt on every call. Running "inside" an environment
//! never touches this process' own variables; the returned
//! [`EnvironmentHandle`] only decorates child invocations.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::{info, warn};

use crate::configs::environment::{EnvironmentConfig, ProvisionPolicy};
use crate::configs::tasks::Command;
use crate::execution::command::{Invocation, Launcher};
use crate::platform::prepend_path;
use crate::types::{RookError, RookResult};
use crate::variables::VariableScope;

const DEFAULT_BIN_DIR: &str = "bin";

#[derive(Debug, Clone)]
pub struct Environment {
    pub name: String,
    pub path: PathBuf,
    pub bin_dir: PathBuf,
    pub policy: ProvisionPolicy,
    pub provision: Vec<Command>,
    pub smoke_check: Option<Command>,
    pub env: BTreeMap<String, String>,
}

/// A provisioned environment, ready to scope child processes
#[derive(Debug, Clone)]
pub struct EnvironmentHandle {
    pub name: String,
    pub path: PathBuf,
    pub bin_path: PathBuf,
    env: BTreeMap<String, String>,
}

/// What [`Environment::ensure`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provisioned {
    Reused,
    Built,
    Rebuilt,
}

impl Environment {
    pub fn from_config(config: &EnvironmentConfig, workspace_root: &Path) -> RookResult<Self> {
        if config.name.trim().is_empty() {
            return Err(RookError::Config(
                "Environment names must not be empty".to_string(),
            ));
        }

        let relative = Path::new(&config.path);
        let stays_inside = relative.is_relative()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
            && relative.components().any(|c| matches!(c, Component::Normal(_)));
        if !stays_inside {
            return Err(RookError::Config(format!(
                "Environment '{}' path '{}' must be a relative directory inside the workspace",
                config.name, config.path
            )));
        }

        Ok(Self {
            name: config.name.clone(),
            path: workspace_root.join(relative),
            bin_dir: PathBuf::from(config.bin_dir.as_deref().unwrap_or(DEFAULT_BIN_DIR)),
            policy: config.policy,
            provision: config.provision.clone(),
            smoke_check: config.smoke_check.clone(),
            env: config.env.clone().unwrap_or_default(),
        })
    }

    /// Whether the marker directory is present
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Handle for the environment without provisioning it
    pub fn handle(&self) -> EnvironmentHandle {
        EnvironmentHandle {
            name: self.name.clone(),
            path: self.path.clone(),
            bin_path: self.path.join(&self.bin_dir),
            env: self.env.clone(),
        }
    }

    /// Provision the environment according to its policy
    pub fn ensure(
        &self,
        variables: &VariableScope<'_>,
        launcher: &dyn Launcher,
    ) -> RookResult<(EnvironmentHandle, Provisioned)> {
        let existed = self.exists();
        let outcome = match (self.policy, existed) {
            (ProvisionPolicy::Lazy, true) => {
                info!(environment = %self.name, path = %self.path.display(), "reusing environment");
                return Ok((self.handle(), Provisioned::Reused));
            }
            (ProvisionPolicy::Strict, true) => {
                self.destroy()?;
                Provisioned::Rebuilt
            }
            (_, false) => Provisioned::Built,
        };

        info!(environment = %self.name, path = %self.path.display(), "provisioning environment");
        std::fs::create_dir_all(&self.path).map_err(|e| RookError::Provisioning {
            environment: self.name.clone(),
            reason: format!("cannot create {}: {}", self.path.display(), e),
            status: None,
        })?;

        let handle = self.handle();
        for step in &self.provision {
            self.run_step(&handle, step, variables, launcher, "provisioning step")?;
        }
        if let Some(check) = &self.smoke_check {
            self.run_step(&handle, check, variables, launcher, "smoke check")?;
        }

        Ok((handle, outcome))
    }

    /// Remove the environment directory; returns whether anything was removed
    pub fn destroy(&self) -> RookResult<bool> {
        if !self.path.exists() {
            warn!(environment = %self.name, "environment not present, nothing to destroy");
            return Ok(false);
        }
        info!(environment = %self.name, path = %self.path.display(), "destroying environment");
        std::fs::remove_dir_all(&self.path)?;
        Ok(true)
    }

    fn run_step(
        &self,
        handle: &EnvironmentHandle,
        step: &Command,
        variables: &VariableScope<'_>,
        launcher: &dyn Launcher,
        kind: &str,
    ) -> RookResult<()> {
        let step = interpolate_command(step, variables)?;
        let Some(mut invocation) = Invocation::from_command(&step, &self.path) else {
            return Ok(());
        };
        handle.activate(&mut invocation, variables)?;

        let status = launcher.status(&invocation)?;
        if status != 0 {
            return Err(RookError::Provisioning {
                environment: self.name.clone(),
                reason: format!(
                    "{} '{}' exited with status {}",
                    kind,
                    invocation.display(),
                    status
                ),
                status: Some(status),
            });
        }
        Ok(())
    }
}

impl EnvironmentHandle {
    /// Scope `invocation` to this environment.
    ///
    /// Prepends the environment's bin directory to the child's `PATH` and
    /// exports `ROOK_ENV`, `ROOK_ENV_DIR` and the declared variables.
    pub fn activate(
        &self,
        invocation: &mut Invocation,
        variables: &VariableScope<'_>,
    ) -> RookResult<()> {
        let inherited = match invocation.env_value("PATH") {
            Some(path) => Some(path.into()),
            None => std::env::var_os("PATH"),
        };
        let path = prepend_path(&self.bin_path, inherited.as_deref());
        invocation.set_env("PATH", path.to_string_lossy().into_owned());
        invocation.set_env("ROOK_ENV", self.name.clone());
        invocation.set_env("ROOK_ENV_DIR", self.path.display().to_string());
        for (key, value) in &self.env {
            invocation.set_env(key.clone(), variables.interpolate(value)?);
        }
        Ok(())
    }
}

/// Interpolate every string of a declared command
pub fn interpolate_command(command: &Command, variables: &VariableScope<'_>) -> RookResult<Command> {
    Ok(match command {
        Command::Single(line) => Command::Single(variables.interpolate(line)?),
        Command::Multiple(argv) => Command::Multiple(
            argv.iter()
                .map(|arg| variables.interpolate(arg))
                .collect::<RookResult<Vec<_>>>()?,
        ),
    })
}
