//! High-level task runner
//!
//! Executes a resolved plan step by step: environments are provisioned,
//! required tools are looked up (and bootstrapped), then each target's action
//! runs. The first failing step aborts the whole run.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use colored::*;
use tracing::info;

use crate::configs::workspace::ToolConfig;
use crate::environment::{interpolate_command, Environment, EnvironmentHandle, Provisioned};
use crate::execution::command::{Invocation, Launcher};
use crate::execution::dependencies::Step;
use crate::results::RunReport;
use crate::tasks::{get_target_color, Action, Target};
use crate::tools::ensure_tool;
use crate::types::{RookError, RookResult};
use crate::variables::VariableScope;

/// Everything a run reads; all of it is static for the run's duration
pub struct RunContext<'a> {
    pub root: &'a Path,
    pub targets: &'a BTreeMap<String, Target>,
    pub environments: &'a BTreeMap<String, Environment>,
    pub tools: &'a BTreeMap<String, ToolConfig>,
    pub launcher: &'a dyn Launcher,
}

/// Sequential, fail-fast executor for a single run
pub struct TaskRunner<'a> {
    context: RunContext<'a>,
    variables: VariableScope<'a>,
}

impl<'a> TaskRunner<'a> {
    pub fn new(context: RunContext<'a>, variables: VariableScope<'a>) -> Self {
        Self { context, variables }
    }

    /// Execute `plan` in order, stopping at the first failure
    pub fn run(&self, plan: &[Step]) -> RookResult<RunReport> {
        let mut handles: HashMap<String, EnvironmentHandle> = HashMap::new();
        let mut executed = Vec::new();
        let mut last_status = 0;

        for step in plan {
            match step {
                Step::Provision(name) => {
                    let handle = self.provision(name)?;
                    handles.insert(name.clone(), handle);
                }
                Step::Target(name) => {
                    let target = self.context.targets.get(name).ok_or_else(|| {
                        RookError::Config(format!("Target '{}' not found", name))
                    })?;
                    if let Some(status) = self.run_target(target, &handles)? {
                        last_status = status;
                    }
                }
            }
            executed.push(step.clone());
        }

        Ok(RunReport {
            executed,
            status: last_status,
        })
    }

    fn environment(&self, name: &str) -> RookResult<&'a Environment> {
        self.context
            .environments
            .get(name)
            .ok_or_else(|| RookError::Config(format!("Environment '{}' not found", name)))
    }

    fn provision(&self, name: &str) -> RookResult<EnvironmentHandle> {
        let environment = self.environment(name)?;
        println!();
        println!(
            "┌─ {} {}",
            "Provisioning environment".bold(),
            name.color(get_target_color(name)).bold()
        );

        let (handle, outcome) = environment.ensure(&self.variables, self.context.launcher)?;
        let summary = match outcome {
            Provisioned::Reused => "reused existing",
            Provisioned::Built => "built",
            Provisioned::Rebuilt => "rebuilt",
        };
        println!(
            "└─ {} {}",
            "✓".green().bold(),
            format!("{} {}", summary, environment.path.display()).bright_black()
        );
        Ok(handle)
    }

    /// Run one target; returns the status of the process it launched, if any
    fn run_target(
        &self,
        target: &Target,
        handles: &HashMap<String, EnvironmentHandle>,
    ) -> RookResult<Option<i32>> {
        let target_color = get_target_color(&target.name);
        println!();
        println!(
            "┌─ {} {}",
            "Running target".bold(),
            target.name.color(target_color).bold()
        );
        if let Some(environment) = &target.environment {
            println!("└─ {} {}", "Environment:".bright_black(), environment);
        }

        let scope = self.scope_for(target, handles)?;
        for tool in &target.requires {
            ensure_tool(
                tool,
                self.context.tools,
                &scope,
                &self.variables,
                self.context.launcher,
            )?;
        }

        let status = match &target.action {
            Action::Nothing => None,
            Action::Clean(environments) => {
                for name in environments {
                    self.environment(name)?.destroy()?;
                }
                None
            }
            Action::Script(script) => {
                let script_path = self.resolve_script(script)?;
                let mut invocation = Invocation::new(script_path.display().to_string(), self.context.root);
                invocation.env = scope.env.clone();
                Some(self.launch(target, &invocation)?)
            }
            Action::Command(command) => {
                let command = interpolate_command(command, &self.variables)?;
                match Invocation::from_command(&command, self.context.root) {
                    Some(mut invocation) => {
                        invocation.env = scope.env.clone();
                        Some(self.launch(target, &invocation)?)
                    }
                    None => None,
                }
            }
        };

        println!(
            "{} {}",
            "✓".green().bold(),
            format!("Completed {}", target.name).color(target_color)
        );
        Ok(status)
    }

    /// Variables a child of `target` runs with, environment activation included
    fn scope_for(
        &self,
        target: &Target,
        handles: &HashMap<String, EnvironmentHandle>,
    ) -> RookResult<Invocation> {
        let mut scope = Invocation::new(String::new(), self.context.root);
        scope.set_env("ROOK_TARGET", target.name.clone());

        if let Some(name) = &target.environment {
            let handle = match handles.get(name) {
                Some(handle) => handle.clone(),
                None => self.environment(name)?.handle(),
            };
            handle.activate(&mut scope, &self.variables)?;
        }
        for (key, value) in &target.env {
            scope.set_env(key.clone(), self.variables.interpolate(value)?);
        }
        Ok(scope)
    }

    fn resolve_script(&self, script: &str) -> RookResult<PathBuf> {
        let script_path = PathBuf::from(self.variables.interpolate(script)?);

        // Relative scripts resolve against the workspace root
        let full_script_path = if script_path.is_relative() {
            self.context.root.join(script_path)
        } else {
            script_path
        };

        if !full_script_path.exists() {
            return Err(RookError::Config(format!(
                "Script file '{}' not found",
                full_script_path.display()
            )));
        }
        Ok(full_script_path)
    }

    fn launch(&self, target: &Target, invocation: &Invocation) -> RookResult<i32> {
        println!("  {} {}", "$".bright_black(), invocation.display().bright_black());
        info!(target = %target.name, command = %invocation.display(), "step started");
        let status = self.context.launcher.status(invocation)?;
        info!(target = %target.name, status, "step finished");
        if status != 0 {
            return Err(RookError::StepFailure {
                target: target.name.clone(),
                status,
            });
        }
        Ok(status)
    }
}
