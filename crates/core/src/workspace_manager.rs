//! High-level workspace management interface
//!
//! This module provides the [`WorkspaceManager`] which serves as the primary interface
//! for all runner operations. It loads the `.rook` configuration once, validates
//! it, and exposes listing, planning, running and environment lifecycle.
//!
//! ## Example
//!
//! ```rust,no_run
//! use rook_core::workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
//! use std::path::PathBuf;
//!
//! # fn example() -> rook_core::types::RookResult<()> {
//! let manager = WorkspaceManager::new(WorkspaceManagerConfig {
//!     workspace_root: PathBuf::from("."),
//! })?;
//!
//! // Documented targets, alphabetically
//! let targets = manager.list_targets(false);
//!
//! // Run a target and everything it depends on
//! let report = manager.run("all")?;
//! # Ok(())
//! # }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::configs::tasks::{parse_tasks_config, TaskConfig};
use crate::configs::workspace::{parse_workspace_config, ToolConfig, WorkspaceConfig};
use crate::environment::{Environment, EnvironmentHandle};
use crate::execution::command::{Launcher, SystemLauncher};
use crate::execution::dependencies::{Step, TargetGraph};
use crate::execution::runner::{RunContext, TaskRunner};
use crate::results::{DependencyGraphResult, EnvironmentInfo, RunReport, TargetHelp};
use crate::tasks::{Action, Target};
use crate::types::{RookError, RookResult};
use crate::variables::{VariableScope, ROOT_VARIABLE};

/// Directory holding the configuration, relative to the workspace root
pub const CONFIG_DIR: &str = ".rook";

/// High-level workspace manager that encapsulates all runner operations
pub struct WorkspaceManager {
    pub root: PathBuf,
    pub workspace_config: WorkspaceConfig,
    targets: BTreeMap<String, Target>,
    environments: BTreeMap<String, Environment>,
    tools: BTreeMap<String, ToolConfig>,
    graph: TargetGraph,
    launcher: Box<dyn Launcher>,
}

/// Configuration for initializing a workspace manager
pub struct WorkspaceManagerConfig {
    pub workspace_root: PathBuf,
}

impl WorkspaceManager {
    /// Load and validate the configuration under the given workspace root
    pub fn new(config: WorkspaceManagerConfig) -> RookResult<Self> {
        let root = std::fs::canonicalize(&config.workspace_root).map_err(|e| {
            RookError::Config(format!(
                "Workspace root {} is not accessible: {}",
                config.workspace_root.display(),
                e
            ))
        })?;

        let workspace_config = Self::load_workspace_config(&root)?;
        let task_configs = Self::load_task_configs(&root)?;

        if workspace_config.variables.contains_key(ROOT_VARIABLE) {
            return Err(RookError::Config(format!(
                "Variable name '{}' is reserved",
                ROOT_VARIABLE
            )));
        }

        let environments = Self::build_environments(&root, &workspace_config)?;
        let tools = Self::build_tools(&workspace_config)?;
        let targets = Self::build_targets(task_configs, &environments)?;
        let graph = TargetGraph::build(
            targets.values(),
            environments.keys().map(String::as_str),
        )?;

        debug!(
            root = %root.display(),
            targets = targets.len(),
            environments = environments.len(),
            "loaded workspace"
        );

        Ok(Self {
            root,
            workspace_config,
            targets,
            environments,
            tools,
            graph,
            launcher: Box::new(SystemLauncher),
        })
    }

    /// Replace the subprocess launcher
    pub fn with_launcher(mut self, launcher: impl Launcher + 'static) -> Self {
        self.launcher = Box::new(launcher);
        self
    }

    /// Help listing: alphabetical, documented targets only unless `include_undocumented`
    pub fn list_targets(&self, include_undocumented: bool) -> Vec<TargetHelp> {
        self.targets
            .values()
            .filter(|target| include_undocumented || target.help.is_some())
            .map(|target| TargetHelp {
                name: target.name.clone(),
                help: target.help.clone(),
            })
            .collect()
    }

    /// Ordered steps that running `goals` would execute
    pub fn get_execution_plan(&self, goals: &[String]) -> RookResult<Vec<Step>> {
        if goals.is_empty() {
            return Err(RookError::Config("No target given".to_string()));
        }
        self.graph.plan(goals)
    }

    /// Run a single target with its prerequisites
    pub fn run(&self, target: &str) -> RookResult<RunReport> {
        self.run_many(&[target.to_string()])
    }

    /// Run several goals in one run; shared prerequisites execute once
    pub fn run_many(&self, goals: &[String]) -> RookResult<RunReport> {
        let plan = self.get_execution_plan(goals)?;
        let runner = TaskRunner::new(self.run_context(), self.variable_scope());
        runner.run(&plan)
    }

    /// Provision an environment according to its policy
    pub fn ensure_environment(&self, name: &str) -> RookResult<EnvironmentHandle> {
        let environment = self.environment(name)?;
        let (handle, _) = environment.ensure(&self.variable_scope(), self.launcher.as_ref())?;
        Ok(handle)
    }

    /// Remove an environment directory; returns whether anything was removed
    pub fn destroy_environment(&self, name: &str) -> RookResult<bool> {
        self.environment(name)?.destroy()
    }

    pub fn list_environments(&self) -> Vec<EnvironmentInfo> {
        self.environments
            .values()
            .map(|environment| EnvironmentInfo {
                name: environment.name.clone(),
                path: environment.path.clone(),
                policy: environment.policy,
                provisioned: environment.exists(),
            })
            .collect()
    }

    /// Get dependency graph information
    pub fn get_dependency_graph(&self) -> DependencyGraphResult {
        DependencyGraphResult {
            targets: self.graph.edges(),
            cycles: self.graph.cycles().to_vec(),
        }
    }

    // Private helper methods

    fn environment(&self, name: &str) -> RookResult<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| RookError::Config(format!("Environment '{}' not found", name)))
    }

    fn run_context(&self) -> RunContext<'_> {
        RunContext {
            root: &self.root,
            targets: &self.targets,
            environments: &self.environments,
            tools: &self.tools,
            launcher: self.launcher.as_ref(),
        }
    }

    fn variable_scope(&self) -> VariableScope<'_> {
        VariableScope::new(
            &self.workspace_config.variables,
            &self.root,
            self.launcher.as_ref(),
        )
    }

    fn load_workspace_config(workspace_root: &Path) -> RookResult<WorkspaceConfig> {
        let workspace_config_path = workspace_root.join(CONFIG_DIR).join("workspace.yml");
        let content = std::fs::read_to_string(&workspace_config_path).map_err(|e| {
            RookError::Config(format!(
                "Failed to read workspace config {}: {}",
                workspace_config_path.display(),
                e
            ))
        })?;

        parse_workspace_config(&content).map_err(|e| {
            RookError::Config(format!(
                "Failed to parse workspace config {}: {}",
                workspace_config_path.display(),
                e
            ))
        })
    }

    fn load_task_configs(workspace_root: &Path) -> RookResult<Vec<TaskConfig>> {
        let tasks_dir = workspace_root.join(CONFIG_DIR).join("tasks");
        if !tasks_dir.exists() {
            return Ok(Vec::new());
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&tasks_dir).map_err(|e| {
            RookError::Config(format!(
                "Failed to read tasks directory {}: {}",
                tasks_dir.display(),
                e
            ))
        })? {
            let path = entry?.path();
            let is_yaml = matches!(
                path.extension().and_then(|s| s.to_str()),
                Some("yml") | Some("yaml")
            );
            if is_yaml {
                paths.push(path);
            }
        }
        // Merge in file-name order so duplicate reports are deterministic
        paths.sort();

        let mut tasks = Vec::new();
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|e| {
                RookError::Config(format!("Failed to read task config {}: {}", path.display(), e))
            })?;
            let config = parse_tasks_config(&content).map_err(|e| {
                RookError::Config(format!("Failed to parse task config {}: {}", path.display(), e))
            })?;
            tasks.extend(config.tasks);
        }
        Ok(tasks)
    }

    fn build_environments(
        root: &Path,
        config: &WorkspaceConfig,
    ) -> RookResult<BTreeMap<String, Environment>> {
        let mut environments = BTreeMap::new();
        for env_config in &config.environments {
            let environment = Environment::from_config(env_config, root)?;
            if environments
                .insert(environment.name.clone(), environment)
                .is_some()
            {
                return Err(RookError::Config(format!(
                    "Environment '{}' is declared more than once",
                    env_config.name
                )));
            }
        }

        // Rebuilding one environment must never remove another
        let declared: Vec<&Environment> = environments.values().collect();
        for (i, a) in declared.iter().enumerate() {
            for b in &declared[i + 1..] {
                if a.path.starts_with(&b.path) || b.path.starts_with(&a.path) {
                    return Err(RookError::Config(format!(
                        "Environments '{}' and '{}' have overlapping paths '{}' and '{}'",
                        a.name,
                        b.name,
                        a.path.display(),
                        b.path.display()
                    )));
                }
            }
        }
        Ok(environments)
    }

    fn build_tools(config: &WorkspaceConfig) -> RookResult<BTreeMap<String, ToolConfig>> {
        let mut tools = BTreeMap::new();
        for tool in &config.tools {
            if tools.insert(tool.name.clone(), tool.clone()).is_some() {
                return Err(RookError::Config(format!(
                    "Tool '{}' is declared more than once",
                    tool.name
                )));
            }
        }
        Ok(tools)
    }

    fn build_targets(
        task_configs: Vec<TaskConfig>,
        environments: &BTreeMap<String, Environment>,
    ) -> RookResult<BTreeMap<String, Target>> {
        let mut targets = BTreeMap::new();
        for task_config in task_configs {
            let target = Target::from_config(task_config)?;

            let mut referenced: Vec<&String> = target.environment.iter().collect();
            if let Action::Clean(cleaned) = &target.action {
                referenced.extend(cleaned);
            }
            if let Some(unknown) = referenced
                .into_iter()
                .find(|name| !environments.contains_key(name.as_str()))
            {
                return Err(RookError::Config(format!(
                    "Target '{}' references unknown environment '{}'",
                    target.name, unknown
                )));
            }

            let name = target.name.clone();
            if targets.insert(name.clone(), target).is_some() {
                return Err(RookError::Config(format!(
                    "Target '{}' is declared more than once",
                    name
                )));
            }
        }
        Ok(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{write_workspace, RecordingLauncher};

    const WORKSPACE: &str = r#"
name: restlib
variables:
  package_name:
    command: "python setup.py --name"
environments:
  - name: dev
    path: .venv/dev
    provision: ["python3 -m venv .", "pip install -r requirements-dev.txt"]
  - name: release
    path: .venv/release
    policy: strict
    provision: ["python3 -m venv .", "pip install twine wheel"]
    smokeCheck: "python -c 'import twine'"
"#;

    const TASKS: &str = r#"
tasks:
  - name: test
    description: Run unit tests
    environment: dev
    command: "pytest"
  - name: lint
    description: Run static analysis
    environment: dev
    command: "flake8 src"
  - name: build
    description: Build distributions
    environment: release
    dependencies: [lint]
    command: "python -m build"
  - name: install
    description: Install the package
    dependencies: [build]
    command: "pip install ."
  - name: acceptance-test
    description: Run acceptance tests
    dependencies: [install]
    command: ["docker-compose", "up", "--abort-on-container-exit"]
  - name: all
    description: Test, build, install and run acceptance tests
    dependencies: [test, build, install, acceptance-test]
  - name: uninstall
    command: "pip uninstall -y ${package_name}"
  - name: clean
    description: Remove provisioned environments
    cleans: [dev, release]
"#;

    fn manager(launcher: &RecordingLauncher) -> (tempfile::TempDir, WorkspaceManager) {
        let dir = tempfile::tempdir().unwrap();
        write_workspace(dir.path(), WORKSPACE, TASKS);
        let manager = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: dir.path().to_path_buf(),
        })
        .unwrap()
        .with_launcher(launcher.clone());
        (dir, manager)
    }

    fn labels(report: &RunReport) -> Vec<String> {
        report.executed.iter().map(Step::label).collect()
    }

    #[test]
    fn list_targets_is_sorted_documented_and_stable() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        let first = manager.list_targets(false);
        let names: Vec<&str> = first.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["acceptance-test", "all", "build", "clean", "install", "lint", "test"]
        );
        assert_eq!(manager.list_targets(false), first);
        assert!(manager
            .list_targets(true)
            .iter()
            .any(|t| t.name == "uninstall" && t.help.is_none()));
        assert!(launcher.calls().is_empty());
    }

    #[test]
    fn aggregate_runs_each_prerequisite_once() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        let report = manager.run("all").unwrap();
        assert_eq!(
            labels(&report),
            vec![
                "env:dev",
                "test",
                "env:release",
                "lint",
                "build",
                "install",
                "acceptance-test",
                "all"
            ]
        );
        assert_eq!(report.status, 0);
        assert_eq!(launcher.count_matching("flake8 src"), 1);
        assert_eq!(launcher.count_matching("pip install ."), 1);
        assert_eq!(launcher.count_matching("pip install -r requirements-dev.txt"), 1);
    }

    #[test]
    fn failing_build_stops_the_aggregate() {
        let launcher = RecordingLauncher::new().exit_with("python -m build", 3);
        let (_dir, manager) = manager(&launcher);

        let err = manager.run("all").unwrap_err();
        assert!(matches!(
            &err,
            RookError::StepFailure { target, status } if target == "build" && *status == 3
        ));
        assert_eq!(err.exit_code(), 3);
        assert_eq!(launcher.count_matching("pip install ."), 0);
        assert_eq!(launcher.count_matching("docker-compose"), 0);
    }

    #[test]
    fn lazy_environment_is_not_reprovisioned() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        manager.ensure_environment("dev").unwrap();
        let after_first = launcher.calls().len();
        assert_eq!(after_first, 2);

        manager.ensure_environment("dev").unwrap();
        assert_eq!(launcher.calls().len(), after_first);
    }

    #[test]
    fn strict_environment_rebuilds_and_passes_smoke_check_twice() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        manager.ensure_environment("release").unwrap();
        manager.ensure_environment("release").unwrap();
        assert_eq!(launcher.count_matching("pip install twine wheel"), 2);
        assert_eq!(launcher.count_matching("import twine"), 2);
    }

    #[test]
    fn target_runs_inside_its_environment() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        manager.run("test").unwrap();
        let call = launcher
            .calls()
            .into_iter()
            .find(|c| c.display() == "pytest")
            .unwrap();
        assert_eq!(call.cwd, manager.root);
        assert_eq!(call.env_value("ROOK_ENV"), Some("dev"));
        assert_eq!(call.env_value("ROOK_TARGET"), Some("test"));
        assert!(std::env::var("ROOK_ENV").is_err());
    }

    #[test]
    fn lazy_variables_resolve_only_when_used() {
        let launcher = RecordingLauncher::new().print("setup.py --name", "restlib\n");
        let (_dir, manager) = manager(&launcher);

        manager.run("test").unwrap();
        assert_eq!(launcher.count_matching("setup.py --name"), 0);

        manager.run("uninstall").unwrap();
        assert_eq!(launcher.count_matching("setup.py --name"), 1);
        assert_eq!(launcher.count_matching("pip uninstall -y restlib"), 1);
    }

    #[test]
    fn empty_package_name_is_a_configuration_mismatch() {
        let launcher = RecordingLauncher::new().print("setup.py --name", "  \n");
        let (_dir, manager) = manager(&launcher);

        let err = manager.run("uninstall").unwrap_err();
        assert!(matches!(err, RookError::ConfigurationMismatch(_)));
        assert_eq!(launcher.count_matching("pip uninstall"), 0);
    }

    #[test]
    fn clean_destroys_environments() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        manager.ensure_environment("dev").unwrap();
        assert!(manager.list_environments().iter().any(|e| e.name == "dev" && e.provisioned));

        manager.run("clean").unwrap();
        assert!(manager.list_environments().iter().all(|e| !e.provisioned));
    }

    #[test]
    fn environment_pseudo_target_can_be_run_directly() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        let report = manager.run("env:release").unwrap();
        assert_eq!(labels(&report), vec!["env:release"]);
        assert_eq!(launcher.count_matching("pip install twine wheel"), 1);
    }

    #[test]
    fn graph_lists_targets_and_environments() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        let graph = manager.get_dependency_graph();
        assert!(graph.cycles.is_empty());
        let build = graph.targets.iter().find(|(name, _)| name == "build").unwrap();
        assert_eq!(build.1, vec!["env:release", "lint"]);
        assert!(graph.targets.iter().any(|(name, _)| name == "env:dev"));
    }

    fn load(workspace: &str, tasks: &str) -> RookResult<WorkspaceManager> {
        let dir = tempfile::tempdir().unwrap();
        write_workspace(dir.path(), workspace, tasks);
        WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: dir.path().to_path_buf(),
        })
    }

    #[test]
    fn duplicate_targets_are_rejected() {
        let result = load(
            "name: dup\n",
            "tasks:\n  - name: a\n    command: ls\n  - name: a\n    command: pwd\n",
        );
        assert!(matches!(result, Err(RookError::Config(msg)) if msg.contains("more than once")));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let result = load(
            "name: env\n",
            "tasks:\n  - name: a\n    environment: nowhere\n    command: ls\n",
        );
        assert!(matches!(result, Err(RookError::Config(msg)) if msg.contains("nowhere")));
    }

    #[test]
    fn reserved_variable_is_rejected() {
        let result = load("variables:\n  root:\n    value: x\n", "tasks: []\n");
        assert!(matches!(result, Err(RookError::Config(msg)) if msg.contains("reserved")));
    }

    #[test]
    fn missing_workspace_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let result = WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: dir.path().to_path_buf(),
        });
        assert!(matches!(result, Err(RookError::Config(msg)) if msg.contains("workspace.yml")));
    }

    #[test]
    fn cycles_fail_planning_but_not_loading() {
        let manager = load(
            "name: cyc\n",
            "tasks:\n  - name: a\n    dependencies: [b]\n  - name: b\n    dependencies: [a]\n  - name: c\n    command: ls\n",
        )
        .unwrap();
        assert_eq!(manager.get_dependency_graph().cycles.len(), 1);
        assert!(manager.get_execution_plan(&["a".to_string()]).is_err());
        assert!(manager.get_execution_plan(&["c".to_string()]).is_ok());
    }

    #[test]
    fn nested_environment_paths_are_rejected() {
        let result = load(
            "environments:\n  - name: outer\n    path: .venv\n    policy: strict\n  - name: inner\n    path: .venv/inner\n",
            "tasks: []\n",
        );
        assert!(matches!(
            result,
            Err(RookError::Config(msg)) if msg.contains("overlapping") && msg.contains("inner")
        ));
    }

    #[test]
    fn shared_environment_path_is_rejected() {
        let result = load(
            "environments:\n  - name: one\n    path: .env\n  - name: two\n    path: ./.env/\n",
            "tasks: []\n",
        );
        assert!(matches!(result, Err(RookError::Config(msg)) if msg.contains("overlapping")));
    }

    #[test]
    fn sibling_environment_paths_are_accepted() {
        let result = load(
            "environments:\n  - name: env\n    path: .env\n  - name: envs\n    path: .envs/a\n",
            "tasks: []\n",
        );
        assert!(result.is_ok());
    }

    fn manager_in(
        dir: &tempfile::TempDir,
        workspace: &str,
        tasks: &str,
        launcher: &RecordingLauncher,
    ) -> WorkspaceManager {
        write_workspace(dir.path(), workspace, tasks);
        WorkspaceManager::new(WorkspaceManagerConfig {
            workspace_root: dir.path().to_path_buf(),
        })
        .unwrap()
        .with_launcher(launcher.clone())
    }

    #[test]
    fn script_target_resolves_against_the_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("scripts")).unwrap();
        std::fs::write(dir.path().join("scripts").join("release.sh"), "#!/bin/sh\n").unwrap();
        let launcher = RecordingLauncher::new();
        let manager = manager_in(
            &dir,
            "name: scripted\n",
            "tasks:\n  - name: release\n    script: scripts/release.sh\n",
            &launcher,
        );

        let report = manager.run("release").unwrap();
        assert_eq!(labels(&report), vec!["release"]);
        let calls = launcher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].program,
            manager.root.join("scripts").join("release.sh").display().to_string()
        );
        assert_eq!(calls[0].cwd, manager.root);
        assert_eq!(calls[0].env_value("ROOK_TARGET"), Some("release"));
    }

    #[test]
    fn missing_script_is_reported_before_launching() {
        let dir = tempfile::tempdir().unwrap();
        let launcher = RecordingLauncher::new();
        let manager = manager_in(
            &dir,
            "name: scripted\n",
            "tasks:\n  - name: release\n    script: scripts/missing.sh\n",
            &launcher,
        );

        let err = manager.run("release").unwrap_err();
        assert!(matches!(
            &err,
            RookError::Config(msg) if msg.contains("missing.sh") && msg.contains("not found")
        ));
        assert_eq!(err.exit_code(), crate::types::GENERIC_FAILURE_CODE);
        assert!(launcher.calls().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn required_tool_is_found_in_the_environment_bin() {
        use crate::testutil::write_executable;

        let dir = tempfile::tempdir().unwrap();
        let launcher = RecordingLauncher::new().on("make-lint-tool", |invocation| {
            write_executable(&invocation.cwd.join("bin").join("rook-fixture-lint"));
        });
        let manager = manager_in(
            &dir,
            "environments:\n  - name: dev\n    path: .venv/dev\n    provision: [make-lint-tool]\n",
            concat!(
                "tasks:\n",
                "  - name: lint\n    environment: dev\n    requires: [rook-fixture-lint]\n    command: rook-fixture-lint src\n",
                "  - name: bare-lint\n    requires: [rook-fixture-lint]\n    command: rook-fixture-lint src\n",
            ),
            &launcher,
        );

        let report = manager.run("lint").unwrap();
        assert_eq!(labels(&report), vec!["env:dev", "lint"]);
        assert_eq!(launcher.count_matching("rook-fixture-lint src"), 1);

        // Outside the environment the tool is not on PATH
        let err = manager.run("bare-lint").unwrap_err();
        assert!(matches!(
            err,
            RookError::ToolMissing { tool } if tool == "rook-fixture-lint"
        ));
        assert_eq!(launcher.count_matching("rook-fixture-lint src"), 1);
    }

    #[cfg(unix)]
    #[test]
    fn required_tool_is_bootstrapped_inside_the_environment() {
        use crate::testutil::write_executable;

        let dir = tempfile::tempdir().unwrap();
        let launcher = RecordingLauncher::new().on("install-fixture-fmt", |invocation| {
            let env_dir = invocation.env_value("ROOK_ENV_DIR").unwrap();
            write_executable(&Path::new(env_dir).join("bin").join("rook-fixture-fmt"));
        });
        let manager = manager_in(
            &dir,
            concat!(
                "environments:\n  - name: dev\n    path: .venv/dev\n",
                "tools:\n  - name: rook-fixture-fmt\n    install: install-fixture-fmt\n",
            ),
            "tasks:\n  - name: fmt\n    environment: dev\n    requires: [rook-fixture-fmt]\n    command: rook-fixture-fmt --check\n",
            &launcher,
        );

        manager.run("fmt").unwrap();
        assert_eq!(
            launcher.commands(),
            vec!["install-fixture-fmt", "rook-fixture-fmt --check"]
        );

        // Installed once; the second run finds it
        manager.run("fmt").unwrap();
        assert_eq!(launcher.count_matching("install-fixture-fmt"), 1);
    }

    #[test]
    fn run_report_carries_the_last_step_status() {
        let launcher = RecordingLauncher::new();
        let (_dir, manager) = manager(&launcher);

        let report = manager.run("lint").unwrap();
        assert_eq!(report.status, 0);
        assert_eq!(launcher.count_matching("flake8 src"), 1);

        // Cleanup launches nothing and still succeeds
        let report = manager.run("clean").unwrap();
        assert_eq!(report.status, 0);
    }

    #[test]
    fn failing_provisioning_propagates_its_status() {
        let launcher = RecordingLauncher::new().exit_with("pip install twine wheel", 5);
        let (_dir, manager) = manager(&launcher);

        let err = manager.run("build").unwrap_err();
        assert!(matches!(
            &err,
            RookError::Provisioning { environment, status: Some(5), .. } if environment == "release"
        ));
        assert_eq!(err.exit_code(), 5);
        assert_eq!(launcher.count_matching("python -m build"), 0);
    }
}
