//! Result types for workspace operations
//!
//! Output structures returned by [`crate::WorkspaceManager`], kept free of
//! presentation so the CLI decides how to render them.

use std::path::PathBuf;

use crate::configs::environment::ProvisionPolicy;
use crate::execution::dependencies::Step;

/// One entry of the help listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetHelp {
    pub name: String,
    pub help: Option<String>,
}

/// Information about a declared environment
#[derive(Debug, Clone)]
pub struct EnvironmentInfo {
    pub name: String,
    pub path: PathBuf,
    pub policy: ProvisionPolicy,
    pub provisioned: bool,
}

/// Result of getting the dependency graph
#[derive(Debug)]
pub struct DependencyGraphResult {
    /// Every target and environment with its direct prerequisites
    pub targets: Vec<(String, Vec<String>)>,
    pub cycles: Vec<Vec<String>>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Steps that executed, in order
    pub executed: Vec<Step>,
    /// Status of the last executed step
    pub status: i32,
}
