use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tasks::Command;

/// How an existing environment directory is treated when it is provisioned again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProvisionPolicy {
    /// Reuse the directory as-is when it already exists
    #[default]
    Lazy,
    /// Remove the directory and rebuild it every time
    Strict,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnvironmentConfig {
    pub name: String,
    /// Directory of the environment, relative to the workspace root
    pub path: String,
    #[serde(default)]
    pub policy: ProvisionPolicy,
    /// Directory inside the environment prepended to `PATH` (default `bin`)
    pub bin_dir: Option<String>,
    /// Steps run inside the environment directory when it is (re)built
    #[serde(default)]
    pub provision: Vec<Command>,
    /// Verification run after provisioning
    pub smoke_check: Option<Command>,
    /// Variables exported to every process running in this environment
    pub env: Option<BTreeMap<String, String>>,
}
