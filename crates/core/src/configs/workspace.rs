use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::environment::EnvironmentConfig;
use crate::configs::tasks::Command;
use crate::types::RookResult;

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WorkspaceConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    /// Lazily evaluated values referenced as `${name}` in commands
    #[serde(default)]
    pub variables: BTreeMap<String, VariableConfig>,
    #[serde(default)]
    pub environments: Vec<EnvironmentConfig>,
    #[serde(default)]
    pub tools: Vec<ToolConfig>,
}

/// Sources for a lazy variable, tried in order: `env`, `command`, `value`, `default`.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VariableConfig {
    /// Environment variable that overrides every other source when set and non-empty
    pub env: Option<String>,
    /// Shell command whose trimmed stdout becomes the value
    pub command: Option<String>,
    pub value: Option<String>,
    pub default: Option<String>,
    /// Accept an empty resolution instead of reporting a mismatch
    #[serde(default)]
    pub allow_empty: bool,
}

/// An external tool a task can require, optionally with a bootstrap installer
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolConfig {
    pub name: String,
    pub install: Option<Command>,
}

pub fn parse_workspace_config(yaml_str: &str) -> RookResult<WorkspaceConfig> {
    let config: WorkspaceConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}

/// JSON schema of `workspace.yml`
pub fn workspace_schema() -> RookResult<String> {
    let schema = schemars::schema_for!(WorkspaceConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| crate::types::RookError::Config(format!("Failed to render schema: {}", e)))
}
