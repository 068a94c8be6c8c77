use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::types::RookResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Command {
    /// A shell line, run through `sh -c`
    Single(String),
    /// Program followed by its arguments
    Multiple(Vec<String>),
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TaskConfig {
    pub name: String,
    /// One line of help text; tasks without it are hidden from the listing
    pub description: Option<String>,
    pub script: Option<String>,
    pub command: Option<Command>,
    /// Environments destroyed when this task runs
    pub cleans: Option<Vec<String>>,
    pub dependencies: Option<Vec<String>>,
    /// Environment the action runs in, provisioned first if needed
    pub environment: Option<String>,
    /// Tools that must be on `PATH` before the action runs
    pub requires: Option<Vec<String>>,
    /// Extra variables for the child process, interpolated at run time
    pub env: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TasksFileConfig {
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<TaskConfig>,
}

pub fn parse_tasks_config(yaml_str: &str) -> RookResult<TasksFileConfig> {
    let config: TasksFileConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}
