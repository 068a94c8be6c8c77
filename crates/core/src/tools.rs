//! Required tool lookup and bootstrap installation

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::configs::workspace::ToolConfig;
use crate::environment::interpolate_command;
use crate::execution::command::{Invocation, Launcher};
use crate::platform::find_executable;
use crate::types::{RookError, RookResult};
use crate::variables::VariableScope;

/// Make sure `tool` can be found on the `PATH` that `scope` would give a child.
///
/// A missing tool with a declared installer is installed once, using the same
/// scope, and looked up again.
pub fn ensure_tool(
    tool: &str,
    tools: &BTreeMap<String, ToolConfig>,
    scope: &Invocation,
    variables: &VariableScope<'_>,
    launcher: &dyn Launcher,
) -> RookResult<PathBuf> {
    if let Some(path) = lookup(tool, scope) {
        debug!(tool, path = %path.display(), "found tool");
        return Ok(path);
    }

    let install = tools
        .get(tool)
        .and_then(|config| config.install.as_ref())
        .ok_or_else(|| RookError::ToolMissing {
            tool: tool.to_string(),
        })?;

    warn!(tool, "tool not found, running its installer");
    let install = interpolate_command(install, variables)?;
    if let Some(mut invocation) = Invocation::from_command(&install, &scope.cwd) {
        invocation.env = scope.env.clone();
        let status = launcher.status(&invocation)?;
        if status != 0 {
            warn!(tool, status, "tool installer failed");
        }
    }

    lookup(tool, scope).ok_or_else(|| RookError::ToolMissing {
        tool: tool.to_string(),
    })
}

fn lookup(tool: &str, scope: &Invocation) -> Option<PathBuf> {
    let path_value: Option<OsString> = match scope.env_value("PATH") {
        Some(path) => Some(path.into()),
        None => std::env::var_os("PATH"),
    };
    find_executable(tool, path_value.as_deref())
}
