//! Test helpers shared by the unit tests of this crate.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;

use crate::execution::command::{Captured, Invocation, Launcher};
use crate::types::RookResult;

type Effect = Rc<dyn Fn(&Invocation)>;

/// Launcher that records invocations instead of spawning processes.
///
/// Rules are matched against [`Invocation::display`] by substring; the first
/// matching rule wins and unmatched invocations succeed with empty output.
/// Clones share the recorded calls.
#[derive(Default, Clone)]
pub struct RecordingLauncher {
    calls: Rc<RefCell<Vec<Invocation>>>,
    statuses: Vec<(String, i32)>,
    outputs: Vec<(String, String)>,
    effects: Vec<(String, Effect)>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exit with `status` for commands containing `needle`
    pub fn exit_with(mut self, needle: &str, status: i32) -> Self {
        self.statuses.push((needle.to_string(), status));
        self
    }

    /// Print `stdout` for captured commands containing `needle`
    pub fn print(mut self, needle: &str, stdout: &str) -> Self {
        self.outputs.push((needle.to_string(), stdout.to_string()));
        self
    }

    /// Run `effect` whenever a command containing `needle` is launched
    pub fn on(mut self, needle: &str, effect: impl Fn(&Invocation) + 'static) -> Self {
        self.effects.push((needle.to_string(), Rc::new(effect)));
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls.borrow().iter().map(Invocation::display).collect()
    }

    pub fn count_matching(&self, needle: &str) -> usize {
        self.commands().iter().filter(|c| c.contains(needle)).count()
    }

    fn record(&self, invocation: &Invocation) -> i32 {
        let line = invocation.display();
        self.calls.borrow_mut().push(invocation.clone());
        for (needle, effect) in &self.effects {
            if line.contains(needle.as_str()) {
                effect(invocation);
            }
        }
        self.statuses
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, status)| *status)
            .unwrap_or(0)
    }
}

impl Launcher for RecordingLauncher {
    fn status(&self, invocation: &Invocation) -> RookResult<i32> {
        Ok(self.record(invocation))
    }

    fn capture(&self, invocation: &Invocation) -> RookResult<Captured> {
        let status = self.record(invocation);
        let line = invocation.display();
        let stdout = self
            .outputs
            .iter()
            .find(|(needle, _)| line.contains(needle.as_str()))
            .map(|(_, out)| out.clone())
            .unwrap_or_default();
        Ok(Captured { status, stdout })
    }
}

/// Write a `.rook` workspace with the given documents into `root`
pub fn write_workspace(root: &Path, workspace_yml: &str, tasks_yml: &str) {
    let rook_dir = root.join(".rook");
    std::fs::create_dir_all(rook_dir.join("tasks")).unwrap();
    std::fs::write(rook_dir.join("workspace.yml"), workspace_yml).unwrap();
    std::fs::write(rook_dir.join("tasks").join("main.yml"), tasks_yml).unwrap();
}

/// Create an empty executable file
#[cfg(unix)]
pub fn write_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, "#!/bin/sh\n").unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
