//! Platform helpers for locating executables on a search path

use std::env;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

/// Conventions of the current platform that affect executable lookup
#[derive(Debug, Clone)]
pub struct PlatformInfo {
    /// Extensions tried after the bare name (e.g. "exe" on Windows)
    pub executable_extensions: &'static [&'static str],
}

impl PlatformInfo {
    /// Detect the current platform
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Create platform info from an OS string
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self {
                executable_extensions: &["exe", "cmd", "bat", "com"],
            },
            _ => Self {
                executable_extensions: &[],
            },
        }
    }
}

/// Prepend `dir` to a `PATH`-style value
pub fn prepend_path(dir: &Path, existing: Option<&OsStr>) -> OsString {
    let mut entries = vec![dir.to_path_buf()];
    if let Some(existing) = existing {
        entries.extend(env::split_paths(existing));
    }
    // Entries come from an existing PATH plus one directory, so joining only
    // fails if `dir` itself contains the separator.
    env::join_paths(&entries).unwrap_or_else(|_| dir.as_os_str().to_os_string())
}

/// Find `name` on the given `PATH` value.
///
/// Names containing a path separator are checked as given.
pub fn find_executable(name: &str, path_value: Option<&OsStr>) -> Option<PathBuf> {
    let platform = PlatformInfo::current();
    let candidate = Path::new(name);
    if candidate.components().count() > 1 {
        return resolve_candidate(candidate, &platform);
    }

    let path_value = path_value?;
    env::split_paths(path_value)
        .filter(|dir| !dir.as_os_str().is_empty())
        .find_map(|dir| resolve_candidate(&dir.join(name), &platform))
}

fn resolve_candidate(candidate: &Path, platform: &PlatformInfo) -> Option<PathBuf> {
    if is_executable(candidate) {
        return Some(candidate.to_path_buf());
    }
    platform
        .executable_extensions
        .iter()
        .map(|ext| candidate.with_extension(ext))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
