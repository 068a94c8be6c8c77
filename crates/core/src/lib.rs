//! Rook Core Library
//!
//! This is the core library for the rook task runner. It loads declarative
//! target definitions, resolves their prerequisites, provisions isolated tool
//! environments and runs everything sequentially, failing fast.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`workspace_manager`] - High-level interface over a loaded `.rook` workspace
//! - [`execution`] - Subprocess launching, plan resolution and the task runner
//! - [`environment`] - Environment provisioning policies and scoped activation
//! - [`variables`] - Lazily evaluated variables and `${...}` interpolation
//! - [`tools`] - Required tool lookup and bootstrap
//! - [`tasks`] - Target model and color management
//! - [`configs`] - Configuration parsing for workspace and task files
//! - [`results`] - Result types for workspace operations
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
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
//! for target in manager.list_targets(false) {
//!     println!("{}", target.name);
//! }
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod environment;
pub mod execution;
pub mod platform;
pub mod results;
pub mod tasks;
pub mod tools;
pub mod types;
pub mod variables;
pub mod workspace_manager;

#[cfg(test)]
pub(crate) mod testutil;

// Re-export the main types for easier usage
pub use types::{RookError, RookResult};
pub use workspace_manager::{WorkspaceManager, WorkspaceManagerConfig};
