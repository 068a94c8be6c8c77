//! Declarative configuration read from the `.rook` directory
//!
//! - [`workspace`] - `.rook/workspace.yml`: variables, environments and tools
//! - [`tasks`] - `.rook/tasks/*.yml`: target declarations
//! - [`environment`] - environment declarations and their provisioning policy

pub mod environment;
pub mod tasks;
pub mod workspace;
