//! Task execution module
//!
//! This module handles the actual execution of targets including subprocess
//! launching, dependency resolution and fail-fast sequencing.

pub mod command;
pub mod dependencies;
pub mod runner;

pub use command::{Invocation, Launcher, SystemLauncher};
pub use dependencies::{Step, TargetGraph};
pub use runner::{RunContext, TaskRunner};
