//! Target model and color management
//!
//! Converts declared [`TaskConfig`]s into validated [`Target`]s and provides a
//! consistent color per target name for terminal output.

use std::collections::BTreeMap;

use colored::Color;

use crate::configs::tasks::{Command, TaskConfig};
use crate::types::{RookError, RookResult};

/// Prefix naming the provisioning pseudo-target of an environment
pub const ENV_TARGET_PREFIX: &str = "env:";

/// What a target does once its prerequisites have run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Command(Command),
    Script(String),
    /// Destroy the named environments
    Clean(Vec<String>),
    /// Aggregate target: only its prerequisites do work
    Nothing,
}

#[derive(Debug, Clone)]
pub struct Target {
    pub name: String,
    pub help: Option<String>,
    /// Prerequisites in declared order, the implicit environment first
    pub prerequisites: Vec<String>,
    pub action: Action,
    pub environment: Option<String>,
    pub requires: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl Target {
    pub fn from_config(config: TaskConfig) -> RookResult<Self> {
        if config.name.trim().is_empty() {
            return Err(RookError::Config("Target names must not be empty".to_string()));
        }
        if config.name.starts_with(ENV_TARGET_PREFIX) {
            return Err(RookError::Config(format!(
                "Target '{}' uses the reserved '{}' prefix",
                config.name, ENV_TARGET_PREFIX
            )));
        }

        let action = match (config.command, config.script, config.cleans) {
            (Some(command), None, None) => Action::Command(command),
            (None, Some(script), None) => Action::Script(script),
            (None, None, Some(environments)) => Action::Clean(environments),
            (None, None, None) => Action::Nothing,
            _ => {
                return Err(RookError::Config(format!(
                    "Target '{}' must declare at most one of command, script or cleans",
                    config.name
                )))
            }
        };

        let mut prerequisites = Vec::new();
        if let Some(environment) = &config.environment {
            prerequisites.push(environment_target(environment));
        }
        for dep in config.dependencies.unwrap_or_default() {
            if !prerequisites.contains(&dep) {
                prerequisites.push(dep);
            }
        }

        Ok(Self {
            name: config.name,
            help: config
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            prerequisites,
            action,
            environment: config.environment,
            requires: config.requires.unwrap_or_default(),
            env: config.env.unwrap_or_default(),
        })
    }
}

/// Pseudo-target name provisioning `environment`
pub fn environment_target(environment: &str) -> String {
    format!("{}{}", ENV_TARGET_PREFIX, environment)
}

/// Get a consistent color for a target name
pub fn get_target_color(target_name: &str) -> Color {
    // Use a simple hash of the name bytes for consistent colors
    let hash = target_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    // Jewel tones that read as labels rather than log levels
    let colors = [
        Color::TrueColor {
            r: 147,
            g: 112,
            b: 219,
        },
        Color::TrueColor {
            r: 64,
            g: 224,
            b: 208,
        },
        Color::TrueColor {
            r: 255,
            g: 140,
            b: 0,
        },
        Color::TrueColor {
            r: 199,
            g: 21,
            b: 133,
        },
        Color::TrueColor {
            r: 72,
            g: 209,
            b: 204,
        },
        Color::TrueColor {
            r: 138,
            g: 43,
            b: 226,
        },
    ];

    colors[(hash % colors.len() as u64) as usize]
}
