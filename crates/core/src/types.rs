use thiserror::Error;

/// Exit code reported for every failure that is not a failing step.
pub const GENERIC_FAILURE_CODE: i32 = 2;

/// The main error type for rook operations
#[derive(Debug, Error)]
pub enum RookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    /// A lazily evaluated value resolved to something unusable at the point of use
    #[error("Configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("Required tool '{tool}' is not available")]
    ToolMissing { tool: String },

    #[error("Failed to provision environment '{environment}': {reason}")]
    Provisioning {
        environment: String,
        reason: String,
        /// Exit status of the failing provisioning subprocess, if one failed
        status: Option<i32>,
    },

    #[error("Target '{target}' failed with exit code {status}")]
    StepFailure { target: String, status: i32 },
}

impl RookError {
    /// Process exit code for this error.
    ///
    /// A failing step or provisioning subprocess propagates its own status
    /// unchanged, everything else reports [`GENERIC_FAILURE_CODE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            RookError::StepFailure { status, .. } => *status,
            RookError::Provisioning {
                status: Some(status),
                ..
            } => *status,
            _ => GENERIC_FAILURE_CODE,
        }
    }
}

/// Result type alias for rook operations
pub type RookResult<T> = Result<T, RookError>;
