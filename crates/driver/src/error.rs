//! Error types for the build driver

use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a pipeline.
///
/// None of these are recoverable: later stages assume all earlier ones
/// fully succeeded, so the driver aborts on the first one it sees.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Unknown argument: {0}")]
    UnknownArgument(String),

    #[error("Invalid arguments: {0}")]
    Usage(String),

    #[error("Invalid value for {option}: {value}. Expected {expected}.")]
    InvalidValue {
        option: String,
        value: String,
        expected: String,
    },

    #[error("Missing path: {}", .0.display())]
    MissingPath(PathBuf),

    #[error("{name} not found. {hint}")]
    MissingTool { name: String, hint: String },

    #[error("Failed to start: {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with exit code {}", display_code(.code))]
    Failed { program: String, code: Option<i32> },

    #[error("Build output not found: {}", .0.display())]
    MissingArtifact(PathBuf),

    #[error("Failed to copy {} -> {}", .from.display(), .to.display())]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[allow(clippy::ref_option)]
fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

impl DriverError {
    /// True for errors raised before any external process could have run.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownArgument(_) | Self::Usage(_) | Self::InvalidValue { .. }
        )
    }
}
