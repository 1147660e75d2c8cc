// src/errors.rs

//! Crate-wide error type and the exit-code taxonomy shared by every tool.
//!
//! Each variant maps to one numbered exit code (see [`HoldonError::exit_code`]).
//! Failures inside an operation carry `{operation, context, source}` so the
//! message names what was being done and on which file or process.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoldonError {
    #[error("missing target directory")]
    MissingTarget,

    #[error("invalid target: {0:?} is not a directory")]
    InvalidTarget(PathBuf),

    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("missing value: {0}")]
    MissingValue(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("conflicting options: {0}")]
    ConflictingOptions(String),

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("missing dependency: {0} not found on this host")]
    MissingDependency(String),

    #[error("already running: {0}")]
    AlreadyRunning(String),

    #[error("refusing to overwrite existing log {0:?}")]
    OverwritePrevented(PathBuf),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("no log file matching {pattern} in {dir:?}")]
    NoLogFound { pattern: String, dir: PathBuf },

    #[error("failed to launch detached job: {0}")]
    LaunchFailed(#[source] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("{operation} failed ({context}): {source}")]
    Operation {
        operation: &'static str,
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl HoldonError {
    /// Wrap an I/O error with the operation and the subject it was acting on.
    pub fn io(operation: &'static str, context: impl Into<String>, source: std::io::Error) -> Self {
        HoldonError::Operation {
            operation,
            context: context.into(),
            source,
        }
    }

    /// Process exit code for this error, following the suite-wide table.
    pub fn exit_code(&self) -> i32 {
        match self {
            HoldonError::MissingTarget => 1,
            HoldonError::InvalidTarget(_) => 2,
            HoldonError::UnknownOption(_) => 3,
            HoldonError::MissingValue(_) => 4,
            HoldonError::InvalidValue(_) => 5,
            HoldonError::ConflictingOptions(_) => 6,
            HoldonError::UnexpectedArgument(_) => 7,
            HoldonError::MissingDependency(_) => 11,
            HoldonError::AlreadyRunning(_) => 12,
            HoldonError::OverwritePrevented(_) => 13,
            HoldonError::Unsupported(_) => 14,
            HoldonError::FileNotFound(_) | HoldonError::NoLogFound { .. } => 15,
            HoldonError::LaunchFailed(_) => 101,
            HoldonError::ConfigError(_) | HoldonError::TomlError(_) => 102,
            HoldonError::Operation { .. } => 103,
            HoldonError::Other(_) => 255,
        }
    }
}

/// Extension for attaching operation context to `std::io::Result`.
pub trait IoContext<T> {
    fn op(self, operation: &'static str, context: impl FnOnce() -> String) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn op(self, operation: &'static str, context: impl FnOnce() -> String) -> Result<T> {
        self.map_err(|e| HoldonError::io(operation, context(), e))
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, HoldonError>;
