// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The variants follow how each failure is treated at runtime:
//! - `ConfigError` is fatal at startup, before any watch is registered.
//! - `CompileError` is recovered by the rebuild loop (logged, retried on the
//!   next relevant change).
//! - `PublishError` and everything else propagate and stop the process.
//! - `WatchRegistration` is logged and the offending path skipped.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StylewatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Compile error: {0}")]
    CompileError(String),

    #[error("Publish error: {0}")]
    PublishError(String),

    #[error("cannot watch {path:?}: {reason}")]
    WatchRegistration { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StylewatchError {
    /// Whether the rebuild loop may absorb this error and keep watching.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StylewatchError::CompileError(_))
    }
}

pub type Result<T> = std::result::Result<T, StylewatchError>;
