//! Error types for garimpo.
//!
//! Library crates use [`GarimpoError`] via `thiserror`. Network-facing crates
//! map transport errors into [`GarimpoError::Network`] so this crate stays
//! free of HTTP dependencies.

use std::path::PathBuf;

use crate::types::CategoryCode;

/// Top-level error type for all garimpo operations.
#[derive(Debug, thiserror::Error)]
pub enum GarimpoError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error during crawl or reputation verification.
    #[error("network error: {0}")]
    Network(String),

    /// HTML parsing or snapshot decoding error.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Category code that does not resolve in the directory snapshot.
    #[error("unknown category {code}")]
    UnknownCategory { code: CategoryCode },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (out-of-range knob, malformed code, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, GarimpoError>;

impl GarimpoError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
