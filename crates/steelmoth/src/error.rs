//! Error types for the Steel Moth builder.

use std::path::PathBuf;

use steelmoth_core::{AttributeRejected, StoreError};

/// Result type alias for builder operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by commands and workbench setup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A document store contract violation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// An element refused an attribute value.
    #[error(transparent)]
    AttributeRejected(#[from] AttributeRejected),

    /// The command is not enabled for the current selection.
    #[error("Command '{command}' is not available for the current selection")]
    Disabled { command: String },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Create a disabled-command error.
    pub fn disabled(command: impl Into<String>) -> Self {
        Self::Disabled {
            command: command.into(),
        }
    }
}

/// Errors from loading or saving [`BuilderConfig`](crate::BuilderConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error.
    #[error("Failed to access config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parse error.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is not usable.
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ConfigError {
    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a value error.
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
