//! Core error types for deskclock-core.
//!
//! Input rejections are recoverable and carry the offending [`Field`] so the
//! input adapter can clear and refocus it. Nothing in the engine itself is
//! fatal; configuration and IO failures only surface at the edges.

use std::path::PathBuf;
use thiserror::Error;

use crate::input::Field;

/// Core error type for deskclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A rejected timer/alarm entry
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A timer or alarm entry the engine refused to arm.
///
/// No state transition happens when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Field contained something other than ASCII digits (or was empty)
    #[error("{field} must be a number")]
    NotNumeric { field: Field },

    /// Field had more than two digits
    #[error("{field} takes at most 2 digits")]
    TooLong { field: Field },

    /// Value outside the field's range
    #[error("{field} must be between 0 and {max} (got {value})")]
    OutOfRange { field: Field, value: u32, max: u32 },

    /// A countdown of 00:00 cannot be armed
    #[error("countdown must be longer than 00:00")]
    ZeroDuration,

    /// Entry is malformed as a whole (e.g. missing the ':' separator)
    #[error("expected two fields separated by ':' (got '{0}')")]
    Malformed(String),

    /// Confirmation arrived while no matching form was open
    #[error("not waiting for {0} input")]
    NotAwaiting(&'static str),
}

impl InputError {
    /// The field the input adapter should clear and refocus, if any.
    pub fn field(&self) -> Option<Field> {
        match self {
            InputError::NotNumeric { field }
            | InputError::TooLong { field }
            | InputError::OutOfRange { field, .. } => Some(*field),
            InputError::ZeroDuration => Some(Field::Minute),
            InputError::Malformed(_) | InputError::NotAwaiting(_) => None,
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
