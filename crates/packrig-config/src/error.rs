//! Error types for parameter validation, settings loading and port negotiation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Settings loading errors
    #[error("failed to load transform options from {}: {reason}", .path.display())]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("project config not found: {}", .0.display())]
    ProjectNotFound(PathBuf),

    #[error("invalid config value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    // Parameter validation errors
    #[error("invalid build parameters: {0}")]
    InvalidParameters(String),

    // Port negotiation outcomes
    #[error("port {requested} is in use and switching to port {suggested} was declined")]
    PortNegotiationDeclined { requested: u16, suggested: u16 },

    #[error("no free port found at or above {0}")]
    PortExhausted(u16),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// A declined port switch is an operator decision rather than a failure.
    pub fn is_declined(&self) -> bool {
        matches!(self, ConfigError::PortNegotiationDeclined { .. })
    }

    pub(crate) fn load(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        ConfigError::ConfigLoad {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
