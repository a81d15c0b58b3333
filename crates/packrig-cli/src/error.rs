//! Error handling for the packrig CLI.
//!
//! Library failures arrive as [`packrig_config::ConfigError`] and are wrapped
//! in [`CliError`] next to the failures only the CLI can hit: bad arguments,
//! output files and the bundler child process.
//!
//! # Example
//!
//! ```rust,no_run
//! use packrig_cli::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_output(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod miette;

use std::path::PathBuf;

use thiserror::Error;

pub use self::miette::cli_error_to_miette;
pub use packrig_config::ConfigError;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Parameter, settings or port negotiation failures from the factory
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Invalid command-line arguments or environment values
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The bundler command could not be started
    #[error("Failed to run bundler '{program}': {source}")]
    Bundler {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// The operator turned down a port switch; not reported as a failure.
    pub fn is_declined(&self) -> bool {
        matches!(self, CliError::Config(err) if err.is_declined())
    }
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_error_from_config_error() {
        let cli_err: CliError = ConfigError::PortExhausted(3000).into();
        assert!(matches!(cli_err, CliError::Config(_)));
        assert_eq!(cli_err.to_string(), "no free port found at or above 3000");
    }

    #[test]
    fn test_declined_port_is_recognised() {
        let declined: CliError = ConfigError::PortNegotiationDeclined {
            requested: 3000,
            suggested: 3001,
        }
        .into();
        assert!(declined.is_declined());
        assert!(!CliError::InvalidArgument("boom".into()).is_declined());
    }

    #[test]
    fn test_result_ext_with_path() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/test/packrig.json").unwrap_err();
        assert!(matches!(err, CliError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_keeps_other_io_errors() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = result.with_path("/test/packrig.json").unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
