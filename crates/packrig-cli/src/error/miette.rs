//! Miette diagnostic conversion for CLI errors.

use miette::Report;
use packrig_config::ConfigError;

use crate::error::CliError;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Bundler { program, source } => miette::miette!(
            help = "Check that the bundler is installed and on PATH",
            "Failed to run bundler '{}': {}",
            program,
            source
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert ConfigError to miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::ConfigLoad { path, reason } => miette::miette!(
            help = "The settings file must be JSON with a top-level \"jsc\" object; use --swcrc to point elsewhere",
            "Failed to load transform options from {}: {}",
            path.display(),
            reason
        ),
        ConfigError::ProjectNotFound(path) => miette::miette!(
            help = "Check the --config path, or omit it to use packrig.toml",
            "Project config not found: {}",
            path.display()
        ),
        ConfigError::PortExhausted(port) => miette::miette!(
            help = "Free a port or set PORT to a different value",
            "No free port found at or above {}",
            port
        ),
        ConfigError::InvalidValue { field, hint } => {
            miette::miette!(help = hint, "Invalid config value for '{}'", field)
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_config_load_mentions_the_file() {
        let report = config_error_to_miette(ConfigError::ConfigLoad {
            path: PathBuf::from("/app/.swcrc"),
            reason: "missing `jsc` section".into(),
        });
        assert!(report.to_string().contains("/app/.swcrc"));
        assert!(report.help().is_some());
    }

    #[test]
    fn test_other_errors_keep_their_message() {
        let report = cli_error_to_miette(CliError::InvalidArgument("bad PORT".into()));
        assert_eq!(report.to_string(), "Invalid argument: bad PORT");
    }
}
