//! Input parameters for one factory invocation.

use std::path::{Path, PathBuf};

use bon::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{DeploymentContext, RegionalPath, TelemetrySettings};
use crate::error::{ConfigError, Result};
use crate::resolved::{EntryMap, Mode, OutputOptions};

/// Conventional settings file name, looked up in the working directory.
pub const TRANSFORM_OPTIONS_FILE: &str = ".swcrc";

impl Mode {
    /// Interpret a bundler `--mode` argument: only `production` is production.
    pub fn from_mode_arg(mode: &str) -> Self {
        if mode == "production" {
            Mode::Production
        } else {
            Mode::Development
        }
    }

    pub fn is_development(self) -> bool {
        self == Mode::Development
    }
}

/// A file or directory the copy plugin mirrors into the output tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyPattern {
    pub from: RegionalPath,
    pub to: PathBuf,
}

/// Everything the factory needs to know about one build.
///
/// # Example
///
/// ```
/// use packrig_config::{BuildParameters, Mode};
///
/// let params = BuildParameters::builder()
///     .working_dir("/srv/app")
///     .mode(Mode::Production)
///     .only_emit_client(true)
///     .build();
///
/// assert_eq!(params.transform_options_file().to_str(), Some("/srv/app/.swcrc"));
/// ```
#[derive(Debug, Clone, Builder)]
pub struct BuildParameters {
    /// Project directory; relative defaults resolve against it.
    #[builder(into)]
    pub working_dir: PathBuf,

    #[builder(default = Mode::Development)]
    pub mode: Mode,

    /// Settings file override (default: `<working_dir>/.swcrc`)
    #[builder(into)]
    pub transform_options_path: Option<PathBuf>,

    /// Import aliases, e.g. `@shared` -> `../shared`
    #[builder(default)]
    pub alias: IndexMap<String, PathBuf>,

    #[builder(default)]
    pub copy_patterns: Vec<CopyPattern>,

    pub client_entry: Option<EntryMap>,

    pub server_entry: Option<EntryMap>,

    #[builder(default)]
    pub client_externals: Vec<String>,

    /// Emit classic scripts instead of ES modules from the client build
    #[builder(default)]
    pub client_disable_module: bool,

    pub client_output: Option<OutputOptions>,

    #[builder(default)]
    pub only_emit_client: bool,

    #[builder(default)]
    pub no_split_chunks: bool,

    /// Deploying to a managed serverless function rather than a browser/server pair
    #[builder(default)]
    pub on_lambda: bool,

    /// Attach the DSN as module metadata in the crash-reporting plugin
    #[builder(default)]
    pub has_module_metadata: bool,

    /// Options for a module federation plugin, passed through verbatim
    pub module_federation: Option<Value>,

    #[builder(default)]
    pub deployment: DeploymentContext,

    /// `None` disables the crash-reporting integration entirely
    pub telemetry: Option<TelemetrySettings>,

    pub requested_port: Option<u16>,

    /// Snapshot of the process environment
    #[builder(default)]
    pub environment: IndexMap<String, String>,

    /// Values parsed from the project's env file
    #[builder(default)]
    pub env_file: IndexMap<String, String>,
}

impl BuildParameters {
    pub fn transform_options_file(&self) -> PathBuf {
        self.transform_options_path
            .clone()
            .unwrap_or_else(|| self.working_dir.join(TRANSFORM_OPTIONS_FILE))
    }

    pub fn is_development(&self) -> bool {
        self.mode.is_development()
    }

    /// Reject parameters the factory cannot build from.
    pub fn validate(&self) -> Result<()> {
        if !self.working_dir.is_dir() {
            return Err(ConfigError::InvalidParameters(format!(
                "working directory does not exist: {}",
                self.working_dir.display()
            )));
        }

        validate_entries("client_entry", self.client_entry.as_ref())?;
        validate_entries("server_entry", self.server_entry.as_ref())?;

        if let Some(name) = self.alias.keys().find(|name| name.trim().is_empty()) {
            return Err(ConfigError::InvalidParameters(format!(
                "alias names cannot be empty (got {name:?})"
            )));
        }

        Ok(())
    }

    pub(crate) fn resolve_path(&self, path: &Path) -> PathBuf {
        self.working_dir.join(path)
    }
}

fn validate_entries(field: &str, entries: Option<&EntryMap>) -> Result<()> {
    let Some(entries) = entries else {
        return Ok(());
    };

    if entries.is_empty() {
        return Err(ConfigError::InvalidParameters(format!(
            "{field} was provided but has no entries"
        )));
    }

    for (name, path) in entries {
        if name.trim().is_empty() {
            return Err(ConfigError::InvalidParameters(format!(
                "{field} contains an entry with an empty name"
            )));
        }
        if path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidParameters(format!(
                "{field} entry '{name}' has an empty path"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn mode_argument_parsing() {
        assert_eq!(Mode::from_mode_arg("production"), Mode::Production);
        assert_eq!(Mode::from_mode_arg("development"), Mode::Development);
        assert_eq!(Mode::from_mode_arg("Production"), Mode::Development);
        assert_eq!(Mode::from_mode_arg(""), Mode::Development);
    }

    #[test]
    fn explicit_settings_path_wins() {
        let params = BuildParameters::builder()
            .working_dir("/repo/project")
            .transform_options_path("/repo/.swcrc")
            .build();
        assert_eq!(params.transform_options_file(), PathBuf::from("/repo/.swcrc"));
    }

    #[test]
    fn missing_working_dir_is_invalid() {
        let params = BuildParameters::builder()
            .working_dir("/definitely/not/here")
            .build();
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidParameters(_))
        ));
    }

    #[test]
    fn empty_explicit_entry_map_is_invalid() {
        let dir = TempDir::new().unwrap();
        let params = BuildParameters::builder()
            .working_dir(dir.path())
            .client_entry(EntryMap::new())
            .build();
        let err = params.validate().unwrap_err();
        assert!(err.to_string().contains("client_entry"));
    }

    #[test]
    fn absent_entry_maps_are_fine() {
        let dir = TempDir::new().unwrap();
        let params = BuildParameters::builder().working_dir(dir.path()).build();
        assert!(params.validate().is_ok());
        assert!(params.is_development());
    }

    #[test]
    fn blank_entry_name_is_invalid() {
        let dir = TempDir::new().unwrap();
        let mut entries = EntryMap::new();
        entries.insert(" ".to_string(), PathBuf::from("src/server/index.ts"));
        let params = BuildParameters::builder()
            .working_dir(dir.path())
            .server_entry(entries)
            .build();
        assert!(params.validate().is_err());
    }
}
