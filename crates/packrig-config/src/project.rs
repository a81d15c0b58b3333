//! On-disk project configuration (`packrig.toml`).
//!
//! Sources are layered with figment, later ones winning:
//! 1. built-in defaults
//! 2. `packrig.toml` in the project root, or an explicit TOML/JSON file
//! 3. `PACKRIG_*` environment variables

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized, Toml},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::env_file::DEFAULT_ENV_FILE;
use crate::error::{ConfigError, Result};
use crate::params::{BuildParameters, CopyPattern};
use crate::resolved::{EntryMap, Mode, OutputOptions};

pub const PROJECT_FILE: &str = "packrig.toml";
pub const ENV_PREFIX: &str = "PACKRIG_";

/// Variables under [`ENV_PREFIX`] that are not project settings.
const RESERVED_ENV_KEYS: [&str; 1] = ["config"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    pub alias: IndexMap<String, PathBuf>,
    pub copy: Vec<CopyPattern>,
    pub client_entry: Option<EntryMap>,
    pub server_entry: Option<EntryMap>,
    pub client_externals: Vec<String>,
    pub client_disable_module: bool,
    pub client_output: Option<OutputOptions>,
    pub only_emit_client: bool,
    pub no_split_chunks: bool,
    pub on_lambda: bool,
    pub has_module_metadata: bool,
    pub module_federation: Option<Value>,
    pub transform_options_path: Option<PathBuf>,
    /// Attach crash-reporting settings from the environment to remote builds
    pub telemetry: bool,
    pub env_file: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            alias: IndexMap::new(),
            copy: Vec::new(),
            client_entry: None,
            server_entry: None,
            client_externals: Vec::new(),
            client_disable_module: false,
            client_output: None,
            only_emit_client: false,
            no_split_chunks: false,
            on_lambda: false,
            has_module_metadata: false,
            module_federation: None,
            transform_options_path: None,
            telemetry: true,
            env_file: PathBuf::from(DEFAULT_ENV_FILE),
        }
    }
}

impl ProjectConfig {
    /// Load the layered project configuration for `root`.
    ///
    /// An explicit file must exist; the conventional `packrig.toml` is
    /// optional. Files ending in `.json` are read as JSON, anything else as
    /// TOML.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let file = match explicit {
            Some(path) => {
                let path = root.join(path);
                if !path.is_file() {
                    return Err(ConfigError::ProjectNotFound(path));
                }
                Some(path)
            }
            None => {
                let path = root.join(PROJECT_FILE);
                path.is_file().then_some(path)
            }
        };

        if let Some(path) = &file {
            debug!(path = %path.display(), "loading project config");
            let is_json = path.extension().is_some_and(|ext| ext == "json");
            figment = if is_json {
                figment.merge(Json::file(path))
            } else {
                figment.merge(Toml::file(path))
            };
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).ignore(&RESERVED_ENV_KEYS));

        figment.extract().map_err(|e| ConfigError::InvalidValue {
            field: file
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "project configuration".to_string()),
            hint: e.to_string(),
        })
    }

    pub fn env_file_path(&self, root: &Path) -> PathBuf {
        root.join(&self.env_file)
    }

    /// Static build parameters for `root`, with every relative path resolved
    /// against it.
    ///
    /// Deployment context, telemetry, port and environment are left at their
    /// defaults for the caller to fill in.
    pub fn into_parameters(self, root: &Path, mode: Mode) -> BuildParameters {
        let rebase_entries = |entries: EntryMap| -> EntryMap {
            entries
                .into_iter()
                .map(|(name, path)| (name, root.join(path)))
                .collect()
        };

        let client_output = self.client_output.map(|mut output| {
            output.path = output.path.map(|path| root.join(path));
            output
        });

        BuildParameters::builder()
            .working_dir(root)
            .mode(mode)
            .maybe_transform_options_path(self.transform_options_path.map(|path| root.join(path)))
            .alias(
                self.alias
                    .into_iter()
                    .map(|(name, path)| (name, root.join(path)))
                    .collect(),
            )
            .copy_patterns(
                self.copy
                    .into_iter()
                    .map(|pattern| CopyPattern {
                        from: pattern.from.rebase(root),
                        to: root.join(pattern.to),
                    })
                    .collect(),
            )
            .maybe_client_entry(self.client_entry.map(rebase_entries))
            .maybe_server_entry(self.server_entry.map(rebase_entries))
            .client_externals(self.client_externals)
            .client_disable_module(self.client_disable_module)
            .maybe_client_output(client_output)
            .only_emit_client(self.only_emit_client)
            .no_split_chunks(self.no_split_chunks)
            .on_lambda(self.on_lambda)
            .has_module_metadata(self.has_module_metadata)
            .maybe_module_federation(self.module_federation)
            .build()
    }
}
