//! Transform (SWC `jsc`) options and the per-variant derivation applied to them.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::resolved::Variant;

/// ECMAScript target forced onto client builds.
pub const CLIENT_ES_TARGET: &str = "es2022";

/// SWC plugin stripping `console.*` calls from production bundles.
pub const REMOVE_CONSOLE_PLUGIN: &str = "@swc/plugin-remove-console";

/// Console methods kept by [`REMOVE_CONSOLE_PLUGIN`].
pub const KEPT_CONSOLE_METHODS: [&str; 3] = ["error", "info", "warn"];

/// The `jsc` section of an `.swcrc` document.
///
/// Only the fields packrig rewrites are typed; everything else round-trips
/// through `rest` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<TransformSection>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<ExperimentalSection>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub react: Option<ReactTransform>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactTransform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh: Option<bool>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentalSection {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<SwcPlugin>,

    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A `[name, options]` pair as SWC expects it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwcPlugin(pub String, pub Value);

#[derive(Debug, Deserialize)]
struct SwcRc {
    jsc: Option<TransformOptions>,
}

/// Read the settings document at `path` and return its `jsc` section.
///
/// Sibling fields of `jsc` are ignored.
pub fn load(path: &Path) -> Result<TransformOptions> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::load(path, e))?;
    let document: SwcRc = serde_json::from_str(&content).map_err(|e| ConfigError::load(path, e))?;
    let options = document
        .jsc
        .ok_or_else(|| ConfigError::load(path, "missing `jsc` section"))?;

    debug!(path = %path.display(), "loaded transform options");
    Ok(options)
}

impl TransformOptions {
    /// Derive the options one variant embeds into its loader rule.
    ///
    /// Works on a copy, so deriving the client never affects the server and
    /// the order of derivation does not matter.
    pub fn for_variant(&self, variant: Variant, development: bool) -> TransformOptions {
        let mut options = self.clone();

        if variant == Variant::Client {
            options.target = Some(CLIENT_ES_TARGET.to_string());
        }

        if development {
            options
                .transform
                .get_or_insert_with(TransformSection::default)
                .react
                .get_or_insert_with(ReactTransform::default)
                .refresh = Some(true);
        } else {
            options
                .experimental
                .get_or_insert_with(ExperimentalSection::default)
                .plugins = vec![remove_console_plugin()];
        }

        options
    }
}

fn remove_console_plugin() -> SwcPlugin {
    SwcPlugin(
        REMOVE_CONSOLE_PLUGIN.to_string(),
        json!({ "exclude": KEPT_CONSOLE_METHODS }),
    )
}
