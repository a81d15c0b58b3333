//! The configuration documents handed to the bundler.
//!
//! Field names serialize in camelCase so the JSON matches the bundler's own
//! option names. Third-party plugins are described, not instantiated.

use std::path::PathBuf;

use indexmap::IndexMap;
use regex::Regex;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tracing::warn;

/// Logical entry name to source file.
pub type EntryMap = IndexMap<String, PathBuf>;

/// One of the artifacts built from the same source tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    Client,
    Server,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Development,
    Production,
}

/// Runtime the emitted code runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Web,
    Node,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfiguration {
    pub name: Variant,
    pub mode: Mode,
    pub target: Target,
    pub entry: EntryMap,
    pub resolve: ResolveOptions,
    pub module: ModuleOptions,
    pub output: OutputOptions,
    pub optimization: Optimization,
    pub experiments: Experiments,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub externals: Vec<String>,
    pub devtool: String,
    pub stats: StatsOptions,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
    pub plugins: Vec<PluginDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dev_server: Option<DevServer>,
    /// Regular expression sources for warnings the bundler should drop.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignore_warnings: Vec<String>,
}

impl ResolvedConfiguration {
    /// First module rule whose `test` matches `path`.
    ///
    /// Rules with an invalid pattern are skipped with a warning.
    pub fn rule_for(&self, path: &str) -> Option<&ModuleRule> {
        self.module.rules.iter().find(|rule| match rule.matches(path) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(test = %rule.test, %err, "skipping module rule with invalid pattern");
                false
            }
        })
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.iter().any(|plugin| plugin.name() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveOptions {
    pub extensions: Vec<String>,
    pub ts_config: PathBuf,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub alias: IndexMap<String, PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleOptions {
    pub rules: Vec<ModuleRule>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRule {
    /// Regular expression source matched against module paths.
    pub test: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<RuleUse>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub rule_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generator: Option<AssetGenerator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parser: Option<AssetParser>,
}

impl ModuleRule {
    pub fn new(test: impl Into<String>) -> Self {
        Self {
            test: test.into(),
            exclude: Vec::new(),
            uses: Vec::new(),
            rule_type: None,
            generator: None,
            parser: None,
        }
    }

    /// Whether `path` matches `test` and none of `exclude`.
    pub fn matches(&self, path: &str) -> Result<bool, regex::Error> {
        for pattern in &self.exclude {
            if Regex::new(pattern)?.is_match(path) {
                return Ok(false);
            }
        }
        Ok(Regex::new(&self.test)?.is_match(path))
    }

    /// Size under which an asset becomes a data URL, if this rule has one.
    pub fn inline_threshold(&self) -> Option<u64> {
        self.parser
            .as_ref()
            .map(|parser| parser.data_url_condition.max_size)
    }

    pub fn is_always_inline(&self) -> bool {
        self.rule_type.as_deref() == Some("asset/inline")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleUse {
    Loader(String),
    WithOptions { loader: String, options: Value },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetGenerator {
    pub filename: String,
    pub emit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetParser {
    pub data_url_condition: DataUrlCondition,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUrlCondition {
    pub max_size: u64,
}

/// Output location and naming. Also accepted as a client override from the
/// project config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_loading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<LibraryOutput>,
}

impl OutputOptions {
    /// Module chunks loaded with `import`, exposed as an ES module library.
    pub fn esm(filename: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            path: Some(path.into()),
            public_path: None,
            chunk_format: Some("module".to_string()),
            chunk_loading: Some("import".to_string()),
            library: Some(LibraryOutput {
                library_type: "module".to_string(),
            }),
        }
    }

    pub fn is_module_format(&self) -> bool {
        self.chunk_format.as_deref() == Some("module")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryOutput {
    #[serde(rename = "type")]
    pub library_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Optimization {
    pub minimize: bool,
    pub minimizer: Vec<PluginDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub split_chunks: Option<SplitChunks>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitChunks {
    pub chunks: String,
    pub min_size: u64,
    pub max_size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Experiments {
    pub output_module: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modules: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_details: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Performance {
    pub hints: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DevServer {
    pub hot: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub history_api_fallback: bool,
    pub open: bool,
}

/// A source/destination pair for the copy plugin, already region-resolved.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyTarget {
    pub from: PathBuf,
    pub to: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentryOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
    pub telemetry: bool,
    /// Deployment environment name, upper-cased.
    pub deploy_env: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_metadata: Option<ModuleMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dsn: Option<String>,
}

/// A bundler plugin by name, with the options it is constructed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "plugin", content = "options")]
pub enum PluginDescriptor {
    #[serde(rename = "NodePolyfillPlugin")]
    NodePolyfill,
    #[serde(rename = "DefinePlugin")]
    Define(IndexMap<String, String>),
    #[serde(rename = "ProvidePlugin")]
    Provide(IndexMap<String, Value>),
    #[serde(rename = "SwcJsMinimizerRspackPlugin")]
    SwcJsMinimizer(Value),
    #[serde(rename = "CopyRspackPlugin")]
    Copy { patterns: Vec<CopyTarget> },
    #[serde(rename = "SentryWebpackPlugin")]
    Sentry(SentryOptions),
    #[serde(rename = "ForkTsCheckerWebpackPlugin")]
    ForkTsChecker(Value),
    #[serde(rename = "ESLintPlugin")]
    EsLint(Value),
    #[serde(rename = "ReactRefreshPlugin")]
    ReactRefresh,
    #[serde(rename = "CssExtractRspackPlugin", rename_all = "camelCase")]
    CssExtract {
        filename: String,
        chunk_filename: String,
    },
    #[serde(rename = "ModuleFederationPlugin")]
    ModuleFederation(Value),
    #[serde(rename = "CleanWebpackPlugin")]
    Clean,
}

impl PluginDescriptor {
    pub fn name(&self) -> &'static str {
        match self {
            PluginDescriptor::NodePolyfill => "NodePolyfillPlugin",
            PluginDescriptor::Define(_) => "DefinePlugin",
            PluginDescriptor::Provide(_) => "ProvidePlugin",
            PluginDescriptor::SwcJsMinimizer(_) => "SwcJsMinimizerRspackPlugin",
            PluginDescriptor::Copy { .. } => "CopyRspackPlugin",
            PluginDescriptor::Sentry(_) => "SentryWebpackPlugin",
            PluginDescriptor::ForkTsChecker(_) => "ForkTsCheckerWebpackPlugin",
            PluginDescriptor::EsLint(_) => "ESLintPlugin",
            PluginDescriptor::ReactRefresh => "ReactRefreshPlugin",
            PluginDescriptor::CssExtract { .. } => "CssExtractRspackPlugin",
            PluginDescriptor::ModuleFederation(_) => "ModuleFederationPlugin",
            PluginDescriptor::Clean => "CleanWebpackPlugin",
        }
    }
}

/// What one factory invocation produces.
///
/// Serializes as a single object or as a `[client, server]` array, the two
/// shapes a bundler config module may export.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutput {
    Single(Box<ResolvedConfiguration>),
    Pair {
        client: Box<ResolvedConfiguration>,
        server: Box<ResolvedConfiguration>,
    },
}

impl BuildOutput {
    pub fn len(&self) -> usize {
        match self {
            BuildOutput::Single(_) => 1,
            BuildOutput::Pair { .. } => 2,
        }
    }

    pub fn client(&self) -> &ResolvedConfiguration {
        match self {
            BuildOutput::Single(client) | BuildOutput::Pair { client, .. } => client.as_ref(),
        }
    }

    pub fn server(&self) -> Option<&ResolvedConfiguration> {
        match self {
            BuildOutput::Single(_) => None,
            BuildOutput::Pair { server, .. } => Some(server.as_ref()),
        }
    }

    pub fn configs(&self) -> Vec<&ResolvedConfiguration> {
        match self {
            BuildOutput::Single(client) => vec![client.as_ref()],
            BuildOutput::Pair { client, server } => vec![client.as_ref(), server.as_ref()],
        }
    }
}

impl Serialize for BuildOutput {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BuildOutput::Single(config) => config.serialize(serializer),
            BuildOutput::Pair { client, server } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(client)?;
                seq.serialize_element(server)?;
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_matching_honours_exclude() {
        let mut rule = ModuleRule::new(r"\.ts$");
        rule.exclude = vec!["node_modules".to_string()];
        assert!(rule.matches("src/index.ts").unwrap());
        assert!(!rule.matches("node_modules/pkg/index.ts").unwrap());
        assert!(!rule.matches("src/index.tsx").unwrap());
    }

    #[test]
    fn invalid_rule_pattern_is_an_error() {
        let mut rule = ModuleRule::new(r"\.(ts$");
        assert!(rule.matches("src/index.ts").is_err());

        rule.test = r"\.ts$".to_string();
        rule.exclude = vec!["[".to_string()];
        assert!(rule.matches("src/index.ts").is_err());
    }

    #[test]
    fn plugin_descriptor_uses_bundler_names() {
        let plugin = PluginDescriptor::CssExtract {
            filename: "[name].css".into(),
            chunk_filename: "[id].css".into(),
        };
        let value = serde_json::to_value(&plugin).unwrap();
        assert_eq!(value["plugin"], json!("CssExtractRspackPlugin"));
        assert_eq!(value["options"]["chunkFilename"], json!("[id].css"));
        assert_eq!(plugin.name(), "CssExtractRspackPlugin");

        let unit = serde_json::to_value(PluginDescriptor::ReactRefresh).unwrap();
        assert_eq!(unit, json!({ "plugin": "ReactRefreshPlugin" }));
    }

    #[test]
    fn rule_use_serializes_plain_or_with_options() {
        let plain = serde_json::to_value(RuleUse::Loader("css-loader".into())).unwrap();
        assert_eq!(plain, json!("css-loader"));

        let with_options = serde_json::to_value(RuleUse::WithOptions {
            loader: "swc-loader".into(),
            options: json!({ "jsc": {} }),
        })
        .unwrap();
        assert_eq!(with_options["loader"], json!("swc-loader"));
    }

    #[test]
    fn esm_output_shape() {
        let output = OutputOptions::esm("[name].mjs", "dist");
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["chunkFormat"], json!("module"));
        assert_eq!(value["chunkLoading"], json!("import"));
        assert_eq!(value["library"]["type"], json!("module"));
        assert!(value.get("publicPath").is_none());
        assert!(output.is_module_format());
    }

    #[test]
    fn client_output_override_deserializes() {
        let output: OutputOptions = serde_json::from_value(json!({
            "filename": "app.js",
            "publicPath": "/assets/"
        }))
        .unwrap();
        assert_eq!(output.filename, "app.js");
        assert_eq!(output.public_path.as_deref(), Some("/assets/"));
        assert!(output.path.is_none());
    }
}
