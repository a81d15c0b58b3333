//! The build configuration factory.
//!
//! Turns one [`BuildParameters`] into the client configuration, or the
//! client/server pair, for the external bundler.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::confirm::ConfirmationProvider;
use crate::context::Execution;
use crate::error::{ConfigError, Result};
use crate::params::BuildParameters;
use crate::port::{PortNegotiation, PortProbe, negotiate_port};
use crate::resolved::{
    AssetGenerator, AssetParser, BuildOutput, CopyTarget, DataUrlCondition, DevServer, EntryMap,
    Experiments, Mode, ModuleMetadata, ModuleOptions, ModuleRule, Optimization, OutputOptions,
    Performance, PluginDescriptor, ResolveOptions, ResolvedConfiguration, RuleUse, SentryOptions,
    SplitChunks, StatsOptions, Target, Variant,
};
use crate::transform::{self, TransformOptions};

/// Images below this size are inlined as data URLs.
pub const ASSET_INLINE_LIMIT: u64 = 10 * 1024;

pub const SPLIT_CHUNKS_MIN_SIZE: u64 = 3 * 1024 * 1024;
pub const SPLIT_CHUNKS_MAX_SIZE: u64 = 5 * 1024 * 1024;

/// Source-language extensions resolve before plain scripts.
pub const RESOLVE_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

pub const IMAGE_TEST: &str = r"\.(png|jpg|gif|ico)$";
pub const FONT_TEST: &str = r"\.(woff|woff2)$";

const TS_CONFIG_FILE: &str = "tsconfig.json";
const DEFAULT_CLIENT_ENTRY: &str = "src/client/index.tsx";
const DEFAULT_SERVER_ENTRY: &str = "src/server/index.ts";
const DEFAULT_LAMBDA_ENTRY: &str = "src/server/lambda.ts";
const CSS_EXTRACT_LOADER: &str = "CssExtractRspackPlugin.loader";
const PORT_VARIABLE: &str = "PORT";

/// Everything one invocation hands back to its caller.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryOutput {
    pub configuration: BuildOutput,
    /// Present when a dev-server port was requested.
    pub port: Option<PortNegotiation>,
}

/// Builds bundler configurations from [`BuildParameters`].
///
/// Port probing and operator confirmation are injected so the factory is a
/// function of its inputs.
///
/// # Example
///
/// ```no_run
/// use packrig_config::{AutoConfirm, BuildConfigFactory, BuildParameters, Mode, TcpPortProbe};
///
/// let params = BuildParameters::builder()
///     .working_dir(".")
///     .mode(Mode::Production)
///     .build();
///
/// let output = BuildConfigFactory::new(params, TcpPortProbe::default(), AutoConfirm(false))
///     .build()
///     .unwrap();
/// assert_eq!(output.configuration.len(), 2);
/// ```
pub struct BuildConfigFactory<P, C> {
    params: BuildParameters,
    probe: P,
    confirm: C,
}

impl<P: PortProbe, C: ConfirmationProvider> BuildConfigFactory<P, C> {
    pub fn new(params: BuildParameters, probe: P, confirm: C) -> Self {
        Self {
            params,
            probe,
            confirm,
        }
    }

    /// Run the factory.
    ///
    /// Settings are loaded before any port is probed, so a broken settings
    /// file aborts without side effects.
    #[instrument(skip(self), fields(mode = ?self.params.mode))]
    pub fn build(mut self) -> Result<FactoryOutput> {
        self.params.validate()?;

        let settings_path = self.params.transform_options_file();
        let base = transform::load(&settings_path)?;

        let port = negotiate_port(self.params.requested_port, &self.probe, &mut self.confirm)?;

        let builder = VariantBuilder {
            params: &self.params,
            base: &base,
            port: port.map(|negotiation| negotiation.port()),
        };

        let client = builder.client()?;
        let configuration = if self.params.is_development() || self.params.only_emit_client {
            BuildOutput::Single(Box::new(client))
        } else {
            BuildOutput::Pair {
                client: Box::new(client),
                server: Box::new(builder.server()),
            }
        };

        info!(variants = configuration.len(), "resolved build configuration");
        Ok(FactoryOutput {
            configuration,
            port,
        })
    }
}

/// Assembles individual variants. Holds only shared, read-only inputs.
struct VariantBuilder<'a> {
    params: &'a BuildParameters,
    base: &'a TransformOptions,
    port: Option<u16>,
}

impl VariantBuilder<'_> {
    fn client(&self) -> Result<ResolvedConfiguration> {
        let params = self.params;
        let development = params.is_development();
        let mode = params.mode;

        let mut rules = self.shared_rules(Variant::Client, development);
        rules.push(css_rule(vec![
            RuleUse::Loader("style-loader".to_string()),
            RuleUse::Loader("css-loader".to_string()),
        ]));

        let mut plugins = self.production_plugins();
        if let Some(federation) = &params.module_federation {
            plugins.push(PluginDescriptor::ModuleFederation(federation.clone()));
        }
        if !params.on_lambda {
            plugins.push(PluginDescriptor::Provide(IndexMap::from([(
                "process".to_string(),
                json!("process/browser.js"),
            )])));
        }

        let mut optimization = Optimization {
            minimize: !development,
            minimizer: vec![PluginDescriptor::SwcJsMinimizer(json!({}))],
            split_chunks: None,
        };
        let mut dev_server = None;

        if development {
            dev_server = Some(DevServer {
                hot: true,
                port: self.port,
                history_api_fallback: true,
                open: true,
            });
            plugins.extend(development_plugins());
        } else {
            if !params.no_split_chunks {
                optimization.split_chunks = Some(SplitChunks {
                    chunks: "all".to_string(),
                    min_size: SPLIT_CHUNKS_MIN_SIZE,
                    max_size: SPLIT_CHUNKS_MAX_SIZE,
                });
            }
            if !params.copy_patterns.is_empty() {
                plugins.push(self.copy_plugin());
            }
            if let Some(sentry) = self.telemetry_plugin()? {
                plugins.push(sentry);
            }
        }

        let output = params.client_output.clone().unwrap_or_else(|| OutputOptions {
            filename: if development {
                "[name].js".to_string()
            } else {
                "[name].[contenthash].mjs".to_string()
            },
            path: Some(params.working_dir.join("dist").join("static")),
            public_path: development.then(|| "/".to_string()),
            ..OutputOptions::default()
        });

        let config = ResolvedConfiguration {
            name: Variant::Client,
            mode,
            target: if params.on_lambda {
                Target::Node
            } else {
                Target::Web
            },
            entry: params.client_entry.clone().unwrap_or_else(|| {
                self.default_entry("client", DEFAULT_CLIENT_ENTRY)
            }),
            resolve: self.resolve_options(),
            module: ModuleOptions { rules },
            output,
            optimization,
            experiments: Experiments {
                output_module: !params.client_disable_module,
            },
            externals: params.client_externals.clone(),
            devtool: if development {
                "source-map".to_string()
            } else {
                "hidden-source-map".to_string()
            },
            stats: StatsOptions {
                modules: Some(false),
                performance: Some(false),
                error_details: None,
            },
            performance: Some(Performance { hints: false }),
            plugins,
            dev_server,
            ignore_warnings: Vec::new(),
        };

        debug!(
            plugins = config.plugins.len(),
            rules = config.module.rules.len(),
            "assembled client configuration"
        );
        Ok(config)
    }

    fn server(&self) -> ResolvedConfiguration {
        let params = self.params;

        let mut rules = self.shared_rules(Variant::Server, false);
        let mut css = css_rule(vec![
            RuleUse::WithOptions {
                loader: CSS_EXTRACT_LOADER.to_string(),
                options: json!({ "publicPath": "./public" }),
            },
            RuleUse::Loader("css-loader".to_string()),
        ]);
        css.rule_type = Some("javascript/auto".to_string());
        rules.push(css);

        let mut plugins = self.production_plugins();
        plugins.push(PluginDescriptor::CssExtract {
            filename: "[name].css".to_string(),
            chunk_filename: "[id].css".to_string(),
        });

        let entry = params.server_entry.clone().unwrap_or_else(|| {
            match params.deployment.execution {
                Execution::Local => self.default_entry("index", DEFAULT_SERVER_ENTRY),
                Execution::Remote => self.default_entry("lambda", DEFAULT_LAMBDA_ENTRY),
            }
        });

        let config = ResolvedConfiguration {
            name: Variant::Server,
            mode: Mode::Production,
            target: Target::Node,
            entry,
            resolve: self.resolve_options(),
            module: ModuleOptions { rules },
            output: OutputOptions::esm("[name].mjs", params.working_dir.join("dist")),
            optimization: Optimization {
                minimize: true,
                minimizer: vec![PluginDescriptor::SwcJsMinimizer(json!({}))],
                split_chunks: None,
            },
            experiments: Experiments {
                output_module: true,
            },
            externals: Vec::new(),
            devtool: "source-map".to_string(),
            stats: StatsOptions {
                modules: Some(false),
                performance: None,
                error_details: Some(true),
            },
            performance: None,
            plugins,
            dev_server: None,
            ignore_warnings: vec!["^(?!CriticalDependenciesWarning$)".to_string()],
        };

        debug!(plugins = config.plugins.len(), "assembled server configuration");
        config
    }

    fn default_entry(&self, name: &str, relative: &str) -> EntryMap {
        EntryMap::from([(name.to_string(), self.params.resolve_path(Path::new(relative)))])
    }

    fn resolve_options(&self) -> ResolveOptions {
        let ts_config = self.params.working_dir.join(TS_CONFIG_FILE);
        debug!(ts_config = %ts_config.display(), "resolving with tsconfig");

        ResolveOptions {
            extensions: RESOLVE_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            ts_config,
            alias: self.params.alias.clone(),
        }
    }

    /// Script, svg, image and font rules common to both variants.
    fn shared_rules(&self, variant: Variant, development: bool) -> Vec<ModuleRule> {
        let options = self.base.for_variant(variant, development);
        let emit = variant == Variant::Client;

        let mut script = ModuleRule::new(r"\.tsx?$");
        script.uses = vec![RuleUse::WithOptions {
            loader: "swc-loader".to_string(),
            options: json!({ "jsc": options }),
        }];

        let mut svg = ModuleRule::new(r"\.svg$");
        svg.uses = vec![RuleUse::WithOptions {
            loader: "@svgr/webpack".to_string(),
            options: json!({
                "svgoConfig": {
                    "plugins": [{
                        "name": "preset-default",
                        "params": { "overrides": { "removeViewBox": false } }
                    }]
                }
            }),
        }];

        let mut images = ModuleRule::new(IMAGE_TEST);
        images.rule_type = Some("asset".to_string());
        images.generator = Some(AssetGenerator {
            filename: "images/[name].[contenthash][ext]".to_string(),
            emit,
        });
        images.parser = Some(AssetParser {
            data_url_condition: DataUrlCondition {
                max_size: ASSET_INLINE_LIMIT,
            },
        });

        let mut fonts = ModuleRule::new(FONT_TEST);
        fonts.rule_type = Some("asset/inline".to_string());
        fonts.generator = Some(AssetGenerator {
            filename: "fonts/[name].[contenthash][ext]".to_string(),
            emit,
        });

        vec![script, svg, images, fonts]
    }

    /// Browser shims; irrelevant when the bundle runs in a serverless function.
    fn production_plugins(&self) -> Vec<PluginDescriptor> {
        if self.params.on_lambda {
            return Vec::new();
        }

        vec![
            PluginDescriptor::NodePolyfill,
            PluginDescriptor::Define(self.env_definitions()),
            PluginDescriptor::Provide(IndexMap::from([(
                "Buffer".to_string(),
                json!(["buffer", "Buffer"]),
            )])),
        ]
    }

    /// `process.env.*` replacements.
    ///
    /// Remote builds expose the whole environment; local builds only the keys
    /// declared in the env file. The process environment wins on conflicts,
    /// and the negotiated port replaces whatever `PORT` held.
    fn env_definitions(&self) -> IndexMap<String, String> {
        let params = self.params;
        let accepted_port = self.port.map(|port| port.to_string());

        let mut keys: Vec<&str> = match params.deployment.execution {
            Execution::Remote => params.environment.keys().map(String::as_str).collect(),
            Execution::Local => params.env_file.keys().map(String::as_str).collect(),
        };
        if accepted_port.is_some()
            && params.deployment.execution == Execution::Remote
            && !keys.contains(&PORT_VARIABLE)
        {
            keys.push(PORT_VARIABLE);
        }

        keys.into_iter()
            .filter_map(|key| {
                let value = match &accepted_port {
                    Some(port) if key == PORT_VARIABLE => port,
                    _ => params
                        .environment
                        .get(key)
                        .or_else(|| params.env_file.get(key))?,
                };
                Some((format!("process.env.{key}"), Value::String(value.clone()).to_string()))
            })
            .collect()
    }

    fn copy_plugin(&self) -> PluginDescriptor {
        let region = self.params.deployment.region;
        let patterns = self
            .params
            .copy_patterns
            .iter()
            .map(|pattern| CopyTarget {
                from: self.params.resolve_path(pattern.from.for_region(region)),
                to: self.params.resolve_path(&pattern.to),
            })
            .collect();

        PluginDescriptor::Copy { patterns }
    }

    /// Crash-reporting upload, only for remote builds that carry settings.
    fn telemetry_plugin(&self) -> Result<Option<PluginDescriptor>> {
        let params = self.params;
        if params.deployment.is_local() {
            return Ok(None);
        }
        let Some(settings) = &params.telemetry else {
            return Ok(None);
        };

        let stage = settings.stage.as_deref().filter(|s| !s.trim().is_empty()).ok_or_else(|| {
            ConfigError::InvalidParameters(
                "remote builds with telemetry need a deployment stage (STAGE)".to_string(),
            )
        })?;

        Ok(Some(PluginDescriptor::Sentry(SentryOptions {
            org: settings.org.clone(),
            project: settings.project.clone(),
            auth_token: settings.auth_token.clone(),
            telemetry: false,
            deploy_env: stage.to_uppercase(),
            module_metadata: params.has_module_metadata.then(|| ModuleMetadata {
                dsn: settings.dsn.clone(),
            }),
        })))
    }
}

fn css_rule(uses: Vec<RuleUse>) -> ModuleRule {
    let mut rule = ModuleRule::new(r"\.css$");
    rule.uses = uses;
    rule
}

fn development_plugins() -> [PluginDescriptor; 3] {
    [
        PluginDescriptor::ForkTsChecker(json!({
            "formatter": { "type": "basic", "pathType": "absolute" },
            "typescript": { "memoryLimit": 8192 }
        })),
        PluginDescriptor::EsLint(json!({
            "cache": true,
            "cacheLocation": ".eslintcache",
            "configType": "flat",
            "extensions": ["ts", "tsx"],
            "exclude": ["node_modules"]
        })),
        PluginDescriptor::ReactRefresh,
    ]
}
