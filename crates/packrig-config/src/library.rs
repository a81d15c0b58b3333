//! Single-entry ES module builds for Node packages.

use std::path::{Path, PathBuf};

use bon::Builder;
use serde_json::json;
use tracing::info;

use crate::error::{ConfigError, Result};
use crate::params::TRANSFORM_OPTIONS_FILE;
use crate::resolved::{
    EntryMap, Experiments, Mode, ModuleOptions, ModuleRule, Optimization, OutputOptions,
    PluginDescriptor, ResolveOptions, ResolvedConfiguration, RuleUse, StatsOptions, Target,
    Variant,
};
use crate::transform;

#[derive(Debug, Clone, Builder)]
pub struct LibraryParameters {
    #[builder(into)]
    pub working_dir: PathBuf,

    /// Entry module; its file stem names the emitted `.mjs` file
    #[builder(into)]
    pub entry: PathBuf,

    #[builder(into)]
    pub transform_options_path: Option<PathBuf>,

    /// Output directory, relative to the working directory
    #[builder(into, default = PathBuf::from("dist"))]
    pub out_dir: PathBuf,
}

/// Output stem of an entry: its file name up to the first `.`.
///
/// `src/handler.test.ts` becomes `handler`.
pub fn entry_stem(entry: &Path) -> Option<&str> {
    let file_name = entry.file_name()?.to_str()?;
    let stem = file_name.split('.').next()?;
    (!stem.is_empty()).then_some(stem)
}

/// Node-targeted, minified ES module build of one entry.
pub fn build_library_config(params: &LibraryParameters) -> Result<ResolvedConfiguration> {
    let stem = entry_stem(&params.entry).ok_or_else(|| {
        ConfigError::InvalidParameters(format!(
            "cannot derive an output name from entry {}",
            params.entry.display()
        ))
    })?;

    let settings_path = params
        .transform_options_path
        .clone()
        .unwrap_or_else(|| params.working_dir.join(TRANSFORM_OPTIONS_FILE));
    let jsc = transform::load(&settings_path)?;

    let mut script = ModuleRule::new(r"\.ts$");
    script.exclude = vec!["node_modules".to_string()];
    script.uses = vec![RuleUse::WithOptions {
        loader: "swc-loader".to_string(),
        options: json!({ "jsc": jsc }),
    }];

    let config = ResolvedConfiguration {
        name: Variant::Server,
        mode: Mode::Production,
        target: Target::Node,
        entry: EntryMap::from([(stem.to_string(), params.working_dir.join(&params.entry))]),
        resolve: ResolveOptions {
            extensions: vec![".ts".to_string(), ".js".to_string()],
            ts_config: params.working_dir.join("tsconfig.json"),
            alias: Default::default(),
        },
        module: ModuleOptions {
            rules: vec![script],
        },
        output: OutputOptions::esm(
            format!("{stem}.mjs"),
            params.working_dir.join(&params.out_dir),
        ),
        optimization: Optimization {
            minimize: true,
            minimizer: vec![PluginDescriptor::SwcJsMinimizer(json!({
                "minimizerOptions": {
                    "compress": { "keep_classnames": true },
                    "mangle": false
                }
            }))],
            split_chunks: None,
        },
        experiments: Experiments {
            output_module: true,
        },
        externals: Vec::new(),
        devtool: "source-map".to_string(),
        stats: StatsOptions::default(),
        performance: None,
        plugins: vec![PluginDescriptor::Clean],
        dev_server: None,
        ignore_warnings: Vec::new(),
    };

    info!(entry = %params.entry.display(), output = %config.output.filename, "resolved library configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_stops_at_first_dot() {
        assert_eq!(entry_stem(Path::new("src/handler.ts")), Some("handler"));
        assert_eq!(entry_stem(Path::new("src/handler.test.ts")), Some("handler"));
        assert_eq!(entry_stem(Path::new("index")), Some("index"));
    }

    #[test]
    fn dotfile_has_no_stem() {
        assert_eq!(entry_stem(Path::new("src/.hidden.ts")), None);
        assert_eq!(entry_stem(Path::new("")), None);
    }
}
