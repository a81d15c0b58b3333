//! `packrig build`: resolve the application configuration.
//!
//! # Process
//!
//! 1. Resolve the project root and load the layered project config
//! 2. Apply command-line overrides
//! 3. Read the deployment context, telemetry settings and env file
//! 4. Run the factory (settings load, port negotiation, variants)
//! 5. Write the JSON, then optionally run the bundler with it

use std::path::Path;
use std::process::ExitCode;

use packrig_config::{
    AutoConfirm, BuildConfigFactory, BuildParameters, ConfirmationProvider, DeploymentContext,
    FactoryOutput, Mode, PortNegotiation, ProjectConfig, TcpPortProbe, TelemetrySettings,
    env_file,
};
use tokio::process::Command;
use tracing::{debug, info};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::{CliError, Result};
use crate::ui;

/// Execute the build command.
///
/// Returns the bundler's exit code when a bundler command was given.
pub async fn execute(args: BuildArgs) -> Result<ExitCode> {
    let root = utils::resolve_project_root(args.cwd.as_deref())?;
    let params = load_parameters(&root, &args)?;

    let mut confirm: Box<dyn ConfirmationProvider> = if args.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(ui::TerminalConfirmation::default())
    };

    let output =
        BuildConfigFactory::new(params, TcpPortProbe::default(), &mut *confirm).build()?;
    report_port(output.port);

    let out = args.out.as_deref().map(|path| utils::resolve_path(path, &root));
    utils::write_json(&output.configuration, out.as_deref())?;

    match (args.bundler.split_first(), out) {
        (Some((program, rest)), Some(out)) => run_bundler(program, rest, &root, &out, &output).await,
        _ => Ok(ExitCode::SUCCESS),
    }
}

/// Project config, command-line overrides and environment, as factory input.
pub fn load_parameters(root: &Path, args: &BuildArgs) -> Result<BuildParameters> {
    let project = ProjectConfig::load(root, args.config.as_deref())?;

    let mode = Mode::from_mode_arg(&args.mode);
    let telemetry = project.telemetry;
    let env_file_path = project.env_file_path(root);

    let mut params = project.into_parameters(root, mode);

    if let Some(swcrc) = &args.swcrc {
        params.transform_options_path = Some(utils::resolve_path(swcrc, root));
    }
    params.only_emit_client |= args.only_client;
    params.on_lambda |= args.lambda;
    params.no_split_chunks |= args.no_split_chunks;

    params.deployment = DeploymentContext::from_env();
    params.telemetry = telemetry.then(TelemetrySettings::from_env);
    params.environment = utils::environment_snapshot();
    params.env_file = env_file::load(&env_file_path)?;
    params.requested_port = utils::requested_port(
        utils::port_variable(&params.environment, &params.env_file),
    );

    debug!(
        mode = ?params.mode,
        deployment = ?params.deployment,
        port = ?params.requested_port,
        "build parameters ready"
    );
    Ok(params)
}

fn report_port(port: Option<PortNegotiation>) {
    if let Some(PortNegotiation::Switched { requested, port }) = port {
        ui::info(&format!("Port {requested} is in use; using port {port}"));
    }
}

async fn run_bundler(
    program: &str,
    args: &[String],
    root: &Path,
    config_path: &Path,
    output: &FactoryOutput,
) -> Result<ExitCode> {
    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(root)
        .env("PACKRIG_CONFIG", config_path);
    if let Some(negotiation) = output.port {
        command.env("PORT", negotiation.port().to_string());
    }

    info!(program, ?args, "running bundler");
    let status = command.status().await.map_err(|source| CliError::Bundler {
        program: program.to_string(),
        source,
    })?;

    debug!(%status, "bundler exited");
    Ok(status
        .code()
        .and_then(|code| u8::try_from(code).ok())
        .map(ExitCode::from)
        .unwrap_or(ExitCode::FAILURE))
}
