//! packrig - resolve bundler configurations for the current environment.

use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use packrig_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args).await,
        cli::Command::Library(library_args) => commands::library_execute(library_args).await,
    };

    match result {
        Ok(code) => Ok(code),
        Err(err) if err.is_declined() => {
            ui::info(&format!("{err}; exiting"));
            Ok(ExitCode::FAILURE)
        }
        Err(err) => Err(error::cli_error_to_miette(err)),
    }
}
