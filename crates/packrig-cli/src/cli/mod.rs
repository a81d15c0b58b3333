//! Command-line interface definition for packrig.
//!
//! - `packrig build` - resolve the client (and server) configuration for the
//!   current environment, optionally handing it to a bundler command
//! - `packrig library` - resolve a single-entry Node library configuration

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, LibraryArgs};

/// packrig - environment-aware bundler configuration
#[derive(Parser, Debug)]
#[command(
    name = "packrig",
    version,
    about = "Resolve bundler configurations for the current environment",
    long_about = "packrig computes rspack/webpack configurations from a project's settings,\n\
                  its .swcrc transform options and the deployment environment, and prints\n\
                  them as JSON or hands them to a bundler command."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
