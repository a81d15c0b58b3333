use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Available packrig subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the application build configuration
    ///
    /// Emits the client configuration in development, and the client/server
    /// pair in production unless --only-client is given.
    Build(BuildArgs),

    /// Resolve a single-entry ES module library configuration
    Library(LibraryArgs),
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Bundler mode; anything other than `production` is a development build
    #[arg(short, long, default_value = "development", value_name = "MODE")]
    pub mode: String,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Project config file, TOML or JSON (default: packrig.toml if present)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Transform options file (default: <cwd>/.swcrc)
    #[arg(long, value_name = "FILE")]
    pub swcrc: Option<PathBuf>,

    /// Emit only the client configuration
    #[arg(long)]
    pub only_client: bool,

    /// Build for a managed serverless function
    #[arg(long)]
    pub lambda: bool,

    /// Disable production chunk splitting
    #[arg(long)]
    pub no_split_chunks: bool,

    /// Accept a different dev-server port without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Write the JSON to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,

    /// Bundler command to run once the configuration is written
    ///
    /// Receives PACKRIG_CONFIG (the --out path) and PORT in its environment.
    ///
    /// Example:
    ///   packrig build --mode production --out dist/rspack.json -- rspack build
    #[arg(last = true, value_name = "BUNDLER", requires = "out")]
    pub bundler: Vec<String>,
}

/// Arguments for the library command
#[derive(Args, Debug)]
pub struct LibraryArgs {
    /// Entry module, relative to --cwd
    #[arg(value_name = "ENTRY")]
    pub entry: PathBuf,

    /// Project root (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Transform options file (default: <cwd>/.swcrc)
    #[arg(long, value_name = "FILE")]
    pub swcrc: Option<PathBuf>,

    /// Write the JSON to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}
