//! packrig CLI - environment-aware bundler configuration.
//!
//! Wraps `packrig-config` with argument parsing, environment reading,
//! terminal prompting and JSON output.
//!
//! - [`cli`] - clap definitions
//! - [`commands`] - `build` and `library`
//! - [`error`] - CLI error type and miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the port prompt

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result, ResultExt};
