//! Command implementations for the packrig CLI.
//!
//! - [`build`] - application client/server configurations
//! - [`library`] - single-entry library configuration
//!
//! Each command provides an `execute` function that takes the parsed
//! arguments and returns the process exit code.

pub mod build;
pub mod library;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use library::execute as library_execute;
