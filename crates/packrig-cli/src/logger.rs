//! Logging setup for the packrig CLI.
//!
//! Logs go to stderr so stdout stays reserved for the resolved JSON.
//!
//! # Example
//!
//! ```rust,no_run
//! use packrig_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//! info!("resolving configuration");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "packrig=debug,packrig_config=debug,packrig_cli=debug";
const QUIET_FILTER: &str = "packrig=error,packrig_config=error,packrig_cli=error";
const DEFAULT_FILTER: &str = "packrig=info,packrig_config=info,packrig_cli=info";

/// Initialize the tracing subscriber.
///
/// Call once at startup, before anything logs.
///
/// # Arguments
///
/// * `verbose` - Debug-level logging for packrig crates (overrides `quiet`)
/// * `quiet` - Only show error-level logs
/// * `no_color` - Disable ANSI colors in log lines
///
/// # Verbosity Levels
///
/// The level is chosen in this order:
/// 1. `--verbose`: debug for packrig crates
/// 2. `--quiet`: errors only
/// 3. `RUST_LOG`
/// 4. info for packrig crates
///
/// # Examples
///
/// ```rust,no_run
/// use packrig_cli::logger::init_logger;
///
/// // Debug logging without colors, as `packrig --verbose --no-color` does
/// init_logger(true, false, true);
/// ```
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

/// Filter for the given flags; `RUST_LOG` only applies when neither is set.
fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}
