//! Terminal output: coloured status lines and the port prompt.
//!
//! Everything here writes to stderr.
//!
//! # Examples
//!
//! ```no_run
//! use packrig_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("Wrote dist/packrig.json");
//! ui::warning("PORT is not a number; ignoring it");
//! ```

mod messages;
mod prompt;

use std::sync::atomic::{AtomicBool, Ordering};

pub use messages::{error, info, success, warning};
pub use prompt::TerminalConfirmation;

static COLORS: AtomicBool = AtomicBool::new(true);

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR, then falls back to terminal detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::user_attended_stderr()
}

/// Decide once, at startup, whether status lines are coloured.
///
/// # Arguments
///
/// * `no_color` - The `--no-color` flag; wins over `FORCE_COLOR`
///
/// # Examples
///
/// ```no_run
/// use packrig_cli::ui;
///
/// ui::init_colors(true);
/// ui::info("plain output");
/// ```
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
