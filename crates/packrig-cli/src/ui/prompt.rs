//! Interactive yes/no prompt for the port switch.

use console::Term;
use packrig_config::{ConfirmationProvider, is_affirmative};
use tracing::warn;

/// Asks on the terminal. Answers are read from stdin; without a terminal the
/// answer is empty and the question is declined.
#[derive(Debug, Clone)]
pub struct TerminalConfirmation {
    term: Term,
}

impl TerminalConfirmation {
    pub fn new(term: Term) -> Self {
        Self { term }
    }
}

impl Default for TerminalConfirmation {
    fn default() -> Self {
        Self::new(Term::stderr())
    }
}

impl ConfirmationProvider for TerminalConfirmation {
    fn confirm(&mut self, prompt: &str) -> bool {
        if let Err(err) = self.term.write_str(prompt) {
            warn!(error = %err, "could not show prompt");
            return false;
        }

        match self.term.read_line() {
            Ok(answer) => is_affirmative(&answer),
            Err(err) => {
                warn!(error = %err, "could not read answer");
                false
            }
        }
    }
}
