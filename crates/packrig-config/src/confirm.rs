//! Operator confirmation, abstracted so non-interactive callers can answer.

/// Asks the operator a yes/no question.
pub trait ConfirmationProvider {
    /// Returns `true` only for an affirmative answer.
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<C: ConfirmationProvider + ?Sized> ConfirmationProvider for &mut C {
    fn confirm(&mut self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }
}

/// Whether a typed answer counts as "yes".
///
/// Only `y` (any case, surrounding whitespace ignored) is affirmative; even
/// `yes` declines.
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase() == "y"
}

/// Answers every question the same way (CI, `--yes`, tests).
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmationProvider for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

/// Replays a fixed typed answer and records the prompts it was shown.
#[derive(Debug, Clone, Default)]
pub struct ScriptedAnswer {
    answer: String,
    prompts: Vec<String>,
}

impl ScriptedAnswer {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Vec::new(),
        }
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }
}

impl ConfirmationProvider for ScriptedAnswer {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        is_affirmative(&self.answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        assert!(is_affirmative("y"));
        assert!(is_affirmative("Y"));
        assert!(is_affirmative("  y\n"));
    }

    #[test]
    fn everything_else_declines() {
        for answer in ["", "n", "yes", "Yes", "yy", "ok", "\n"] {
            assert!(!is_affirmative(answer), "{answer:?} should decline");
        }
    }

    #[test]
    fn scripted_answer_records_prompts() {
        let mut provider = ScriptedAnswer::new("y");
        assert!(provider.confirm("continue?"));
        assert_eq!(provider.prompts(), ["continue?".to_string()]);
    }
}
