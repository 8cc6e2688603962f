//! Ask for a name, answer with a greeting

use crate::error::Result;
use crate::i18n::Locale;
use crate::workflow::{Phase, Step, Workflow};

/// Suspends with a question until a non-blank name is supplied, then
/// completes with the greeting text.
#[derive(Debug, Clone)]
pub struct Greeting {
    locale: Locale,
    phase: Phase,
}

impl Greeting {
    /// Create a greeting in the given language
    pub fn new(locale: Locale) -> Self {
        Self {
            locale,
            phase: Phase::Fresh,
        }
    }

    fn question(&self) -> String {
        self.locale.name_question().to_string()
    }
}

impl Workflow for Greeting {
    type Request = String;
    type Value = String;
    type Output = String;

    fn name(&self) -> &'static str {
        "greeting"
    }

    fn start(&mut self) -> Result<Step<String, String>> {
        self.phase.begin(self.name())?;
        Ok(Step::Suspend(self.question()))
    }

    fn resume(&mut self, value: String) -> Result<Step<String, String>> {
        self.phase.ensure_suspended(self.name())?;
        let name = value.trim();
        if name.is_empty() {
            return Ok(Step::Suspend(self.question()));
        }
        self.phase.finish();
        Ok(Step::Complete(self.locale.greeting(name)))
    }

    fn is_finished(&self) -> bool {
        self.phase.is_finished()
    }
}
