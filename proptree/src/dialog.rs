//! Blocking user dialogs.
//!
//! Item management asks the user for names and confirmations and reports
//! validation failures through [`Dialogs`], so the same logic runs against a
//! terminal, a GUI or a scripted fake.

use std::collections::VecDeque;

/// Prompt, confirm and alert, answered synchronously.
pub trait Dialogs {
    /// Ask for a line of text. `None` means the user cancelled.
    fn prompt(&mut self, message: &str) -> Option<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, message: &str) -> bool;

    /// Show a message the user must acknowledge.
    fn alert(&mut self, message: &str);
}

/// Dialogs answered from a prepared script.
///
/// Prompts and confirmations are answered in order; once a script runs out
/// prompts are cancelled and confirmations declined. Every message shown is
/// recorded.
#[derive(Debug, Default, Clone)]
pub struct ScriptedDialogs {
    prompts: VecDeque<Option<String>>,
    confirms: VecDeque<bool>,
    /// Messages passed to [`Dialogs::alert`].
    pub alerts: Vec<String>,
    /// Messages passed to [`Dialogs::prompt`] and [`Dialogs::confirm`].
    pub questions: Vec<String>,
}

impl ScriptedDialogs {
    /// An empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next prompt.
    pub fn answer(mut self, name: impl Into<String>) -> Self {
        self.prompts.push_back(Some(name.into()));
        self
    }

    /// Queue a cancelled prompt.
    pub fn cancel_prompt(mut self) -> Self {
        self.prompts.push_back(None);
        self
    }

    /// Queue an answer for the next confirmation.
    pub fn confirm_with(mut self, yes: bool) -> Self {
        self.confirms.push_back(yes);
        self
    }
}

impl Dialogs for ScriptedDialogs {
    fn prompt(&mut self, message: &str) -> Option<String> {
        self.questions.push(message.to_string());
        self.prompts.pop_front().flatten()
    }

    fn confirm(&mut self, message: &str) -> bool {
        self.questions.push(message.to_string());
        self.confirms.pop_front().unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}

impl<D: Dialogs + ?Sized> Dialogs for &mut D {
    fn prompt(&mut self, message: &str) -> Option<String> {
        (**self).prompt(message)
    }

    fn confirm(&mut self, message: &str) -> bool {
        (**self).confirm(message)
    }

    fn alert(&mut self, message: &str) {
        (**self).alert(message)
    }
}
