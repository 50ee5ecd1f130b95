//! Terminal dialogs.
//!
//! Prompts and confirmations are read line by line from an input stream.
//! Answers given on the command line (`--name`, `--yes`) are used first, so
//! the tool also runs unattended.

use std::{
    collections::VecDeque,
    io::{self, BufRead, Write},
};

use colored::Colorize;
use proptree::Dialogs;

/// [`Dialogs`] over a line-oriented input and an output stream.
pub struct TerminalDialogs<R, W> {
    input: R,
    output: W,
    names: VecDeque<String>,
    assume_yes: bool,
}

impl TerminalDialogs<io::StdinLock<'static>, io::Stdout> {
    /// Dialogs on the process's stdin and stdout.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalDialogs<R, W> {
    /// Dialogs on the given streams.
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            names: VecDeque::new(),
            assume_yes: false,
        }
    }

    /// Answer the next prompts with these names before asking.
    pub fn with_names(mut self, names: impl IntoIterator<Item = String>) -> Self {
        self.names.extend(names);
        self
    }

    /// Confirm every question without asking.
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    fn read_line(&mut self) -> Option<String> {
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

impl<R: BufRead, W: Write> Dialogs for TerminalDialogs<R, W> {
    fn prompt(&mut self, message: &str) -> Option<String> {
        if let Some(name) = self.names.pop_front() {
            let _ = writeln!(self.output, "{message}: {name}");
            return Some(name);
        }
        let _ = write!(self.output, "{}: ", message.bold());
        self.read_line()
    }

    fn confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            let _ = writeln!(self.output, "{message} [y/N] y");
            return true;
        }
        let _ = write!(self.output, "{} [y/N] ", message.bold());
        self.read_line()
            .map(|a| matches!(a.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
            .unwrap_or(false)
    }

    fn alert(&mut self, message: &str) {
        let _ = writeln!(self.output, "{}", message.red().bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_prompt_reads_line() {
        let mut d = TerminalDialogs::new(Cursor::new("rule1\n"), Vec::new());
        assert_eq!(d.prompt("Please input a name").as_deref(), Some("rule1"));
        assert_eq!(d.prompt("Please input a name"), None);
    }

    #[test]
    fn test_scripted_names_first() {
        let mut d = TerminalDialogs::new(Cursor::new("typed\n"), Vec::new())
            .with_names(vec!["given".to_string()]);
        assert_eq!(d.prompt("name").as_deref(), Some("given"));
        assert_eq!(d.prompt("name").as_deref(), Some("typed"));
    }

    #[test]
    fn test_confirm() {
        let mut d = TerminalDialogs::new(Cursor::new("Y\nno\n"), Vec::new());
        assert!(d.confirm("Really delete 'x'?"));
        assert!(!d.confirm("Really delete 'x'?"));
        assert!(!d.confirm("Really delete 'x'?"));

        let mut d = TerminalDialogs::new(Cursor::new(""), Vec::new()).assume_yes(true);
        assert!(d.confirm("Really delete 'x'?"));
    }
}
