//! Operator interaction.
//!
//! The workflow only ever needs three primitives from the terminal: ask for a
//! line of text with a default, insist on a non-empty answer, and ask a
//! yes/no question. They live behind [`Prompter`] so the adapters can be
//! driven by scripted answers in tests.

use std::io::{BufRead, Write};

use crate::error::Result;

pub trait Prompter {
    /// Ask for a value; an empty answer yields the default (or empty string
    /// when there is none).
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String>;

    /// Ask until a non-empty value is provided.
    fn ask_required(&self, question: &str, default: Option<&str>) -> Result<String> {
        loop {
            let value = self.ask(question, default)?;
            if !value.is_empty() {
                return Ok(value);
            }
            warn(&format!("{question} is required"));
        }
    }

    /// Yes/no question; an empty answer yields the default.
    fn confirm(&self, question: &str, default: bool) -> Result<bool>;
}

/// Print an operator-facing warning. Deliberately plain: presentation beyond
/// a prefixed line is out of scope.
pub fn warn(message: &str) {
    eprintln!("warning: {message}");
}

// ---------------------------------------------------------------------------
// ConsolePrompter
// ---------------------------------------------------------------------------

/// Reads answers from stdin, one line per question.
#[derive(Debug, Default)]
pub struct ConsolePrompter;

impl ConsolePrompter {
    fn read_answer(&self, rendered: &str) -> Result<String> {
        let mut stdout = std::io::stdout().lock();
        write!(stdout, "{rendered}")?;
        stdout.flush()?;

        let mut line = String::new();
        std::io::stdin().lock().read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&self, question: &str, default: Option<&str>) -> Result<String> {
        let rendered = match default {
            Some(d) if !d.is_empty() => format!("{question} [{d}]: "),
            _ => format!("{question}: "),
        };
        let answer = self.read_answer(&rendered)?;
        if answer.is_empty() {
            return Ok(default.unwrap_or("").to_string());
        }
        Ok(answer)
    }

    fn confirm(&self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let answer = self.read_answer(&format!("{question} [{hint}]: "))?;
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => warn("answer 'y' or 'n'"),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Test prompter
// ---------------------------------------------------------------------------
