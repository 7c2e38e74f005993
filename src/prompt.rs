//! Injectable prompter.
//!
//! Workflows never talk to the terminal directly: they ask a [`Prompter`],
//! which either answers or reports [`FlowError::Cancelled`]. The CLI uses
//! [`InquirePrompter`]; tests feed answers through `ScriptedPrompter`.

use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};

use crate::error::{FlowError, Result};

pub trait Prompter {
    /// Pick one of `options`, returning its index
    fn select(&self, message: &str, options: &[String], default: usize) -> Result<usize>;

    /// Free-form text; may be empty
    fn text(&self, message: &str) -> Result<String>;

    /// Hidden input for secrets; may be empty
    fn password(&self, message: &str) -> Result<String>;
}

/// Ask until a non-empty answer arrives, giving up after `attempts` tries.
pub fn non_empty<F>(attempts: usize, mut ask: F) -> Result<Option<String>>
where
    F: FnMut() -> Result<String>,
{
    for _ in 0..attempts {
        let answer = ask()?;
        let answer = answer.trim();
        if !answer.is_empty() {
            return Ok(Some(answer.to_string()));
        }
    }

    Ok(None)
}

pub struct InquirePrompter;

fn cancelled(err: InquireError) -> FlowError {
    FlowError::Cancelled(err.to_string())
}

impl Prompter for InquirePrompter {
    fn select(&self, message: &str, options: &[String], default: usize) -> Result<usize> {
        let labels: Vec<String> = options.to_vec();
        let chosen = Select::new(message, labels)
            .with_starting_cursor(default.min(options.len().saturating_sub(1)))
            .raw_prompt()
            .map_err(cancelled)?;

        Ok(chosen.index)
    }

    fn text(&self, message: &str) -> Result<String> {
        Text::new(message).prompt().map_err(cancelled)
    }

    fn password(&self, message: &str) -> Result<String> {
        Password::new(message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map_err(cancelled)
    }
}

#[cfg(test)]
pub use scripted::ScriptedPrompter;
