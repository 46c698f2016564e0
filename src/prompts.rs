use std::error::Error;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use inquire::{validator::Validation, Confirm, InquireError, Select, Text};
use thiserror::Error;

/// Inline validator: `Err(message)` keeps the prompt open and shows the message.
pub type InputValidator = fn(&str) -> Result<(), String>;

#[derive(Debug, Error)]
pub enum PromptError {
    /// The user aborted the prompt (Esc / Ctrl-C).
    #[error("prompt cancelled")]
    Cancelled,
    #[error("terminal error: {0}")]
    Terminal(String),
}

impl From<InquireError> for PromptError {
    fn from(err: InquireError) -> Self {
        match err {
            InquireError::OperationCanceled | InquireError::OperationInterrupted => {
                PromptError::Cancelled
            }
            other => PromptError::Terminal(other.to_string()),
        }
    }
}

pub trait Prompter {
    /// Returns the index of the chosen option.
    fn select(&mut self, title: &str, options: &[&str]) -> Result<usize, PromptError>;

    fn text(
        &mut self,
        title: &str,
        help: &str,
        validator: Option<InputValidator>,
    ) -> Result<String, PromptError>;

    fn confirm(&mut self, title: &str, default: bool) -> Result<bool, PromptError>;

    /// Start a busy indicator; the caller clears it once the work is done.
    fn busy(&mut self, title: &str) -> ProgressBar;

    /// Print a status line to stdout.
    fn say(&mut self, message: &str);
}

/// `Prompter` backed by inquire and indicatif.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn select(&mut self, title: &str, options: &[&str]) -> Result<usize, PromptError> {
        let choice = Select::new(title, options.to_vec()).raw_prompt()?;
        Ok(choice.index)
    }

    fn text(
        &mut self,
        title: &str,
        help: &str,
        validator: Option<InputValidator>,
    ) -> Result<String, PromptError> {
        let mut prompt = Text::new(title).with_help_message(help);
        if let Some(validate) = validator {
            prompt = prompt.with_validator(
                move |input: &str| -> Result<Validation, Box<dyn Error + Send + Sync>> {
                    match validate(input) {
                        Ok(()) => Ok(Validation::Valid),
                        Err(message) => Ok(Validation::Invalid(message.into())),
                    }
                },
            );
        }
        Ok(prompt.prompt()?)
    }

    fn confirm(&mut self, title: &str, default: bool) -> Result<bool, PromptError> {
        Ok(Confirm::new(title).with_default(default).prompt()?)
    }

    fn busy(&mut self, title: &str) -> ProgressBar {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(title.to_string());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    fn say(&mut self, message: &str) {
        println!("{}", message);
    }
}
