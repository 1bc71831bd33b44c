//! Interactive prompts
//!
//! Workflows ask the operator through [`Prompter`]. A `None` answer means the
//! operator backed out; callers turn that into [`FlowError::UserCancelled`].
//!
//! [`FlowError::UserCancelled`]: crate::error::FlowError::UserCancelled

use std::io::{self, BufRead, Write};

use crate::error::Result;

pub trait Prompter {
    /// Ask a yes/no question. Empty input picks the default (no when
    /// `default_no`, yes otherwise).
    fn ask_yes_no(&mut self, question: &str, default_no: bool) -> Result<bool>;

    /// Ask for free text. Returns `None` if the operator cancels or leaves a
    /// required answer empty.
    fn ask_text(
        &mut self,
        prompt: &str,
        placeholder: Option<&str>,
        required: bool,
    ) -> Result<Option<String>>;

    /// Ask the operator to pick one of `options`.
    fn ask_choice(&mut self, prompt: &str, options: &[String]) -> Result<Option<String>>;
}

/// Line-oriented prompts on a reader/writer pair, stdin/stdout by default.
#[derive(Debug)]
pub struct TerminalPrompter<I, O> {
    input: I,
    output: O,
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<I: BufRead, O: Write> TerminalPrompter<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    /// Read one line; `None` on EOF.
    fn read_line(&mut self) -> Result<Option<String>> {
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<I: BufRead, O: Write> Prompter for TerminalPrompter<I, O> {
    fn ask_yes_no(&mut self, question: &str, default_no: bool) -> Result<bool> {
        let hint = if default_no { "[y/N]" } else { "[Y/n]" };
        loop {
            write!(self.output, "{question} {hint}: ")?;
            let Some(answer) = self.read_line()? else {
                return Ok(!default_no);
            };
            match answer.to_lowercase().as_str() {
                "" => return Ok(!default_no),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => writeln!(self.output, "Please answer 'y' or 'n'.")?,
            }
        }
    }

    fn ask_text(
        &mut self,
        prompt: &str,
        placeholder: Option<&str>,
        required: bool,
    ) -> Result<Option<String>> {
        match placeholder {
            Some(p) => write!(self.output, "{prompt} [{p}]: ")?,
            None => write!(self.output, "{prompt}: ")?,
        }
        let Some(answer) = self.read_line()? else {
            return Ok(None);
        };
        if !answer.is_empty() {
            return Ok(Some(answer));
        }
        match placeholder {
            Some(p) => Ok(Some(p.to_string())),
            None if required => Ok(None),
            None => Ok(Some(String::new())),
        }
    }

    fn ask_choice(&mut self, prompt: &str, options: &[String]) -> Result<Option<String>> {
        if options.is_empty() {
            return Ok(None);
        }
        writeln!(self.output, "{prompt}")?;
        for (i, option) in options.iter().enumerate() {
            writeln!(self.output, "  {}) {option}", i + 1)?;
        }
        loop {
            write!(self.output, "Choice [1-{}, empty to cancel]: ", options.len())?;
            let Some(answer) = self.read_line()? else {
                return Ok(None);
            };
            if answer.is_empty() {
                return Ok(None);
            }
            if let Some(option) = answer
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| options.get(i))
            {
                return Ok(Some(option.clone()));
            }
            if let Some(option) = options.iter().find(|o| **o == answer) {
                return Ok(Some(option.clone()));
            }
            writeln!(self.output, "Invalid choice: {answer}")?;
        }
    }
}
