//! Blocking yes/no confirmation for destructive commands.

use std::io::{self, BufRead, StdinLock, Stdout, Write};

use anyhow::{Context, Result, bail};

/// Something that can ask the user a yes/no question.
pub trait Confirm {
    /// Ask until a recognised answer arrives.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

/// Prompt on a line-oriented reader/writer pair (the terminal in production).
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Confirm for TerminalPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{question} [y/n]: ").context("write prompt")?;
            self.output.flush().context("flush prompt")?;

            let mut response = String::new();
            let read = self
                .input
                .read_line(&mut response)
                .context("read confirmation")?;
            if read == 0 {
                bail!("confirmation input closed before an answer was given");
            }
            if let Some(answer) = parse_answer(&response) {
                return Ok(answer);
            }
        }
    }
}

/// `y`/`yes` and `n`/`no`, any case, surrounding whitespace ignored.
pub fn parse_answer(response: &str) -> Option<bool> {
    match response.trim().to_lowercase().as_str() {
        "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
