use std::io::{BufRead, Write};

use identity_swap_core::{Result, SwapError};

/// The human supervising a swap: sees plan text, answers y/n prompts.
pub trait Operator {
    fn show(&mut self, text: &str) -> Result<()>;

    /// Only an explicit yes returns `true`.
    fn confirm(&mut self, question: &str) -> Result<bool>;
}

pub struct TerminalOperator<R, W> {
    input: R,
    output: W,
}

impl TerminalOperator<std::io::StdinLock<'static>, std::io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn write_line(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}")
            .and_then(|()| self.output.flush())
            .map_err(|error| SwapError::prompt(format!("failed to write to terminal: {error}")))
    }
}

impl<R: BufRead, W: Write> Operator for TerminalOperator<R, W> {
    fn show(&mut self, text: &str) -> Result<()> {
        self.write_line(text)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        loop {
            write!(self.output, "{question} [y/n] ")
                .and_then(|()| self.output.flush())
                .map_err(|error| {
                    SwapError::prompt(format!("failed to write to terminal: {error}"))
                })?;

            let mut answer = String::new();
            let read = self.input.read_line(&mut answer).map_err(|error| {
                SwapError::prompt(format!("failed to read answer: {error}"))
            })?;
            if read == 0 {
                self.write_line("")?;
                return Ok(false);
            }

            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.write_line("Please answer y or n.")?,
            }
        }
    }
}
