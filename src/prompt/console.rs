//! Line-oriented console over any reader/writer pair

use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::i18n::Locale;
use crate::workflow::Driver;

/// Asks questions on `output` and reads answers from `input`, one line each.
pub struct Console<R, W> {
    input: R,
    output: W,
    locale: Locale,
}

impl<R: BufRead, W: Write> Console<R, W> {
    /// Create a console with the given prompt language
    pub fn new(input: R, output: W, locale: Locale) -> Self {
        Self {
            input,
            output,
            locale,
        }
    }

    /// Prompt language
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Print `question`, then block until a line is read.
    ///
    /// The line terminator is stripped; end of input is `InputClosed`.
    pub fn ask(&mut self, question: &str) -> Result<String> {
        write!(self.output, "{} ", question)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // Keep the transcript tidy when stdin closes mid-prompt
            writeln!(self.output)?;
            return Err(Error::InputClosed {
                waiting_for: question.to_string(),
            });
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(line)
    }

    /// Print one line
    pub fn say(&mut self, line: &str) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Give back the underlying reader and writer
    #[cfg(test)]
    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

/// Plain questions are answered by asking them verbatim.
impl<R: BufRead, W: Write> Driver<String, String> for Console<R, W> {
    fn supply(&mut self, question: &String) -> Result<String> {
        self.ask(question)
    }
}
