//! Line-oriented console I/O.
//!
//! Generic over the reader and writer so the session can be driven from a
//! script in tests. End of input is reported as `None`, never as an error.

use crate::error::{Error, Result};
use std::fmt::Display;
use std::io::{BufRead, Write};

pub struct Console<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Console { input, output }
    }

    /// Print one line.
    pub fn say(&mut self, line: impl Display) -> Result<()> {
        writeln!(self.output, "{}", line)?;
        Ok(())
    }

    /// Show `prompt` (no newline) and read one trimmed line.
    pub fn prompt(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{}", prompt)?;
        self.output.flush()?;

        let mut buf = Vec::new();
        if self.input.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }

        // A garbled line is a bad answer, not a broken terminal
        let line = String::from_utf8(buf)
            .map_err(|_| Error::InvalidChoice("input is not valid UTF-8".to_string()))?;

        Ok(Some(line.trim().to_string()))
    }

    /// Read an integer. Anything unparseable is `InvalidChoice`.
    pub fn prompt_int(&mut self, prompt: &str) -> Result<Option<i64>> {
        match self.prompt(prompt)? {
            Some(answer) => answer
                .parse::<i64>()
                .map(Some)
                .map_err(|_| Error::InvalidChoice(format!("'{}' is not a number", answer))),
            None => Ok(None),
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }
}
