//! Line-oriented prompts over any reader/writer pair.

use std::io::{self, BufRead, Write};
use std::str::FromStr;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl Prompter<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label` and read one trimmed line. `None` at end of input.
    pub fn ask(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    /// Read a value, re-asking until it parses. Blank input or end of input
    /// yields `default`.
    pub fn ask_parsed<T>(&mut self, label: &str, default: T) -> io::Result<T>
    where
        T: FromStr + Copy,
        T::Err: std::fmt::Display,
    {
        loop {
            let Some(answer) = self.ask(label)? else {
                return Ok(default);
            };
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<T>() {
                Ok(value) => return Ok(value),
                Err(error) => writeln!(self.output, "  invalid value '{answer}': {error}")?,
            }
        }
    }

    pub fn ask_optional(&mut self, label: &str) -> io::Result<Option<String>> {
        Ok(self.ask(label)?.filter(|answer| !answer.is_empty()))
    }

    pub fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }
}
