//! Line-oriented prompts with a cancel keyword.
//!
//! Input and output are generic so the menu can be driven by scripted input
//! in tests.

use std::io::{self, BufRead, Write};

/// Prompt/response channel over any reader and writer.
pub struct Console<R, W> {
    input: R,
    output: W,
    cancel_keyword: String,
    closed: bool,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, output: W, cancel_keyword: impl Into<String>) -> Self {
        Self {
            input,
            output,
            cancel_keyword: cancel_keyword.into(),
            closed: false,
        }
    }

    pub fn cancel_keyword(&self) -> &str {
        &self.cancel_keyword
    }

    /// True once the input reached end-of-file.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn say(&mut self, line: impl std::fmt::Display) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.input.read_line(&mut buf)? == 0 {
            self.closed = true;
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Prompt and read one line; the cancel keyword is returned as-is.
    pub fn ask_raw(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Prompt for text. `None` when cancelled or input ended.
    pub fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        match self.ask_raw(prompt)? {
            None => Ok(None),
            Some(line) if line.trim() == self.cancel_keyword => {
                self.say("Operation cancelled.")?;
                Ok(None)
            }
            Some(line) => Ok(Some(line)),
        }
    }

    /// Prompt for an integer, re-prompting until one is entered.
    pub fn ask_int(&mut self, prompt: &str) -> io::Result<Option<i64>> {
        loop {
            let Some(raw) = self.ask(prompt)? else {
                return Ok(None);
            };
            if let Ok(value) = raw.trim().parse::<i64>() {
                return Ok(Some(value));
            }
            let hint = format!(
                "Invalid input; enter an integer or '{}'.",
                self.cancel_keyword
            );
            self.say(hint)?;
        }
    }

    /// Ask a yes/no question until answered. Cancel or end of input means no.
    pub fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        loop {
            let Some(answer) = self.ask(prompt)? else {
                return Ok(false);
            };
            match answer.trim() {
                "y" | "Y" => return Ok(true),
                "n" | "N" => return Ok(false),
                _ => self.say("Please answer 'y' or 'n'.")?,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn console(script: &str) -> Console<Cursor<Vec<u8>>, Vec<u8>> {
        Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new(), "cancel")
    }

    fn output(console: Console<Cursor<Vec<u8>>, Vec<u8>>) -> String {
        String::from_utf8(console.into_output()).unwrap()
    }

    #[test]
    fn cancel_keyword_aborts_a_prompt() {
        let mut c = console("cancel\n");
        assert_eq!(c.ask("Code: ").unwrap(), None);
        assert!(!c.is_closed());
        assert!(output(c).contains("Operation cancelled."));
    }

    #[test]
    fn ask_int_reprompts_until_a_number() {
        let mut c = console("ten\n4.5\n10\n");
        assert_eq!(c.ask_int("Qty: ").unwrap(), Some(10));
        let out = output(c);
        assert_eq!(out.matches("Invalid input").count(), 2);
    }

    #[test]
    fn windows_line_endings_are_stripped() {
        let mut c = console("CPU-1\r\n");
        assert_eq!(c.ask("Code: ").unwrap().as_deref(), Some("CPU-1"));
    }

    #[test]
    fn end_of_input_closes_the_console() {
        let mut c = console("");
        assert_eq!(c.ask("Code: ").unwrap(), None);
        assert!(c.is_closed());
        assert!(!c.confirm("Sure? ").unwrap());
    }

    #[test]
    fn confirm_accepts_only_y_or_n() {
        let mut c = console("maybe\nY\n");
        assert!(c.confirm("Sure? ").unwrap());
        assert!(output(c).contains("Please answer 'y' or 'n'."));
    }
}
