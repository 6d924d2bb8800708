//! Interactive resolution of required descriptor fields.
//!
//! Builders never read standard input themselves; they are handed a
//! [`Prompter`] and ask it for values. The binary wires up
//! [`TerminalPrompter`], tests use a scripted one.

use std::io::{BufRead, Write};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("IO error while prompting: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input ended while waiting for: {0}")]
    EndOfInput(String),
}

/// Source of operator answers.
pub trait Prompter {
    /// Shows `message` and returns one line of input without its line
    /// terminator.
    fn ask(&mut self, message: &str) -> Result<String, PromptError>;
}

/// Line-oriented prompter over a reader/writer pair (stdin/stdout in the
/// binary).
pub struct TerminalPrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompter { input, output }
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, message: &str) -> Result<String, PromptError> {
        write!(self.output, "{message}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            // Keep the operator's terminal tidy before the error is reported.
            writeln!(self.output)?;
            return Err(PromptError::EndOfInput(message.trim().to_string()));
        }

        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(line)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Asks for `field` until it holds something other than whitespace.
///
/// A field that is already non-blank is left untouched and no prompt is
/// shown. The accepted answer is stored as typed, surrounding whitespace
/// included.
pub fn enter_missing(
    field: &mut String,
    prompt: &str,
    prompter: &mut dyn Prompter,
) -> Result<(), PromptError> {
    while is_blank(field) {
        *field = prompter.ask(prompt)?;
    }
    Ok(())
}

/// List flavour of [`enter_missing`]: a server list is usable once its first
/// entry is non-blank. Each answer replaces the whole list.
pub fn enter_missing_server(
    servers: &mut Vec<String>,
    prompt: &str,
    prompter: &mut dyn Prompter,
) -> Result<(), PromptError> {
    while servers.first().is_none_or(|s| is_blank(s)) {
        let answer = prompter.ask(prompt)?;
        debug!("Replacing server list with {answer:?}");
        *servers = vec![answer];
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedPrompter;
    use super::*;
    use std::io::Cursor;

    #[test]
    fn present_field_is_not_prompted() {
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut field = "already set".to_string();

        enter_missing(&mut field, "Enter: ", &mut prompter).unwrap();

        assert_eq!(field, "already set");
        assert!(prompter.asked.is_empty());
    }

    #[test]
    fn blank_answers_are_asked_again() {
        let mut prompter = ScriptedPrompter::new(&["", "   ", "\t", "value"]);
        let mut field = String::new();

        enter_missing(&mut field, "Enter a repository ID: ", &mut prompter).unwrap();

        assert_eq!(field, "value");
        assert_eq!(prompter.asked, vec!["Enter a repository ID: "; 4]);
    }

    #[test]
    fn whitespace_only_field_counts_as_missing() {
        let mut prompter = ScriptedPrompter::new(&["x"]);
        let mut field = "  ".to_string();

        enter_missing(&mut field, "Enter: ", &mut prompter).unwrap();

        assert_eq!(field, "x");
    }

    #[test]
    fn running_out_of_answers_is_an_error() {
        let mut prompter = ScriptedPrompter::new(&[""]);
        let mut field = String::new();

        let result = enter_missing(&mut field, "Enter: ", &mut prompter);

        assert!(matches!(result, Err(PromptError::EndOfInput(_))));
    }

    #[test]
    fn empty_server_list_is_prompted() {
        let mut prompter = ScriptedPrompter::new(&["http://a/"]);
        let mut servers = Vec::new();

        enter_missing_server(&mut servers, "URL: ", &mut prompter).unwrap();

        assert_eq!(servers, vec!["http://a/"]);
    }

    #[test]
    fn blank_first_server_replaces_whole_list() {
        let mut prompter = ScriptedPrompter::new(&[" ", "http://new/"]);
        let mut servers = vec!["".to_string(), "http://kept-not/".to_string()];

        enter_missing_server(&mut servers, "URL: ", &mut prompter).unwrap();

        assert_eq!(servers, vec!["http://new/"]);
        assert_eq!(prompter.asked.len(), 2);
    }

    #[test]
    fn valid_first_server_is_left_alone() {
        let mut prompter = ScriptedPrompter::new(&[]);
        let mut servers = vec!["http://a/".to_string(), "".to_string()];

        enter_missing_server(&mut servers, "URL: ", &mut prompter).unwrap();

        assert_eq!(servers, vec!["http://a/", ""]);
    }

    #[test]
    fn terminal_prompter_writes_prompt_and_strips_newline() {
        let input = Cursor::new(b"first\r\nsecond\nthird".to_vec());
        let mut output: Vec<u8> = Vec::new();
        {
            let mut prompter = TerminalPrompter::new(input, &mut output);
            assert_eq!(prompter.ask("A: ").unwrap(), "first");
            assert_eq!(prompter.ask("B: ").unwrap(), "second");
            assert_eq!(prompter.ask("C: ").unwrap(), "third");
        }
        assert_eq!(String::from_utf8(output).unwrap(), "A: B: C: ");
    }

    #[test]
    fn terminal_prompter_reports_end_of_input() {
        let mut output: Vec<u8> = Vec::new();
        let mut prompter = TerminalPrompter::new(Cursor::new(Vec::<u8>::new()), &mut output);

        let result = prompter.ask("Enter a repository ID: ");

        match result {
            Err(PromptError::EndOfInput(what)) => assert_eq!(what, "Enter a repository ID:"),
            _ => panic!("Expected EndOfInput"),
        }
    }
}
