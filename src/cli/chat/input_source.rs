#[cfg(test)]
use std::collections::VecDeque;

use eyre::Result;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use super::prompt;

/// Where user lines come from: a line editor on the terminal, or a fixed
/// script of lines for tests.
pub struct InputSource(Inner);

enum Inner {
    Readline(Editor<()>),
    #[cfg(test)]
    Mock { lines: VecDeque<String> },
}

impl InputSource {
    pub fn new() -> Result<Self> {
        Ok(Self(Inner::Readline(prompt::rl()?)))
    }

    #[cfg(test)]
    pub fn new_mock(lines: Vec<String>) -> Self {
        Self(Inner::Mock {
            lines: lines.into(),
        })
    }

    /// Reads the next line. `Ok(None)` means the user closed the input
    /// (Ctrl-D) or interrupted it (Ctrl-C).
    pub fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match &mut self.0 {
            Inner::Readline(rl) => match rl.readline(prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        rl.add_history_entry(line.as_str());
                    }
                    Ok(Some(line))
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => Ok(None),
                Err(e) => Err(e.into()),
            },
            #[cfg(test)]
            Inner::Mock { lines } => Ok(lines.pop_front()),
        }
    }
}
