pub mod conversation_state;
pub mod input_source;
pub mod prompt;

use std::io::{self, Write};
use std::process::ExitCode;

use conversation_state::{ConversationState, Message};
use eyre::{bail, Result};
use input_source::InputSource;
use prompt::generate_prompt;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::responder::{Responder, ResponderError};

/// Inputs that end the session, compared case-insensitively.
pub const EXIT_KEYWORDS: [&str; 3] = ["quit", "exit", "bye"];

const WELCOME_TEXT: &str = "Ask me anything. Type quit, exit or bye to leave.";
const FAREWELL_TEXT: &str = "Goodbye!";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Responder(#[from] ResponderError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, PartialEq, Eq)]
pub enum TurnInput<'a> {
    Exit,
    Empty,
    Message(&'a str),
}

pub fn classify_input(line: &str) -> TurnInput<'_> {
    let trimmed = line.trim();
    if line.is_empty() {
        TurnInput::Empty
    } else if EXIT_KEYWORDS
        .iter()
        .any(|keyword| trimmed.eq_ignore_ascii_case(keyword))
    {
        TurnInput::Exit
    } else {
        TurnInput::Message(line)
    }
}

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    input_source: Option<InputSource>,
    conversation_state: ConversationState,
    responder: Box<dyn Responder>,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        input_source: Option<InputSource>,
        responder: Box<dyn Responder>,
    ) -> Self {
        Self {
            output,
            input,
            input_source,
            conversation_state: ConversationState::new(),
            responder,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        // Non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            return self.run_once(&input).await;
        }

        let mut input_source = match self.input_source.take() {
            Some(source) => source,
            None => bail!("no input given and no terminal to read from"),
        };

        writeln!(self.output, "{}", WELCOME_TEXT)?;
        self.run_interactive(&mut input_source).await?;

        Ok(ExitCode::SUCCESS)
    }

    async fn run_once(&mut self, input: &str) -> Result<ExitCode> {
        match classify_input(input) {
            TurnInput::Exit => self.say_farewell()?,
            TurnInput::Empty => bail!("input is empty"),
            TurnInput::Message(text) => self.exchange(text).await?,
        }
        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self, input_source: &mut InputSource) -> Result<()> {
        loop {
            let line = match input_source.read_line(&generate_prompt(None))? {
                Some(line) => line,
                None => {
                    debug!("Input closed");
                    self.say_farewell()?;
                    break;
                }
            };

            match classify_input(&line) {
                TurnInput::Exit => {
                    self.say_farewell()?;
                    break;
                }
                TurnInput::Empty => continue,
                TurnInput::Message(text) => match self.exchange(text).await {
                    Ok(()) => {}
                    Err(ChatError::Responder(e)) if !e.is_fatal() => {
                        warn!("Turn failed, conversation left unchanged: {}", e);
                        writeln!(self.output, "Error: {}", e)?;
                    }
                    Err(e) => return Err(e.into()),
                },
            }
        }

        if self.conversation_state.is_empty() {
            info!("Session ended before any exchange");
        } else {
            info!(
                "Session ended after {} messages",
                self.conversation_state.len()
            );
        }
        Ok(())
    }

    /// One user turn: send the history plus the new message, print the reply,
    /// and commit both. A failed call leaves the history as it was.
    async fn exchange(&mut self, text: &str) -> Result<(), ChatError> {
        let user = Message::user(text);
        let history = self.conversation_state.with_pending(&user);
        debug!("Sending {} messages to responder", history.len());

        let reply = self.responder.respond(&history).await?;
        writeln!(self.output, "Assistant: {}", reply.content)?;

        self.conversation_state.record_exchange(user, reply);
        Ok(())
    }

    fn say_farewell(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", FAREWELL_TEXT)
    }
}
