use async_trait::async_trait;
use thiserror::Error;

use crate::cli::chat::conversation_state::Message;

/// Errors a single model call can end with.
#[derive(Debug, Error)]
pub enum ResponderError {
    #[error("no API key configured for the inference provider (set GROQ_API_KEY)")]
    MissingCredentials,

    #[error("authentication rejected ({status}): {body}")]
    Authentication { status: u16, body: String },

    #[error("rate limited by the inference provider: {body}")]
    RateLimited { body: String },

    #[error("API request failed ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ResponderError {
    /// Errors that will not go away by asking again in the same session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ResponderError::MissingCredentials | ResponderError::Authentication { .. }
        )
    }
}

/// Produces one assistant reply for the full ordered history.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn respond(&self, history: &[Message]) -> Result<Message, ResponderError>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_credential_problems_are_fatal() {
        assert!(ResponderError::MissingCredentials.is_fatal());
        assert!(ResponderError::Authentication {
            status: 401,
            body: String::new()
        }
        .is_fatal());
        assert!(!ResponderError::RateLimited { body: String::new() }.is_fatal());
        assert!(!ResponderError::Network("reset".into()).is_fatal());
        assert!(!ResponderError::Api {
            status: 500,
            body: String::new()
        }
        .is_fatal());
        assert!(!ResponderError::MalformedResponse("empty".into()).is_fatal());
    }
}
