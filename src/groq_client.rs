use async_trait::async_trait;
use eyre::Result;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::cli::chat::conversation_state::Message;
use crate::config::Config;
use crate::responder::{Responder, ResponderError};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for Groq's OpenAI-compatible chat completions endpoint.
pub struct GroqClient {
    api_key: Option<String>,
    model: String,
    api_url: String,
    client: reqwest::Client,
}

impl GroqClient {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            api_key: config.groq_api_key.clone(),
            model: config.model.clone(),
            api_url: format!(
                "{}/chat/completions",
                config.base_url.as_str().trim_end_matches('/')
            ),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn generate_content(&self, messages: &[Message]) -> Result<String, ResponderError> {
        // Missing credentials only surface once a call is actually attempted
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ResponderError::MissingCredentials)?;

        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages,
        };

        if let Ok(pretty) = serde_json::to_string_pretty(&request_body) {
            debug!("Sending request to Groq API: {}", pretty);
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| ResponderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("API request failed with status {}: {}", status, body);
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ResponderError::Authentication {
                    status: status.as_u16(),
                    body,
                },
                StatusCode::TOO_MANY_REQUESTS => ResponderError::RateLimited { body },
                _ => ResponderError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ResponderError::Network(e.to_string()))?;
        debug!("Received response from Groq API: {}", body);

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ResponderError::MalformedResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ResponderError::MalformedResponse("response carried no text".into()))
    }
}

#[async_trait]
impl Responder for GroqClient {
    async fn respond(&self, history: &[Message]) -> Result<Message, ResponderError> {
        self.generate_content(history).await.map(Message::assistant)
    }
}
