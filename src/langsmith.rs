use async_trait::async_trait;
use chrono::{DateTime, Utc};
use eyre::Result;
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cli::chat::conversation_state::Message;
use crate::config::TracingConfig;
use crate::responder::{Responder, ResponderError};

const RUN_NAME: &str = "chatbot";

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("failed to reach LangSmith: {0}")]
    Network(#[from] reqwest::Error),

    #[error("LangSmith rejected run ({status}): {body}")]
    Rejected { status: u16, body: String },
}

/// One LangSmith run describing a single responder call.
#[derive(Debug, Serialize)]
pub struct Run {
    pub id: Uuid,
    pub name: &'static str,
    pub run_type: &'static str,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub inputs: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outputs: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub session_name: String,
}

pub struct LangSmithTracer {
    api_key: String,
    runs_url: String,
    project: String,
    client: reqwest::Client,
}

impl LangSmithTracer {
    pub fn new(config: &TracingConfig) -> Result<Self> {
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            api_key: config.api_key.clone(),
            runs_url: format!("{}/runs", config.endpoint.as_str().trim_end_matches('/')),
            project: config.project.clone(),
            client,
        })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn build_run(
        &self,
        history: &[Message],
        result: &Result<Message, ResponderError>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Run {
        let (outputs, error) = match result {
            Ok(reply) => (Some(json!({ "messages": [reply] })), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Run {
            id: Uuid::new_v4(),
            name: RUN_NAME,
            run_type: "llm",
            start_time,
            end_time,
            inputs: json!({ "messages": history }),
            outputs,
            error,
            session_name: self.project.clone(),
        }
    }

    pub async fn submit(&self, run: &Run) -> Result<(), TraceError> {
        let response = self
            .client
            .post(&self.runs_url)
            .header("x-api-key", &self.api_key)
            .json(run)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TraceError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        debug!("Submitted LangSmith run {}", run.id);
        Ok(())
    }
}

/// Wraps a responder and records every call as a LangSmith run.
///
/// Submission problems are logged and dropped; the wrapped result is always
/// returned untouched.
pub struct TracedResponder<R> {
    inner: R,
    tracer: LangSmithTracer,
}

impl<R: Responder> TracedResponder<R> {
    pub fn new(inner: R, tracer: LangSmithTracer) -> Self {
        Self { inner, tracer }
    }
}

#[async_trait]
impl<R: Responder> Responder for TracedResponder<R> {
    async fn respond(&self, history: &[Message]) -> Result<Message, ResponderError> {
        let start_time = Utc::now();
        let result = self.inner.respond(history).await;
        let end_time = Utc::now();

        let run = self.tracer.build_run(history, &result, start_time, end_time);
        if let Err(e) = self.tracer.submit(&run).await {
            warn!("Trace submission failed: {}", e);
        }

        result
    }
}
