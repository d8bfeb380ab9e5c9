//! HTTP client for the external n8n workflows.
//!
//! The client only forwards JSON and hands back the upstream status and body;
//! each endpoint decides how to relay them.

use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{0} is not set")]
    NotConfigured(&'static str),
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for WorkflowError {
    fn from(e: reqwest::Error) -> Self {
        WorkflowError::Transport(e.to_string())
    }
}

/// Upstream reply. `body` is `None` when the payload was not valid JSON.
#[derive(Debug, Clone)]
pub struct WorkflowResponse {
    pub url: String,
    pub status: u16,
    pub body: Option<Value>,
}

impl WorkflowResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The parsed body, or `{}` when it could not be parsed.
    pub fn body_or_empty(&self) -> Value {
        self.body
            .clone()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    /// Error payload for a non-2xx reply: the upstream `error` field when it
    /// is truthy, otherwise a message naming the status and URL.
    pub fn error_value(&self) -> Value {
        match self.body.as_ref().and_then(|b| b.get("error")) {
            Some(error) if is_truthy(error) => error.clone(),
            _ => Value::String(format!("n8n returned {} from {}", self.status, self.url)),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkflowClient {
    http: Client,
}

impl WorkflowClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// POST `body` as JSON to `url`.
    ///
    /// Any HTTP status is returned as a response; only transport failures
    /// are errors.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<WorkflowResponse, WorkflowError> {
        tracing::info!(url = %url, "Calling n8n workflow");

        let response = self.http.post(url).json(body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let body = serde_json::from_slice::<Value>(&bytes).ok();

        if !(200..300).contains(&status) {
            tracing::warn!(url = %url, status, "n8n workflow returned error status");
        }

        Ok(WorkflowResponse {
            url: url.to_string(),
            status,
            body,
        })
    }
}
