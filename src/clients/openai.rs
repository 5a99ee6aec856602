//! OpenAI-compatible chat-completion oracle

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::clients::traits::{Oracle, OracleError};
use crate::config::OracleConfig;
use crate::error::{AffinityError, Result};

const SYSTEM_PROMPT: &str = "You are a relationship psychologist who analyzes free-text quiz \
answers. Always reply with a single JSON object and nothing else.";

#[derive(Debug, Clone)]
pub struct OpenAiOracle {
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
    timeout_ms: u64,
    client: Client,
}

impl OpenAiOracle {
    pub fn new(config: &OracleConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AffinityError::Internal {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: api_key.into(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_ms: config.timeout_ms,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt}
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens
        })
    }

    fn map_send_err(&self, err: reqwest::Error) -> OracleError {
        if err.is_timeout() {
            OracleError::Timeout {
                timeout_ms: self.timeout_ms,
            }
        } else {
            OracleError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(&self, prompt: &str) -> std::result::Result<String, OracleError> {
        let started = std::time::Instant::now();
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(prompt))
            .send()
            .await
            .map_err(|e| self.map_send_err(e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            return Err(OracleError::Status {
                status: status.as_u16(),
                body: truncate_chars(&body, 500),
            });
        }

        let val: Value = resp.json().await.map_err(|e| self.map_send_err(e))?;
        let content = completion_text(&val).ok_or(OracleError::EmptyResponse)?;

        tracing::debug!(
            "oracle call completed: model={}, {} chars in {}ms",
            self.model,
            content.len(),
            started.elapsed().as_millis()
        );

        Ok(content)
    }
}

/// `choices[0].message.content`, trimmed; `None` when absent or blank.
fn completion_text(val: &Value) -> Option<String> {
    let content = val
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()?
        .trim();
    (!content.is_empty()).then(|| content.to_string())
}

fn truncate_chars(input: &str, max: usize) -> String {
    let mut out = String::new();
    for (idx, ch) in input.chars().enumerate() {
        if idx >= max {
            out.push_str("...");
            break;
        }
        out.push(ch);
    }
    out
}
