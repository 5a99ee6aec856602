use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },
    #[error("http error: {0}")]
    Http(String),
    #[error("oracle returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("oracle returned an empty completion")]
    EmptyResponse,
    #[error("oracle is disabled")]
    Disabled,
}

/// A text-completion service: one prompt in, one string out.
///
/// Implementations own any retry or backoff policy. Callers treat every
/// error the same way.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

