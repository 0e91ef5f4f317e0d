//! Error types for the agent runtime

use thiserror::Error;

/// Agent runtime error types
#[derive(Error, Debug)]
pub enum AiError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("{provider} HTTP {status}: {message}")]
    LlmHttp {
        provider: String,
        status: u16,
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("Structured output did not match schema: {0}")]
    Schema(String),

    #[error("Call exceeded deadline after {0} ms")]
    Timeout(u64),

    #[error("Tool error: {0}")]
    Tool(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Unknown model id: {0}")]
    UnknownModel(String),

    #[error("Missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("Max iterations reached: {0}")]
    MaxIterations(usize),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AiError {
    /// Whether a retry can reasonably succeed. Rate limits, server errors
    /// and network failures are transient; auth and schema errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::LlmHttp { status, .. } => *status == 429 || *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout(_) => true,
            Self::Llm(message) => {
                let lower = message.to_lowercase();
                lower.contains("rate limit")
                    || lower.contains("overloaded")
                    || lower.contains("timeout")
            }
            _ => false,
        }
    }

    /// Server-requested retry delay, if any.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Self::LlmHttp {
                retry_after_secs, ..
            } => *retry_after_secs,
            _ => None,
        }
    }
}

/// Result type alias for agent runtime operations
pub type Result<T> = std::result::Result<T, AiError>;
