//! Shared HTTP transport policy for the provider clients.
//!
//! Every provider funnels its request through [`call_with_backoff`], so the
//! transient/fatal split and the pause schedule live in one place instead of
//! being repeated per client.

use std::future::Future;
use std::time::Duration;

use reqwest::Response;
use reqwest::header::RETRY_AFTER;

use crate::error::{AiError, Result};

/// How much of a failing response body is kept in the error.
const FAILURE_SNIPPET_CHARS: usize = 400;

/// Doubling pause schedule for transient provider failures.
#[derive(Debug, Clone)]
pub struct Backoff {
    /// Retries after the first attempt.
    pub attempts: u32,
    pub base: Duration,
    pub ceiling: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            attempts: 3,
            base: Duration::from_millis(250),
            ceiling: Duration::from_secs(8),
        }
    }
}

impl Backoff {
    /// Pause ahead of retry number `retry_no` (1-based). A server-sent
    /// Retry-After always wins over the schedule.
    pub fn pause_before(&self, retry_no: u32, server_hint: Option<Duration>) -> Duration {
        if let Some(hint) = server_hint {
            return hint;
        }
        let doublings = retry_no.saturating_sub(1).min(16);
        self.base
            .saturating_mul(1u32 << doublings)
            .min(self.ceiling)
    }
}

/// Drive `request` until it returns a success status, a non-transient
/// failure, or the retry budget runs out.
pub async fn call_with_backoff<F, Fut>(
    provider: &str,
    backoff: &Backoff,
    request: F,
) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: Future<Output = reqwest::Result<Response>>,
{
    let mut retry_no = 0u32;
    loop {
        let failure = match request().await {
            Ok(response) if response.status().is_success() => return Ok(response),
            Ok(response) => http_failure(provider, response).await,
            Err(transport) => AiError::Http(transport),
        };

        retry_no += 1;
        if !failure.is_retryable() || retry_no > backoff.attempts {
            return Err(failure);
        }

        let pause = backoff.pause_before(
            retry_no,
            failure.retry_after().map(Duration::from_secs),
        );
        tracing::warn!(
            provider,
            retry_no,
            pause_ms = pause.as_millis() as u64,
            error = %failure,
            "Transient provider failure, backing off"
        );
        tokio::time::sleep(pause).await;
    }
}

/// Classify a non-success response. Only a short snippet of the body is
/// kept; provider error pages can be large and occasionally echo secrets.
async fn http_failure(provider: &str, response: Response) -> AiError {
    let status = response.status().as_u16();
    let retry_after_secs = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let body = response.text().await.unwrap_or_default();

    AiError::LlmHttp {
        provider: provider.to_string(),
        status,
        message: body.chars().take(FAILURE_SNIPPET_CHARS).collect(),
        retry_after_secs,
    }
}
