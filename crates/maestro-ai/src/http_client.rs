//! Shared HTTP client construction for LLM providers and tools.

use std::time::Duration;

use reqwest::Client;

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Build the standard pooled HTTP client. Per-call deadlines are enforced by
/// the runtime, so only the connect phase is bounded here.
pub fn build_http_client() -> Client {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}
