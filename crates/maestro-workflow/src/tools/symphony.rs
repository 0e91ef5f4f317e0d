//! `symphony_save` - the single write path to the hosted trading platform.

use async_trait::async_trait;
use maestro_ai::http_client::build_http_client;
use maestro_ai::{AiError, Result, Tool, ToolReply, ToolSpec};
use reqwest::Client;
use serde_json::{Value, json};

/// Saves a finished symphony payload to the platform and returns
/// `{symphony_id, version_id}`.
///
/// HTTP failures surface as classified errors (not refusals) so the deploy
/// stage can tell rate limits from fatal responses.
pub struct SymphonySaveTool {
    http: Client,
    base_url: String,
    api_key: String,
}

impl SymphonySaveTool {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: build_http_client(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl Tool for SymphonySaveTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "symphony_save",
            "Save a finished symphony to the trading platform. Returns the new symphony_id.",
            json!({
                "type": "object",
                "properties": {
                    "symphony_score": {
                        "type": "object",
                        "description": "Root step node of the symphony"
                    },
                    "color": {"type": "string"},
                    "hashtag": {"type": "string"},
                    "asset_class": {"type": "string", "enum": ["EQUITIES", "CRYPTO"]}
                },
                "required": ["symphony_score", "color", "hashtag", "asset_class"]
            }),
        )
    }

    async fn run(&self, args: Value) -> Result<ToolReply> {
        let response = self
            .http
            .post(format!("{}/api/symphonies", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&args)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::LlmHttp {
                provider: "symphony".to_string(),
                status: status.as_u16(),
                message: body.chars().take(400).collect(),
                retry_after_secs: retry_after,
            });
        }

        let body: Value = response.json().await?;
        if body.get("symphony_id").and_then(Value::as_str).is_none() {
            return Ok(ToolReply::Refusal(
                "platform response missing symphony_id".to_string(),
            ));
        }
        Ok(ToolReply::Data(body))
    }
}
