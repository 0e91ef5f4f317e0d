//! Anthropic messages endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::llm::chat::{ChatModel, ChatOutcome, ChatRequest, ToolInvocation, Turn, UsageMeter};
use crate::llm::transport::{Backoff, call_with_backoff};

const ANTHROPIC_API: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicChat {
    http: Client,
    key: String,
    model: String,
    base_url: String,
    backoff: Backoff,
}

impl AnthropicChat {
    pub fn new(key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: build_http_client(),
            key: key.into(),
            model: model.into(),
            base_url: ANTHROPIC_API.to_string(),
            backoff: Backoff::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    fn payload(&self, request: &ChatRequest) -> Value {
        let (system, messages) = wire_turns(&request.turns);

        let mut payload = json!({
            "model": self.model,
            "max_tokens": request.sampling.max_output_tokens,
            "messages": messages,
        });
        if let Some(system) = system {
            payload["system"] = system.into();
        }
        if let Some(temperature) = request.sampling.temperature {
            payload["temperature"] = temperature.into();
        }
        if !request.tools.is_empty() {
            payload["tools"] = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "name": spec.name,
                        "description": spec.purpose,
                        "input_schema": spec.input_schema,
                    })
                })
                .collect::<Vec<_>>()
                .into();
        }
        payload
    }

    fn read_outcome(&self, body: Value) -> Result<ChatOutcome> {
        let usage = UsageMeter {
            input_tokens: read_u32(&body, "/usage/input_tokens"),
            output_tokens: read_u32(&body, "/usage/output_tokens"),
        };

        let blocks = body["content"]
            .as_array()
            .ok_or_else(|| AiError::Llm("Anthropic reply carried no content".to_string()))?;

        let mut text = String::new();
        let mut calls = Vec::new();
        for block in blocks {
            match block["type"].as_str() {
                Some("text") => text.push_str(block["text"].as_str().unwrap_or_default()),
                Some("tool_use") => calls.push(ToolInvocation {
                    call_id: block["id"].as_str().unwrap_or_default().to_string(),
                    tool: block["name"].as_str().unwrap_or_default().to_string(),
                    args: block["input"].clone(),
                }),
                _ => {}
            }
        }

        if !calls.is_empty() {
            return Ok(ChatOutcome::ToolPass { calls, usage });
        }
        if body["stop_reason"].as_str() == Some("max_tokens") {
            return Ok(ChatOutcome::Truncated { text, usage });
        }
        Ok(ChatOutcome::Answer { text, usage })
    }
}

/// Lift instruction turns into the top-level system string and map the rest
/// onto content-block messages. Tool results ride in user-role messages.
fn wire_turns(turns: &[Turn]) -> (Option<String>, Vec<Value>) {
    let mut system: Option<String> = None;
    let mut messages = Vec::new();

    for turn in turns {
        match turn {
            Turn::Instructions { text } => system = Some(text.clone()),
            Turn::Request { text } => messages.push(json!({
                "role": "user",
                "content": [{"type": "text", "text": text}],
            })),
            Turn::Reply { text, calls } => {
                let mut blocks = Vec::new();
                if !text.is_empty() {
                    blocks.push(json!({"type": "text", "text": text}));
                }
                for call in calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.call_id,
                        "name": call.tool,
                        "input": call.args,
                    }));
                }
                messages.push(json!({"role": "assistant", "content": blocks}));
            }
            Turn::ToolResult { call_id, body } => messages.push(json!({
                "role": "user",
                "content": [{
                    "type": "tool_result",
                    "tool_use_id": call_id,
                    "content": body,
                }],
            })),
        }
    }

    (system, messages)
}

fn read_u32(body: &Value, pointer: &str) -> u32 {
    body.pointer(pointer)
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

#[async_trait]
impl ChatModel for AnthropicChat {
    fn provider(&self) -> &str {
        "anthropic"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: ChatRequest) -> Result<ChatOutcome> {
        let payload = self.payload(&request);
        let url = format!("{}/v1/messages", self.base_url);

        let response = call_with_backoff("anthropic", &self.backoff, || {
            self.http
                .post(&url)
                .header("x-api-key", &self.key)
                .header("anthropic-version", API_VERSION)
                .json(&payload)
                .send()
        })
        .await?;

        self.read_outcome(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Sampling;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn tool_use_blocks_become_a_tool_pass() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [
                    {"type": "text", "text": "fetching"},
                    {"type": "tool_use", "id": "tu_1", "name": "stock_prices",
                     "input": {"ticker": "SPY"}}
                ],
                "stop_reason": "tool_use",
                "usage": {"input_tokens": 10, "output_tokens": 4}
            })))
            .mount(&server)
            .await;

        let chat = AnthropicChat::new("test-key", "claude-sonnet-4-20250514")
            .with_base_url(server.uri());
        let outcome = chat
            .send(ChatRequest::new(
                vec![Turn::request("prices?")],
                Sampling::standard(4096, 0.7),
            ))
            .await
            .expect("exchange should succeed");

        let ChatOutcome::ToolPass { calls, usage } = outcome else {
            panic!("expected a tool pass");
        };
        assert_eq!(calls[0].tool, "stock_prices");
        assert_eq!(calls[0].args["ticker"], "SPY");
        assert_eq!(usage.total(), 14);
    }

    #[test]
    fn instructions_lift_into_the_system_field() {
        let (system, messages) = wire_turns(&[
            Turn::instructions("be brief"),
            Turn::request("hello"),
            Turn::tool_result("tu_1", "42"),
        ]);
        assert_eq!(system.as_deref(), Some("be brief"));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"][0]["type"], "tool_result");
        assert_eq!(messages[1]["content"][0]["tool_use_id"], "tu_1");
    }

    #[test]
    fn reasoning_sampling_drops_temperature() {
        let chat = AnthropicChat::new("k", "claude-opus-4");
        let payload = chat.payload(&ChatRequest::new(
            vec![Turn::request("x")],
            Sampling::reasoning(16_384),
        ));
        assert!(payload.get("temperature").is_none());
        assert_eq!(payload["max_tokens"], 16_384);
    }
}
