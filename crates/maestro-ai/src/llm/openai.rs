//! OpenAI chat endpoint, shared by the OpenAI-compatible providers.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::llm::chat::{ChatModel, ChatOutcome, ChatRequest, ToolInvocation, Turn, UsageMeter};
use crate::llm::transport::{Backoff, call_with_backoff};

const OPENAI_API: &str = "https://api.openai.com/v1";

/// Chat-completions client.
///
/// DeepSeek, Kimi and Together speak this wire format; the registry points
/// this client at their endpoint and label instead of standing up separate
/// implementations.
pub struct OpenAiChat {
    http: Client,
    key: String,
    model: String,
    base_url: String,
    label: String,
    backoff: Backoff,
}

impl OpenAiChat {
    pub fn new(key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: build_http_client(),
            key: key.into(),
            model: model.into(),
            base_url: OPENAI_API.to_string(),
            label: "openai".to_string(),
            backoff: Backoff::default(),
        }
    }

    /// Point at an OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Provider label used in errors and logs.
    pub fn with_provider_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    fn payload(&self, request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request.turns.iter().map(wire_turn).collect();

        let mut payload = json!({
            "model": self.model,
            "messages": messages,
        });

        if !request.tools.is_empty() {
            payload["tools"] = request
                .tools
                .iter()
                .map(|spec| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": spec.name,
                            "description": spec.purpose,
                            "parameters": spec.input_schema,
                        },
                    })
                })
                .collect::<Vec<_>>()
                .into();
        }

        let sampling = &request.sampling;
        if sampling.reasoning {
            // Reasoning models take their budget through max_completion_tokens
            // and refuse caller-set temperature.
            payload["max_completion_tokens"] = sampling.max_output_tokens.into();
        } else {
            payload["max_tokens"] = sampling.max_output_tokens.into();
            if let Some(temperature) = sampling.temperature {
                payload["temperature"] = temperature.into();
            }
        }

        payload
    }

    fn read_outcome(&self, body: Value) -> Result<ChatOutcome> {
        let usage = UsageMeter {
            input_tokens: read_u32(&body, "/usage/prompt_tokens"),
            output_tokens: read_u32(&body, "/usage/completion_tokens"),
        };

        let choice = body
            .pointer("/choices/0")
            .ok_or_else(|| AiError::Llm(format!("{} returned no choices", self.label)))?;

        let calls = choice
            .pointer("/message/tool_calls")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(read_invocation).collect::<Vec<_>>())
            .unwrap_or_default();
        if !calls.is_empty() {
            return Ok(ChatOutcome::ToolPass { calls, usage });
        }

        let text = choice
            .pointer("/message/content")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        if choice["finish_reason"].as_str() == Some("length") {
            return Ok(ChatOutcome::Truncated { text, usage });
        }
        Ok(ChatOutcome::Answer { text, usage })
    }
}

/// Map one turn onto a chat-completions message.
fn wire_turn(turn: &Turn) -> Value {
    match turn {
        Turn::Instructions { text } => json!({"role": "system", "content": text}),
        Turn::Request { text } => json!({"role": "user", "content": text}),
        Turn::Reply { text, calls } => {
            let mut message = json!({"role": "assistant"});
            // Content must be null, not empty, alongside tool calls.
            message["content"] = if text.is_empty() && !calls.is_empty() {
                Value::Null
            } else {
                json!(text)
            };
            if !calls.is_empty() {
                message["tool_calls"] = calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.call_id,
                            "type": "function",
                            "function": {
                                "name": call.tool,
                                "arguments": call.args.to_string(),
                            },
                        })
                    })
                    .collect::<Vec<_>>()
                    .into();
            }
            message
        }
        Turn::ToolResult { call_id, body } => {
            json!({"role": "tool", "tool_call_id": call_id, "content": body})
        }
    }
}

fn read_invocation(entry: &Value) -> Option<ToolInvocation> {
    let raw_args = entry
        .pointer("/function/arguments")
        .and_then(Value::as_str)
        .unwrap_or("{}");
    Some(ToolInvocation {
        call_id: entry["id"].as_str()?.to_string(),
        tool: entry.pointer("/function/name")?.as_str()?.to_string(),
        args: serde_json::from_str(raw_args).unwrap_or(Value::Null),
    })
}

fn read_u32(body: &Value, pointer: &str) -> u32 {
    body.pointer(pointer)
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

#[async_trait]
impl ChatModel for OpenAiChat {
    fn provider(&self) -> &str {
        &self.label
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: ChatRequest) -> Result<ChatOutcome> {
        let payload = self.payload(&request);
        let url = format!("{}/chat/completions", self.base_url);

        let response = call_with_backoff(&self.label, &self.backoff, || {
            self.http
                .post(&url)
                .bearer_auth(&self.key)
                .json(&payload)
                .send()
        })
        .await?;

        self.read_outcome(response.json().await?)
    }
}
