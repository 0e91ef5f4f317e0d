//! Google Gemini endpoint (native generateContent API).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{AiError, Result};
use crate::http_client::build_http_client;
use crate::llm::chat::{ChatModel, ChatOutcome, ChatRequest, ToolInvocation, Turn, UsageMeter};
use crate::llm::transport::{Backoff, call_with_backoff};

const GEMINI_API: &str = "https://generativelanguage.googleapis.com";

/// Gemini client against the Google-native API rather than the
/// OpenAI-compatible shim.
///
/// Gemini matches function responses by name, not call id, so invocation ids
/// are synthesized from the function name.
pub struct GeminiChat {
    http: Client,
    key: String,
    model: String,
    base_url: String,
    backoff: Backoff,
}

impl GeminiChat {
    pub fn new(key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: build_http_client(),
            key: key.into(),
            model: model.into(),
            base_url: GEMINI_API.to_string(),
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
        let (instructions, contents) = wire_turns(&request.turns);

        let mut generation = json!({
            "maxOutputTokens": request.sampling.max_output_tokens,
        });
        if let Some(temperature) = request.sampling.temperature {
            generation["temperature"] = temperature.into();
        }

        let mut payload = json!({
            "contents": contents,
            "generationConfig": generation,
        });
        if let Some(instructions) = instructions {
            payload["systemInstruction"] = json!({"parts": [{"text": instructions}]});
        }
        if !request.tools.is_empty() {
            payload["tools"] = json!([{
                "functionDeclarations": request
                    .tools
                    .iter()
                    .map(|spec| json!({
                        "name": spec.name,
                        "description": spec.purpose,
                        "parameters": spec.input_schema,
                    }))
                    .collect::<Vec<_>>(),
            }]);
        }
        payload
    }

    fn read_outcome(&self, body: Value) -> Result<ChatOutcome> {
        let usage = UsageMeter {
            input_tokens: read_u32(&body, "/usageMetadata/promptTokenCount"),
            output_tokens: read_u32(&body, "/usageMetadata/candidatesTokenCount"),
        };

        let candidate = body
            .pointer("/candidates/0")
            .ok_or_else(|| AiError::Llm("Gemini returned no candidates".to_string()))?;

        let mut text = String::new();
        let mut calls = Vec::new();
        if let Some(parts) = candidate.pointer("/content/parts").and_then(Value::as_array) {
            for part in parts {
                if let Some(fragment) = part["text"].as_str() {
                    text.push_str(fragment);
                }
                if let Some(call) = part.get("functionCall") {
                    let name = call["name"].as_str().unwrap_or_default().to_string();
                    calls.push(ToolInvocation {
                        call_id: name.clone(),
                        tool: name,
                        args: call["args"].clone(),
                    });
                }
            }
        }

        if !calls.is_empty() {
            return Ok(ChatOutcome::ToolPass { calls, usage });
        }
        if candidate["finishReason"].as_str() == Some("MAX_TOKENS") {
            return Ok(ChatOutcome::Truncated { text, usage });
        }
        Ok(ChatOutcome::Answer { text, usage })
    }
}

/// Gemini wants instructions out-of-band and tool results as
/// functionResponse parts on user-role contents.
fn wire_turns(turns: &[Turn]) -> (Option<String>, Vec<Value>) {
    let mut instructions: Option<String> = None;
    let mut contents = Vec::new();

    for turn in turns {
        match turn {
            Turn::Instructions { text } => instructions = Some(text.clone()),
            Turn::Request { text } => contents.push(json!({
                "role": "user",
                "parts": [{"text": text}],
            })),
            Turn::Reply { text, calls } => {
                let mut parts = Vec::new();
                if !text.is_empty() {
                    parts.push(json!({"text": text}));
                }
                for call in calls {
                    parts.push(json!({
                        "functionCall": {"name": call.tool, "args": call.args},
                    }));
                }
                contents.push(json!({"role": "model", "parts": parts}));
            }
            Turn::ToolResult { call_id, body } => {
                let response = serde_json::from_str::<Value>(body)
                    .unwrap_or_else(|_| json!({"content": body}));
                contents.push(json!({
                    "role": "user",
                    "parts": [{
                        "functionResponse": {"name": call_id, "response": response},
                    }],
                }));
            }
        }
    }

    (instructions, contents)
}

fn read_u32(body: &Value, pointer: &str) -> u32 {
    body.pointer(pointer)
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32
}

#[async_trait]
impl ChatModel for GeminiChat {
    fn provider(&self) -> &str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: ChatRequest) -> Result<ChatOutcome> {
        let payload = self.payload(&request);
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = call_with_backoff("gemini", &self.backoff, || {
            self.http
                .post(&url)
                .header("x-goog-api-key", &self.key)
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
    async fn function_call_parts_become_invocations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [
                        {"functionCall": {"name": "fred_series", "args": {"series_id": "DGS10"}}}
                    ]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 7, "candidatesTokenCount": 3}
            })))
            .mount(&server)
            .await;

        let chat = GeminiChat::new("test-key", "gemini-2.5-pro").with_base_url(server.uri());
        let outcome = chat
            .send(ChatRequest::new(
                vec![Turn::request("10y yield?")],
                Sampling::standard(4096, 0.7),
            ))
            .await
            .expect("exchange should succeed");

        let ChatOutcome::ToolPass { calls, .. } = outcome else {
            panic!("expected a tool pass");
        };
        // Invocation id mirrors the function name.
        assert_eq!(calls[0].call_id, "fred_series");
        assert_eq!(calls[0].args["series_id"], "DGS10");
    }

    #[test]
    fn tool_results_wire_as_function_responses() {
        let (_, contents) = wire_turns(&[
            Turn::request("go"),
            Turn::tool_result("fred_series", r#"{"value": 4.2}"#),
        ]);
        assert_eq!(contents.len(), 2);
        let response = &contents[1]["parts"][0]["functionResponse"];
        assert_eq!(response["name"], "fred_series");
        assert_eq!(response["response"]["value"], 4.2);
    }

    #[test]
    fn instructions_become_a_system_instruction_block() {
        let chat = GeminiChat::new("k", "gemini-2.5-pro");
        let payload = chat.payload(&ChatRequest::new(
            vec![Turn::instructions("be terse"), Turn::request("x")],
            Sampling::standard(1024, 0.5),
        ));
        assert_eq!(
            payload["systemInstruction"]["parts"][0]["text"],
            "be terse"
        );
        assert_eq!(payload["generationConfig"]["temperature"], 0.5);
    }
}
