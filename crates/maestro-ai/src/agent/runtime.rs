//! The agent runtime: one structured LLM call with tools, adaptive history,
//! optional tool-result compression and a deadline.

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::agent::compression::{CompressionConfig, ToolResultCompressor};
use crate::agent::history::{HistoryLimit, trim_window};
use crate::agent::schema::{parse_structured, schema_fix_prompt, schema_instructions};
use crate::error::{AiError, Result};
use crate::llm::{
    ChatModel, ChatOutcome, ChatRequest, ModelId, ProviderRegistry, Sampling, ToolInvocation,
    Turn, UsageMeter,
};
use crate::tools::Toolbox;

const DEFAULT_DEADLINE: Duration = Duration::from_secs(300);
const DEFAULT_MAX_TOOL_ROUNDS: usize = 8;
const MAX_SCHEMA_RETRIES: usize = 3;
const NON_REASONING_TEMPERATURE: f32 = 0.7;

/// One runtime call: prompts, tools and per-stage knobs.
#[derive(Clone)]
pub struct AgentCall {
    pub model_id: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub tools: Toolbox,
    pub history_limit: HistoryLimit,
    pub compression: CompressionConfig,
    pub deadline: Duration,
    pub max_tool_rounds: usize,
}

impl AgentCall {
    pub fn new(
        model_id: impl Into<String>,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            tools: Toolbox::new(),
            history_limit: HistoryLimit::Medium,
            compression: CompressionConfig::default(),
            deadline: DEFAULT_DEADLINE,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_tools(mut self, tools: Toolbox) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_history_limit(mut self, limit: HistoryLimit) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

/// Provider-agnostic agent wrapper.
///
/// Routes `provider:name` model ids through the provider registry, enforces
/// structured output with bounded fix-retries, trims the window per call,
/// and compresses heavy tool results when the call opts in.
pub struct AgentRuntime {
    registry: ProviderRegistry,
    summarizer: Option<Arc<dyn ChatModel>>,
    track_tokens: bool,
}

impl Default for AgentRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentRuntime {
    pub fn new() -> Self {
        Self {
            registry: ProviderRegistry::new(),
            summarizer: None,
            track_tokens: env_flag("TRACK_TOKENS"),
        }
    }

    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Override the small model used for tool-result summarization.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn ChatModel>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Run the call and parse the reply into `T`.
    pub async fn run<T>(&self, call: AgentCall) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let model = ModelId::parse(&call.model_id)?;
        let chat = self.registry.client_for(&model)?;
        let reasoning = self.registry.is_reasoning(&model.name);
        self.run_with_client(chat, call, reasoning).await
    }

    /// Run against an explicit model (tests and embedders inject scripted
    /// models here).
    pub async fn run_with_client<T>(
        &self,
        chat: Arc<dyn ChatModel>,
        call: AgentCall,
        reasoning: bool,
    ) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let deadline = call.deadline;
        tokio::time::timeout(deadline, self.drive(chat, call, reasoning))
            .await
            .map_err(|_| AiError::Timeout(deadline.as_millis() as u64))?
    }

    async fn drive<T>(
        &self,
        chat: Arc<dyn ChatModel>,
        call: AgentCall,
        reasoning: bool,
    ) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        let compressor = self.compressor_for(&call, chat.clone());
        let budget = self.registry.max_output_tokens(chat.model());
        let sampling = if reasoning {
            Sampling::reasoning(budget)
        } else {
            Sampling::standard(budget, NON_REASONING_TEMPERATURE)
        };
        let specs = call.tools.specs();

        let mut turns = vec![
            Turn::instructions(format!(
                "{}{}",
                call.system_prompt,
                schema_instructions::<T>()
            )),
            Turn::request(call.user_prompt.clone()),
        ];

        let mut meter = UsageMeter::default();
        let mut schema_retries = 0usize;

        for _ in 0..call.max_tool_rounds {
            let request = ChatRequest::new(trim_window(&turns, call.history_limit), sampling)
                .with_tools(specs.clone());

            let outcome = chat.send(request).await?;
            meter.absorb(outcome.usage());

            let text = match outcome {
                ChatOutcome::ToolPass { calls, .. } => {
                    turns.push(Turn::tool_calls(calls.clone()));
                    for invocation in &calls {
                        let body = self
                            .settle_invocation(&call, compressor.as_ref(), invocation)
                            .await;
                        turns.push(Turn::tool_result(invocation.call_id.clone(), body));
                    }
                    continue;
                }
                ChatOutcome::Truncated { text, .. } => {
                    tracing::warn!(
                        model = chat.model(),
                        "Reply hit the output-token ceiling before parsing"
                    );
                    text
                }
                ChatOutcome::Answer { text, .. } => text,
            };

            match parse_structured::<T>(&text) {
                Ok(parsed) => {
                    if self.track_tokens {
                        tracing::info!(
                            model = chat.model(),
                            input_tokens = meter.input_tokens,
                            output_tokens = meter.output_tokens,
                            total_tokens = meter.total(),
                            "Agent call complete"
                        );
                    }
                    return Ok(parsed);
                }
                Err(error) => {
                    schema_retries += 1;
                    if schema_retries > MAX_SCHEMA_RETRIES {
                        return Err(error);
                    }
                    tracing::warn!(
                        model = chat.model(),
                        attempt = schema_retries,
                        error = %error,
                        "Schema validation failed, sending fix prompt"
                    );
                    turns.push(Turn::reply(text));
                    turns.push(Turn::request(schema_fix_prompt(&error.to_string())));
                }
            }
        }

        Err(AiError::MaxIterations(call.max_tool_rounds))
    }

    /// Dispatch one invocation, feed refusals and failures back as text the
    /// model can react to, and compress when the call opts in.
    async fn settle_invocation(
        &self,
        call: &AgentCall,
        compressor: Option<&ToolResultCompressor>,
        invocation: &ToolInvocation,
    ) -> String {
        let rendered = match call.tools.dispatch(invocation).await {
            Ok(reply) => reply.render(),
            Err(error) => {
                tracing::warn!(tool = %invocation.tool, error = %error, "Tool dispatch failed");
                format!("tool error: {error}")
            }
        };

        match compressor {
            Some(compressor) => {
                let heavy = call.tools.is_heavy(&invocation.tool);
                compressor.process(&invocation.tool, heavy, rendered).await
            }
            None => rendered,
        }
    }

    fn compressor_for(
        &self,
        call: &AgentCall,
        fallback: Arc<dyn ChatModel>,
    ) -> Option<ToolResultCompressor> {
        if !call.compression.enabled {
            return None;
        }
        let summarizer = match &self.summarizer {
            Some(chat) => chat.clone(),
            None => self.resolve_summarizer().unwrap_or(fallback),
        };
        Some(ToolResultCompressor::new(
            summarizer,
            call.compression.clone(),
        ))
    }

    fn resolve_summarizer(&self) -> Option<Arc<dyn ChatModel>> {
        let model_id = std::env::var("SUMMARIZATION_MODEL").ok()?;
        let model = ModelId::parse(&model_id).ok()?;
        self.registry.client_for(&model).ok()
    }
}

/// Truthy env-var check shared by runtime feature flags.
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ScriptedChat, ScriptedStep};
    use crate::tools::{Tool, ToolReply, ToolSpec};
    use async_trait::async_trait;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::{Value, json};

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Answer {
        value: i64,
    }

    struct SeriesTool;

    #[async_trait]
    impl Tool for SeriesTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new(
                "fred_series",
                "Fetch a macro series",
                json!({"type": "object", "properties": {"series_id": {"type": "string"}}}),
            )
            .heavy()
        }

        async fn run(&self, _args: Value) -> Result<ToolReply> {
            Ok(ToolReply::Data(json!({"series": [1, 2, 3]})))
        }
    }

    fn call() -> AgentCall {
        AgentCall::new("scripted:any", "You are a test agent.", "Answer.")
    }

    fn scripted(steps: Vec<ScriptedStep>) -> Arc<ScriptedChat> {
        Arc::new(ScriptedChat::new("scripted-model", steps))
    }

    #[tokio::test]
    async fn parses_structured_reply() {
        let chat = scripted(vec![ScriptedStep::answer(r#"{"value": 42}"#)]);
        let runtime = AgentRuntime::new();
        let answer: Answer = runtime.run_with_client(chat, call(), false).await.unwrap();
        assert_eq!(answer.value, 42);
    }

    #[tokio::test]
    async fn schema_failure_retries_with_fix_prompt() {
        let chat = scripted(vec![
            ScriptedStep::answer("not json at all"),
            ScriptedStep::answer(r#"{"value": 7}"#),
        ]);
        let runtime = AgentRuntime::new();
        let answer: Answer = runtime.run_with_client(chat, call(), false).await.unwrap();
        assert_eq!(answer.value, 7);
    }

    #[tokio::test]
    async fn schema_retries_are_bounded() {
        let steps = (0..5)
            .map(|_| ScriptedStep::answer("still not json"))
            .collect::<Vec<_>>();
        let runtime = AgentRuntime::new();
        let err = runtime
            .run_with_client::<Answer>(scripted(steps), call(), false)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Schema(_)));
    }

    #[tokio::test]
    async fn tool_rounds_feed_results_back() {
        let chat = scripted(vec![
            ScriptedStep::invoke("call-1", "fred_series", json!({"series_id": "DGS10"})),
            ScriptedStep::answer(r#"{"value": 3}"#),
        ]);
        let tools = Toolbox::new().with(SeriesTool);

        let runtime = AgentRuntime::new();
        let answer: Answer = runtime
            .run_with_client(chat, call().with_tools(tools), false)
            .await
            .unwrap();
        assert_eq!(answer.value, 3);
    }

    #[tokio::test]
    async fn unknown_tool_surfaces_as_tool_error_text() {
        let chat = scripted(vec![
            ScriptedStep::invoke("call-1", "nonexistent", json!({})),
            ScriptedStep::answer(r#"{"value": 0}"#),
        ]);
        let runtime = AgentRuntime::new();
        let answer: Answer = runtime.run_with_client(chat, call(), false).await.unwrap();
        assert_eq!(answer.value, 0);
    }

    #[tokio::test]
    async fn deadline_maps_to_timeout_error() {
        let chat = scripted(vec![
            ScriptedStep::answer(r#"{"value": 1}"#).after(Duration::from_millis(200)),
        ]);
        let runtime = AgentRuntime::new();
        let strict = call().with_deadline(Duration::from_millis(20));
        let err = runtime
            .run_with_client::<Answer>(chat, strict, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AiError::Timeout(_)));
    }
}
