//! Maestro AI - provider-agnostic agent runtime
//!
//! This crate provides:
//! - Multi-provider chat clients (OpenAI, Anthropic, Gemini, plus
//!   OpenAI-compatible DeepSeek / Kimi / Together routing)
//! - `provider:name` model routing with per-call credential resolution
//! - Structured output enforcement with bounded fix-retries
//! - Per-call adaptive window trimming and tool-result compression
//! - The tool contract and per-call toolbox

pub mod agent;
pub mod error;
pub mod http_client;
pub mod llm;
pub mod tools;

pub use agent::{
    AgentCall, AgentRuntime, CompressionConfig, HistoryLimit, ToolResultCompressor, env_flag,
};
pub use error::{AiError, Result};
pub use llm::{
    AnthropicChat, Backoff, ChatModel, ChatOutcome, ChatRequest, GeminiChat, ModelId, OpenAiChat,
    Provider, ProviderRegistry, Sampling, ScriptedChat, ScriptedStep, ToolInvocation, Turn,
    UsageMeter,
};
pub use tools::{Tool, ToolReply, ToolSpec, Toolbox};
