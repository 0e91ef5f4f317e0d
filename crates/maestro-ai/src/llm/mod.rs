//! LLM module - multi-provider chat abstraction and routing

mod anthropic;
mod chat;
mod gemini;
mod openai;
mod registry;
mod scripted;
mod transport;

pub use anthropic::AnthropicChat;
pub use chat::{
    ChatModel, ChatOutcome, ChatRequest, Sampling, ToolInvocation, Turn, UsageMeter,
};
pub use gemini::GeminiChat;
pub use openai::OpenAiChat;
pub use registry::{
    ModelId, Provider, ProviderRegistry, REASONING_MAX_TOKENS, STANDARD_MAX_TOKENS,
};
pub use scripted::{ScriptedChat, ScriptedStep};
pub use transport::{Backoff, call_with_backoff};
