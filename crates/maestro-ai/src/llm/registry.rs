//! Provider registry: model-id routing, credentials, reasoning detection.
//!
//! A `model_id` is `provider:name`. Routing is explicit per-call
//! configuration: the registry reads the provider's key (and any base-URL
//! override) from the environment at client-construction time and passes it
//! into the client. Nothing is written back to the environment, so
//! concurrent workflows in one process cannot misroute each other.

use std::sync::Arc;

use crate::error::{AiError, Result};
use crate::llm::anthropic::AnthropicChat;
use crate::llm::chat::ChatModel;
use crate::llm::gemini::GeminiChat;
use crate::llm::openai::OpenAiChat;
use crate::llm::transport::Backoff;

/// Recognized LLM providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
    DeepSeek,
    Kimi,
    Together,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::DeepSeek => "deepseek",
            Self::Kimi => "kimi",
            Self::Together => "together",
        }
    }

    pub fn parse(prefix: &str) -> Option<Self> {
        match prefix.to_lowercase().as_str() {
            "openai" => Some(Self::OpenAi),
            "anthropic" => Some(Self::Anthropic),
            // Google-native SDK alias.
            "gemini" | "google" => Some(Self::Gemini),
            "deepseek" => Some(Self::DeepSeek),
            "kimi" | "moonshot" => Some(Self::Kimi),
            "together" => Some(Self::Together),
            _ => None,
        }
    }

    /// Environment variable holding the provider credential.
    pub fn env_key(&self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Anthropic => "ANTHROPIC_API_KEY",
            Self::Gemini => "GOOGLE_API_KEY",
            Self::DeepSeek => "DEEPSEEK_API_KEY",
            Self::Kimi => "KIMI_API_KEY",
            Self::Together => "TOGETHER_API_KEY",
        }
    }

    /// Chat-completions endpoint for OpenAI-compatible providers.
    pub fn base_url(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi | Self::Anthropic | Self::Gemini => None,
            Self::DeepSeek => Some("https://api.deepseek.com/v1"),
            Self::Kimi => Some("https://api.moonshot.cn/v1"),
            Self::Together => Some("https://api.together.xyz/v1"),
        }
    }

    fn is_openai_compatible(&self) -> bool {
        matches!(self, Self::OpenAi | Self::DeepSeek | Self::Kimi | Self::Together)
    }
}

/// A parsed `provider:name` model identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelId {
    pub provider: Provider,
    pub name: String,
}

impl ModelId {
    pub fn parse(model_id: &str) -> Result<Self> {
        let (prefix, name) = model_id
            .split_once(':')
            .ok_or_else(|| AiError::UnknownModel(model_id.to_string()))?;
        let provider =
            Provider::parse(prefix).ok_or_else(|| AiError::UnknownModel(model_id.to_string()))?;
        if name.is_empty() {
            return Err(AiError::UnknownModel(model_id.to_string()));
        }
        Ok(Self {
            provider,
            name: name.to_string(),
        })
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.provider.as_str(), self.name)
    }
}

/// Bare model-name prefixes treated as non-reasoning. Everything else is
/// assumed to be a reasoning model and gets the larger output budget.
const DEFAULT_NON_REASONING_PREFIXES: &[&str] = &[
    "gpt-4o",
    "gpt-4.1",
    "gpt-3.5",
    "claude-3-haiku",
    "claude-3-5-haiku",
    "gemini-1.5-flash",
    "gemini-2.0-flash",
    "deepseek-chat",
    "llama",
    "mixtral",
    "qwen",
];

pub const REASONING_MAX_TOKENS: u32 = 16_384;
pub const STANDARD_MAX_TOKENS: u32 = 4_096;

/// Builds clients for parsed model ids and answers reasoning-model queries.
#[derive(Clone)]
pub struct ProviderRegistry {
    non_reasoning_prefixes: Vec<String>,
    backoff: Backoff,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self {
            non_reasoning_prefixes: DEFAULT_NON_REASONING_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            backoff: Backoff::default(),
        }
    }

    pub fn with_non_reasoning_prefixes(mut self, prefixes: Vec<String>) -> Self {
        self.non_reasoning_prefixes = prefixes;
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Reasoning unless the bare name starts with an allow-listed prefix.
    pub fn is_reasoning(&self, model_name: &str) -> bool {
        let lower = model_name.to_lowercase();
        !self
            .non_reasoning_prefixes
            .iter()
            .any(|prefix| lower.starts_with(&prefix.to_lowercase()))
    }

    /// Default output-token budget for the model.
    pub fn max_output_tokens(&self, model_name: &str) -> u32 {
        if self.is_reasoning(model_name) {
            REASONING_MAX_TOKENS
        } else {
            STANDARD_MAX_TOKENS
        }
    }

    /// Build a client, resolving the credential from the environment.
    ///
    /// Keys are read here, once per call, and never logged or cached.
    pub fn client_for(&self, model_id: &ModelId) -> Result<Arc<dyn ChatModel>> {
        let key = std::env::var(model_id.provider.env_key())
            .map_err(|_| AiError::MissingCredential(model_id.provider.env_key()))?;
        let base_override = if model_id.provider == Provider::OpenAi {
            std::env::var("OPENAI_BASE_URL").ok()
        } else {
            None
        };
        self.client_with_key(model_id, &key, base_override.as_deref())
    }

    /// Build a client from an explicit credential (tests, embedders).
    pub fn client_with_key(
        &self,
        model_id: &ModelId,
        api_key: &str,
        base_url_override: Option<&str>,
    ) -> Result<Arc<dyn ChatModel>> {
        let provider = model_id.provider;
        if provider.is_openai_compatible() {
            let mut chat = OpenAiChat::new(api_key, model_id.name.clone())
                .with_provider_label(provider.as_str())
                .with_backoff(self.backoff.clone());
            if let Some(url) = base_url_override.or_else(|| provider.base_url()) {
                chat = chat.with_base_url(url);
            }
            return Ok(Arc::new(chat));
        }

        match provider {
            Provider::Anthropic => {
                let mut chat = AnthropicChat::new(api_key, model_id.name.clone())
                    .with_backoff(self.backoff.clone());
                if let Some(url) = base_url_override {
                    chat = chat.with_base_url(url);
                }
                Ok(Arc::new(chat))
            }
            Provider::Gemini => {
                let mut chat = GeminiChat::new(api_key, model_id.name.clone())
                    .with_backoff(self.backoff.clone());
                if let Some(url) = base_url_override {
                    chat = chat.with_base_url(url);
                }
                Ok(Arc::new(chat))
            }
            _ => unreachable!("openai-compatible providers handled above"),
        }
    }
}
