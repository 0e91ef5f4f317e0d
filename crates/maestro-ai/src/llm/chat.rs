//! Provider-neutral chat types.
//!
//! The conversation is a sequence of [`Turn`]s rather than role-tagged
//! message structs: trimming, checkpointing and provider wire mapping all
//! branch on the turn kind, so the kind is the type. A provider call takes a
//! [`ChatRequest`] (window + advertised tools + sampling) and yields a
//! [`ChatOutcome`] verdict the runtime matches on.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::tools::ToolSpec;

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Provider-assigned call id; echoed back on the matching result turn.
    pub call_id: String,
    pub tool: String,
    pub args: Value,
}

impl ToolInvocation {
    pub fn new(call_id: impl Into<String>, tool: impl Into<String>, args: Value) -> Self {
        Self {
            call_id: call_id.into(),
            tool: tool.into(),
            args,
        }
    }
}

/// One turn of the rolling conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "turn", rename_all = "snake_case")]
pub enum Turn {
    /// System instructions. Pinned: never trimmed out of the window.
    Instructions { text: String },
    /// A user request.
    Request { text: String },
    /// Model reply: prose, tool invocations, or both.
    Reply {
        #[serde(default)]
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        calls: Vec<ToolInvocation>,
    },
    /// Result of one tool invocation, rendered for the model.
    ToolResult { call_id: String, body: String },
}

impl Turn {
    pub fn instructions(text: impl Into<String>) -> Self {
        Self::Instructions { text: text.into() }
    }

    pub fn request(text: impl Into<String>) -> Self {
        Self::Request { text: text.into() }
    }

    pub fn reply(text: impl Into<String>) -> Self {
        Self::Reply {
            text: text.into(),
            calls: Vec::new(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolInvocation>) -> Self {
        Self::Reply {
            text: String::new(),
            calls,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, body: impl Into<String>) -> Self {
        Self::ToolResult {
            call_id: call_id.into(),
            body: body.into(),
        }
    }

    pub fn is_instructions(&self) -> bool {
        matches!(self, Self::Instructions { .. })
    }

    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }

    /// The turn's text, when it carries any.
    pub fn text(&self) -> &str {
        match self {
            Self::Instructions { text } | Self::Request { text } | Self::Reply { text, .. } => {
                text
            }
            Self::ToolResult { body, .. } => body,
        }
    }
}

/// Sampling and budget knobs for one call, resolved from the model's
/// reasoning classification.
#[derive(Debug, Clone, Copy)]
pub struct Sampling {
    /// Output-token ceiling.
    pub max_output_tokens: u32,
    /// Unset for reasoning models; their providers reject or ignore it.
    pub temperature: Option<f32>,
    /// Switches provider-specific request shaping for long
    /// chain-of-reasoning models.
    pub reasoning: bool,
}

impl Sampling {
    pub fn standard(max_output_tokens: u32, temperature: f32) -> Self {
        Self {
            max_output_tokens,
            temperature: Some(temperature),
            reasoning: false,
        }
    }

    pub fn reasoning(max_output_tokens: u32) -> Self {
        Self {
            max_output_tokens,
            temperature: None,
            reasoning: true,
        }
    }
}

/// Token accounting for one exchange; accumulated per agent call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageMeter {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl UsageMeter {
    pub fn total(&self) -> u32 {
        self.input_tokens + self.output_tokens
    }

    pub fn absorb(&mut self, other: UsageMeter) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }
}

/// One provider exchange: the trimmed window plus the advertised tools.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub turns: Vec<Turn>,
    pub tools: Vec<ToolSpec>,
    pub sampling: Sampling,
}

impl ChatRequest {
    pub fn new(turns: Vec<Turn>, sampling: Sampling) -> Self {
        Self {
            turns,
            tools: Vec::new(),
            sampling,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolSpec>) -> Self {
        self.tools = tools;
        self
    }
}

/// Provider verdict for one exchange.
#[derive(Debug, Clone)]
pub enum ChatOutcome {
    /// Final prose answer.
    Answer { text: String, usage: UsageMeter },
    /// The model wants tool results before it answers.
    ToolPass {
        calls: Vec<ToolInvocation>,
        usage: UsageMeter,
    },
    /// The reply hit the output-token ceiling mid-answer.
    Truncated { text: String, usage: UsageMeter },
}

impl ChatOutcome {
    pub fn usage(&self) -> UsageMeter {
        match self {
            Self::Answer { usage, .. }
            | Self::ToolPass { usage, .. }
            | Self::Truncated { usage, .. } => *usage,
        }
    }
}

/// A chat-capable model endpoint.
#[async_trait]
pub trait ChatModel: Send + Sync {
    fn provider(&self) -> &str;

    fn model(&self) -> &str;

    /// Run one exchange against the provider.
    async fn send(&self, request: ChatRequest) -> Result<ChatOutcome>;
}
