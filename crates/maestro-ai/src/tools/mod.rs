//! The tool seam external collaborators plug into.
//!
//! A tool advertises one [`ToolSpec`] (its whole model-facing contract,
//! including whether its output is heavy enough to qualify for compression)
//! and executes [`ToolInvocation`]s into [`ToolReply`]s. The [`Toolbox`] is
//! the per-call bundle the runtime dispatches against.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AiError, Result};
use crate::llm::ToolInvocation;

/// The contract a tool advertises to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Call target; must be unique within a toolbox.
    pub name: String,
    /// What the model reads when deciding to call.
    pub purpose: String,
    /// JSON Schema for the arguments object.
    pub input_schema: Value,
    /// Large-output tools (time-series fetches, corpus searches) qualify for
    /// the compression post-processor.
    pub heavy: bool,
}

impl ToolSpec {
    pub fn new(name: impl Into<String>, purpose: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            purpose: purpose.into(),
            input_schema,
            heavy: false,
        }
    }

    /// Mark the tool's output as compression-eligible.
    pub fn heavy(mut self) -> Self {
        self.heavy = true;
        self
    }
}

/// Outcome of one tool execution.
///
/// A `Refusal` is a tool-level "no" the model can react to; transport and
/// classification failures surface as [`AiError`] instead.
#[derive(Debug, Clone)]
pub enum ToolReply {
    Data(Value),
    Refusal(String),
}

impl ToolReply {
    pub fn data(&self) -> Option<&Value> {
        match self {
            Self::Data(value) => Some(value),
            Self::Refusal(_) => None,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refusal(_))
    }

    /// The exact text fed back to the model.
    pub fn render(&self) -> String {
        match self {
            Self::Data(value) => value.to_string(),
            Self::Refusal(reason) => format!("tool error: {reason}"),
        }
    }
}

/// An executable tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The advertised contract; `spec().name` is the dispatch key.
    fn spec(&self) -> ToolSpec;

    /// Execute with the model-supplied arguments.
    async fn run(&self, args: Value) -> Result<ToolReply>;
}

/// The tools offered to one agent call.
///
/// Backed by a `BTreeMap` so the spec list the model sees is ordered the
/// same way every call.
#[derive(Default, Clone)]
pub struct Toolbox {
    entries: BTreeMap<String, Entry>,
}

#[derive(Clone)]
struct Entry {
    spec: ToolSpec,
    tool: Arc<dyn Tool>,
}

impl Toolbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration.
    pub fn with(mut self, tool: impl Tool + 'static) -> Self {
        self.add(Arc::new(tool));
        self
    }

    pub fn add(&mut self, tool: Arc<dyn Tool>) {
        let spec = tool.spec();
        self.entries.insert(spec.name.clone(), Entry { spec, tool });
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Whether the named tool's output qualifies for compression.
    pub fn is_heavy(&self, name: &str) -> bool {
        self.entries.get(name).is_some_and(|e| e.spec.heavy)
    }

    /// Specs advertised to the model, in name order.
    pub fn specs(&self) -> Vec<ToolSpec> {
        self.entries.values().map(|e| e.spec.clone()).collect()
    }

    /// Execute one invocation against its target tool.
    pub async fn dispatch(&self, invocation: &ToolInvocation) -> Result<ToolReply> {
        let entry = self
            .entries
            .get(&invocation.tool)
            .ok_or_else(|| AiError::ToolNotFound(invocation.tool.clone()))?;
        entry.tool.run(invocation.args.clone()).await
    }
}
