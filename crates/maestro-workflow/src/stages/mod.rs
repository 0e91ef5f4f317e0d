//! The five stage operators: generate, score, select, charter, deploy.
//!
//! Each operator takes well-typed input and returns well-typed output; the
//! orchestrator owns sequencing and checkpointing. Operators never mutate a
//! strategy after the validator has accepted it.

mod charter;
mod deploy;
mod generate;
mod score;
mod select;

pub use charter::audit_charter;
pub use deploy::{DeployOutcome, deployment_audit};
pub use generate::CANDIDATE_COUNT;

use std::sync::Arc;

use maestro_ai::{
    AgentCall, AgentRuntime, ChatModel, CompressionConfig, HistoryLimit, Toolbox,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::validate::Validator;

/// Shared dependencies for one workflow run's stage calls.
///
/// The chat model is resolved once per run (or injected by tests) so every
/// stage talks to the same endpoint.
pub struct StageRunner {
    runtime: Arc<AgentRuntime>,
    chat: Arc<dyn ChatModel>,
    reasoning: bool,
    validator: Arc<Validator>,
    research_tools: Toolbox,
    deploy_tools: Toolbox,
    config: WorkflowConfig,
}

impl StageRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        runtime: Arc<AgentRuntime>,
        chat: Arc<dyn ChatModel>,
        reasoning: bool,
        validator: Arc<Validator>,
        research_tools: Toolbox,
        deploy_tools: Toolbox,
        config: WorkflowConfig,
    ) -> Self {
        Self {
            runtime,
            chat,
            reasoning,
            validator,
            research_tools,
            deploy_tools,
            config,
        }
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    pub(crate) fn validator(&self) -> &Validator {
        &self.validator
    }

    pub(crate) fn deploy_tools(&self) -> &Toolbox {
        &self.deploy_tools
    }

    /// Base call with this run's deadline; stages customize from here.
    pub(crate) fn call(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        history_limit: HistoryLimit,
    ) -> AgentCall {
        AgentCall::new(self.chat.model(), system_prompt, user_prompt)
            .with_history_limit(history_limit)
            .with_deadline(self.config.call_deadline)
    }

    pub(crate) fn research_call(
        &self,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
        history_limit: HistoryLimit,
        compress: bool,
    ) -> AgentCall {
        let mut call = self
            .call(system_prompt, user_prompt, history_limit)
            .with_tools(self.research_tools.clone());
        if compress {
            call = call.with_compression(CompressionConfig::enabled());
        }
        call
    }

    pub(crate) async fn run<T>(&self, call: AgentCall) -> Result<T>
    where
        T: DeserializeOwned + JsonSchema,
    {
        Ok(self
            .runtime
            .run_with_client(self.chat.clone(), call, self.reasoning)
            .await?)
    }
}
