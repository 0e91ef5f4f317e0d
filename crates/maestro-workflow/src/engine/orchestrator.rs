//! The workflow orchestrator: a linear state machine over the five stages
//! with a checkpoint after each.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use maestro_ai::{AgentRuntime, ChatModel, ModelId, Toolbox};
use maestro_models::{ContextPack, WorkflowCheckpoint, WorkflowStage};

use crate::config::WorkflowConfig;
use crate::engine::store::CheckpointStore;
use crate::error::{Result, WorkflowError};
use crate::stages::StageRunner;
use crate::validate::Validator;

/// Final result of a workflow run or resume.
#[derive(Debug, Clone)]
pub struct WorkflowOutcome {
    pub symphony_id: Option<String>,
    pub deployed_at: Option<DateTime<Utc>>,
    /// The checkpoint as of the last completed stage. Preserved in the store
    /// unless deployment succeeded (then the store is cleared).
    pub checkpoint: WorkflowCheckpoint,
}

/// Drives generate -> score -> select -> charter -> deploy.
///
/// The orchestrator exclusively owns the mutable workflow state. Stage `k+1`
/// only ever observes the outputs of stages `1..=k`, every transition is
/// persisted before it happens, and a failed stage leaves the prior
/// checkpoint untouched.
pub struct StrategyWorkflow {
    runtime: Arc<AgentRuntime>,
    validator: Arc<Validator>,
    store: Arc<dyn CheckpointStore>,
    config: WorkflowConfig,
    research_tools: Toolbox,
    deploy_tools: Toolbox,
    client_override: Option<Arc<dyn ChatModel>>,
}

impl StrategyWorkflow {
    pub fn new(store: Arc<dyn CheckpointStore>) -> Self {
        Self {
            runtime: Arc::new(AgentRuntime::new()),
            validator: Arc::new(Validator::default()),
            store,
            config: WorkflowConfig::from_env(),
            research_tools: Toolbox::new(),
            deploy_tools: Toolbox::new(),
            client_override: None,
        }
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    pub fn with_runtime(mut self, runtime: Arc<AgentRuntime>) -> Self {
        self.runtime = runtime;
        self
    }

    /// Tools available to generation and charter calls (macro series,
    /// price history).
    pub fn with_research_tools(mut self, tools: Toolbox) -> Self {
        self.research_tools = tools;
        self
    }

    /// Must contain `symphony_save` for deployment to reach the platform.
    pub fn with_deploy_tools(mut self, tools: Toolbox) -> Self {
        self.deploy_tools = tools;
        self
    }

    /// Route every stage call to this model instead of resolving the model
    /// id. Used by tests to inject scripted models.
    pub fn with_client(mut self, chat: Arc<dyn ChatModel>) -> Self {
        self.client_override = Some(chat);
        self
    }

    fn stage_runner(&self, model_id: &str) -> Result<StageRunner> {
        let (chat, reasoning) = match &self.client_override {
            Some(chat) => (chat.clone(), false),
            None => {
                let parsed = ModelId::parse(model_id).map_err(WorkflowError::Ai)?;
                let chat = self
                    .runtime
                    .registry()
                    .client_for(&parsed)
                    .map_err(WorkflowError::Ai)?;
                let reasoning = self.runtime.registry().is_reasoning(&parsed.name);
                (chat, reasoning)
            }
        };
        Ok(StageRunner::new(
            self.runtime.clone(),
            chat,
            reasoning,
            self.validator.clone(),
            self.research_tools.clone(),
            self.deploy_tools.clone(),
            self.config.clone(),
        ))
    }

    /// Run the full pipeline from a fresh context pack.
    pub async fn run(&self, ctx: ContextPack, model_id: Option<&str>) -> Result<WorkflowOutcome> {
        let model = model_id.unwrap_or(&self.config.default_model).to_string();
        let runner = self.stage_runner(&model)?;

        tracing::info!(model = %model, anchor_date = %ctx.anchor_date, "Workflow starting");

        let candidates = runner.generate(&ctx).await?;
        let checkpoint = WorkflowCheckpoint::new(ctx, model, candidates);
        self.store.save(&checkpoint).await?;
        tracing::info!(
            stage = checkpoint.last_completed_stage.as_str(),
            candidates = checkpoint.candidates.as_ref().map(Vec::len).unwrap_or(0),
            "Stage complete"
        );

        self.advance(runner, checkpoint).await
    }

    /// Resume from a persisted checkpoint: jump to the successor of the last
    /// completed stage with the cached outputs; earlier stages never re-run.
    pub async fn resume(&self, checkpoint: WorkflowCheckpoint) -> Result<WorkflowOutcome> {
        let runner = self.stage_runner(&checkpoint.model_id.clone())?;
        tracing::info!(
            last_completed = checkpoint.last_completed_stage.as_str(),
            "Resuming workflow"
        );
        self.advance(runner, checkpoint).await
    }

    async fn advance(
        &self,
        runner: StageRunner,
        mut checkpoint: WorkflowCheckpoint,
    ) -> Result<WorkflowOutcome> {
        while let Some(stage) = checkpoint.next_stage() {
            match stage {
                WorkflowStage::Candidates => unreachable!("candidates is never a successor"),
                WorkflowStage::Scoring => {
                    let candidates = required(&checkpoint.candidates, stage, "candidates")?;
                    let scorecards =
                        runner.score_all(&candidates, &checkpoint.context_pack).await?;
                    checkpoint.scorecards = Some(scorecards);
                }
                WorkflowStage::Selection => {
                    let candidates = required(&checkpoint.candidates, stage, "candidates")?;
                    let scorecards = required(&checkpoint.scorecards, stage, "scorecards")?;
                    let (winner, reasoning) = runner
                        .select(&candidates, &scorecards, &checkpoint.context_pack)
                        .await?;
                    checkpoint.winner = Some(winner);
                    checkpoint.selection = Some(reasoning);
                }
                WorkflowStage::Charter => {
                    let candidates = required(&checkpoint.candidates, stage, "candidates")?;
                    let scorecards = required(&checkpoint.scorecards, stage, "scorecards")?;
                    let winner = required(&checkpoint.winner, stage, "winner")?;
                    let selection = required(&checkpoint.selection, stage, "selection")?;
                    let charter = runner
                        .charter(
                            &winner,
                            &selection,
                            &candidates,
                            &scorecards,
                            &checkpoint.context_pack,
                        )
                        .await?;
                    checkpoint.charter = Some(charter);
                }
                WorkflowStage::Deployment => {
                    let winner = required(&checkpoint.winner, stage, "winner")?;
                    let charter = required(&checkpoint.charter, stage, "charter")?;
                    let outcome = runner
                        .deploy(&winner, &charter, &checkpoint.context_pack)
                        .await?;

                    if !outcome.is_deployed() {
                        // Clean abort: checkpoint stays at CHARTER so the
                        // run remains resumable.
                        tracing::info!("Deployment aborted cleanly; checkpoint preserved");
                        return Ok(WorkflowOutcome {
                            symphony_id: None,
                            deployed_at: None,
                            checkpoint,
                        });
                    }

                    checkpoint.symphony_id = outcome.symphony_id.clone();
                    checkpoint.deployed_at = outcome.deployed_at;
                }
            }

            checkpoint.advance(stage);
            self.store.save(&checkpoint).await?;
            tracing::info!(stage = stage.as_str(), "Stage complete");
        }

        // Deployment finished: the checkpoint has served its purpose.
        self.store.clear().await?;
        tracing::info!(
            symphony_id = checkpoint.symphony_id.as_deref().unwrap_or(""),
            "Workflow complete"
        );
        Ok(WorkflowOutcome {
            symphony_id: checkpoint.symphony_id.clone(),
            deployed_at: checkpoint.deployed_at,
            checkpoint,
        })
    }
}

fn required<T: Clone>(
    field: &Option<T>,
    stage: WorkflowStage,
    name: &str,
) -> Result<T> {
    field.clone().ok_or_else(|| {
        WorkflowError::stage(stage, format!("checkpoint missing `{name}` for this stage"))
    })
}
