//! Workflow stage machine and the resumable checkpoint record.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::charter::Charter;
use crate::context::ContextPack;
use crate::scorecard::{EdgeScorecard, SelectionReasoning};
use crate::strategy::Strategy;

pub const CHECKPOINT_SCHEMA_VERSION: u32 = 1;

/// The five pipeline stages, in execution order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum WorkflowStage {
    Candidates,
    Scoring,
    Selection,
    Charter,
    Deployment,
}

impl WorkflowStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Candidates => "CANDIDATES",
            Self::Scoring => "SCORING",
            Self::Selection => "SELECTION",
            Self::Charter => "CHARTER",
            Self::Deployment => "DEPLOYMENT",
        }
    }

    /// Stage following this one, or `None` after deployment.
    pub fn succ(&self) -> Option<WorkflowStage> {
        match self {
            Self::Candidates => Some(Self::Scoring),
            Self::Scoring => Some(Self::Selection),
            Self::Selection => Some(Self::Charter),
            Self::Charter => Some(Self::Deployment),
            Self::Deployment => None,
        }
    }
}

/// Accumulated workflow state, persisted after every completed stage.
///
/// The record grows monotonically with stage progression: a checkpoint at
/// stage `k` carries the outputs of stages `1..=k` and nothing later. A crash
/// mid-stage leaves the previous checkpoint intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowCheckpoint {
    pub schema_version: u32,
    pub last_completed_stage: WorkflowStage,
    pub context_pack: ContextPack,
    pub model_id: String,
    /// Surviving candidates in persona order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Strategy>>,
    /// Parallel to `candidates`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scorecards: Option<Vec<EdgeScorecard>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Strategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionReasoning>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charter: Option<Charter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symphony_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowCheckpoint {
    /// Fresh checkpoint recording the first completed stage.
    pub fn new(
        context_pack: ContextPack,
        model_id: impl Into<String>,
        candidates: Vec<Strategy>,
    ) -> Self {
        let now = Utc::now();
        Self {
            schema_version: CHECKPOINT_SCHEMA_VERSION,
            last_completed_stage: WorkflowStage::Candidates,
            context_pack,
            model_id: model_id.into(),
            candidates: Some(candidates),
            scorecards: None,
            winner: None,
            selection: None,
            charter: None,
            symphony_id: None,
            deployed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark a stage complete and bump `updated_at`. Stages never move
    /// backwards.
    pub fn advance(&mut self, stage: WorkflowStage) {
        debug_assert!(stage >= self.last_completed_stage);
        self.last_completed_stage = stage;
        self.updated_at = Utc::now();
    }

    /// Stage to run next on resume, or `None` when the workflow is done.
    pub fn next_stage(&self) -> Option<WorkflowStage> {
        self.last_completed_stage.succ()
    }
}
