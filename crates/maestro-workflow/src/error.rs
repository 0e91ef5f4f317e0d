//! Error types for the workflow engine

use maestro_models::WorkflowStage;
use thiserror::Error;

use crate::validate::ValidationError;

/// Workflow engine error types
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Candidate failed validation with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    #[error("No candidate passed the scoring threshold")]
    NoPassingCandidate,

    #[error("Deployment audit failed: {0}")]
    DeploymentAudit(String),

    #[error("Logic tree translation failed: {0}")]
    Translate(String),

    #[error("Checkpoint store error: {0}")]
    Checkpoint(String),

    #[error("Stage {stage:?} failed: {message}")]
    Stage {
        stage: WorkflowStage,
        message: String,
    },

    #[error(transparent)]
    Ai(#[from] maestro_ai::AiError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WorkflowError {
    pub fn stage(stage: WorkflowStage, message: impl Into<String>) -> Self {
        Self::Stage {
            stage,
            message: message.into(),
        }
    }
}

/// Result type alias for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;
