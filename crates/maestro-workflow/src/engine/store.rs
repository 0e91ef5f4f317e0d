//! Checkpoint persistence interface plus the provided stores.

use std::path::PathBuf;

use async_trait::async_trait;
use maestro_models::WorkflowCheckpoint;
use tokio::sync::Mutex;

use crate::error::{Result, WorkflowError};

/// Host persistence seam for workflow checkpoints.
///
/// `save` must be atomic from the reader's perspective: a crash mid-save
/// leaves the previously stored checkpoint readable.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn save(&self, checkpoint: &WorkflowCheckpoint) -> Result<()>;
    async fn load(&self) -> Result<Option<WorkflowCheckpoint>>;
    async fn clear(&self) -> Result<()>;
}

/// In-memory store for tests and embedders that manage persistence
/// themselves.
#[derive(Default)]
pub struct MemoryCheckpointStore {
    inner: Mutex<Option<WorkflowCheckpoint>>,
    saves: Mutex<usize>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saves performed, for sequencing assertions in tests.
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn save(&self, checkpoint: &WorkflowCheckpoint) -> Result<()> {
        *self.inner.lock().await = Some(checkpoint.clone());
        *self.saves.lock().await += 1;
        Ok(())
    }

    async fn load(&self) -> Result<Option<WorkflowCheckpoint>> {
        Ok(self.inner.lock().await.clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.inner.lock().await = None;
        Ok(())
    }
}

/// JSON-on-disk store with write-temp-then-rename atomicity.
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let mut path = self.path.clone();
        path.set_extension("json.tmp");
        path
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn save(&self, checkpoint: &WorkflowCheckpoint) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(checkpoint)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .map_err(|e| WorkflowError::Checkpoint(format!("write {}: {e}", temp.display())))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|e| {
                WorkflowError::Checkpoint(format!("rename to {}: {e}", self.path.display()))
            })?;
        tracing::debug!(
            path = %self.path.display(),
            stage = checkpoint.last_completed_stage.as_str(),
            "Checkpoint saved"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<WorkflowCheckpoint>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(WorkflowError::Checkpoint(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };
        let checkpoint = serde_json::from_slice(&bytes)?;
        Ok(Some(checkpoint))
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(WorkflowError::Checkpoint(format!(
                "remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
