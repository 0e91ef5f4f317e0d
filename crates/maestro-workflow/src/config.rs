//! Workflow configuration, mostly environment-driven.

use std::collections::BTreeSet;
use std::time::Duration;

use maestro_ai::env_flag;

const DEFAULT_MODEL: &str = "anthropic:claude-sonnet-4-20250514";
const DEFAULT_CALL_DEADLINE_SECS: u64 = 300;

/// Per-stage opt-in for tool-result compression. Only stages with tool access
/// can benefit; compression is off everywhere by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageCompression {
    pub generate: bool,
    pub charter: bool,
}

/// Knobs for one workflow run.
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// `provider:name` used when the caller does not specify a model.
    pub default_model: String,
    pub stage_compression: StageCompression,
    /// Tickers accepted by the deployment platform. `None` disables the
    /// universe check.
    pub deployable_universe: Option<BTreeSet<String>>,
    /// Assets the charter audit considers defensive for branch plausibility.
    pub defensive_assets: BTreeSet<String>,
    /// Card color shown on the platform.
    pub symphony_color: String,
    pub asset_class: String,
    /// Deadline applied to each LLM call.
    pub call_deadline: Duration,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            default_model: DEFAULT_MODEL.to_string(),
            stage_compression: StageCompression::default(),
            deployable_universe: None,
            defensive_assets: [
                "TLT", "IEF", "SHY", "BIL", "AGG", "BND", "GLD", "IAU", "SGOV", "VGIT",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            symphony_color: "#4F46E5".to_string(),
            asset_class: "EQUITIES".to_string(),
            call_deadline: Duration::from_secs(DEFAULT_CALL_DEADLINE_SECS),
        }
    }
}

impl WorkflowConfig {
    /// Read the env-driven settings; everything else keeps defaults.
    ///
    /// Recognized variables: `DEFAULT_MODEL`, `COMPRESS_MCP_RESULTS`
    /// (enables compression for the tool-bearing stages). Provider
    /// credentials are read by the agent runtime per call, not here.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(model) = std::env::var("DEFAULT_MODEL") {
            if !model.trim().is_empty() {
                config.default_model = model;
            }
        }
        if env_flag("COMPRESS_MCP_RESULTS") {
            config.stage_compression.generate = true;
            config.stage_compression.charter = true;
        }
        config
    }

    pub fn with_deployable_universe(mut self, universe: BTreeSet<String>) -> Self {
        self.deployable_universe = Some(universe);
        self
    }
}
