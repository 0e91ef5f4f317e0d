//! The human-readable deployment charter.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Five-section document synthesized for the winning strategy.
///
/// Constructed once after selection and never mutated; the post-synthesis
/// logic audit may log warnings but does not touch the charter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Charter {
    pub market_thesis: String,
    pub strategy_selection: String,
    pub expected_behavior: String,
    /// 3-8 concrete ways the strategy loses.
    pub failure_modes: Vec<String>,
    pub outlook_90d: String,
}

impl Charter {
    pub fn failure_mode_count_in_bounds(&self) -> bool {
        (3..=8).contains(&self.failure_modes.len())
    }
}
