//! Point-in-time market context pack, consumed read-only.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Anchor-dated snapshot of macro indicators, regime tags and recent events.
///
/// Field semantics are fixed at the producer; the workflow never mutates the
/// pack and never fetches fresher data to override it - `anchor_date` is
/// authoritative for every macro claim downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ContextPack {
    pub anchor_date: NaiveDate,
    /// Narrative summary of the prevailing regime.
    pub regime_snapshot: String,
    /// Producer-defined indicator map (rates, spreads, vol levels, ...).
    pub macro_indicators: Value,
    /// Producer-defined benchmark return table.
    pub benchmark_performance: Value,
    pub recent_events: Vec<String>,
    pub regime_tags: Vec<String>,
}

impl ContextPack {
    /// Full pack as pretty JSON for prompt embedding.
    pub fn to_prompt_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Case-insensitive regime tag membership.
    pub fn has_regime_tag(&self, tag: &str) -> bool {
        self.regime_tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }
}
