//! The central `Strategy` entity and its classification enums.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::logic_tree::LogicTree;

/// How often the allocation is re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RebalanceFrequency {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
    None,
}

impl RebalanceFrequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::None => "none",
        }
    }
}

/// Economic source of the claimed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    Behavioral,
    Structural,
    Informational,
    RiskPremium,
    Unspecified,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Behavioral => "behavioral",
            Self::Structural => "structural",
            Self::Informational => "informational",
            Self::RiskPremium => "risk_premium",
            Self::Unspecified => "unspecified",
        }
    }
}

/// Broad strategy family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Momentum,
    MeanReversion,
    Carry,
    Directional,
    Volatility,
    MultiStrategy,
    Unspecified,
}

impl Archetype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Momentum => "momentum",
            Self::MeanReversion => "mean_reversion",
            Self::Carry => "carry",
            Self::Directional => "directional",
            Self::Volatility => "volatility",
            Self::MultiStrategy => "multi_strategy",
            Self::Unspecified => "unspecified",
        }
    }
}

/// Declared sizing posture. Several concentration rules key off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConcentrationIntent {
    Diversified,
    HighConviction,
    CoreSatellite,
    Barbell,
    SectorFocus,
}

impl ConcentrationIntent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Diversified => "diversified",
            Self::HighConviction => "high_conviction",
            Self::CoreSatellite => "core_satellite",
            Self::Barbell => "barbell",
            Self::SectorFocus => "sector_focus",
        }
    }
}

/// A single deployable allocation strategy.
///
/// Immutable after validation; downstream stages receive read-only views.
/// Weights use a `BTreeMap` so serialized checkpoints are byte-stable across
/// runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Strategy {
    /// Display name, non-empty, at most 200 chars.
    pub name: String,
    /// Held tickers in declaration order, 1-50 entries, no duplicates.
    pub assets: Vec<String>,
    /// Ticker -> target weight. Sums to 1 within tolerance.
    pub weights: BTreeMap<String, f64>,
    pub rebalance_frequency: RebalanceFrequency,
    /// Conditional / filter / weighting allocation tree. Absent means a
    /// static allocation of `weights`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic_tree: Option<LogicTree>,
    /// Narrative edge statement: mechanism, persistence, failure modes.
    pub thesis_document: String,
    /// Why the rebalance cadence matches the edge timescale.
    pub rebalancing_rationale: String,
    pub edge_type: EdgeType,
    pub archetype: Archetype,
    pub concentration_intent: ConcentrationIntent,
}

impl Strategy {
    /// Sum of declared weights.
    pub fn weight_sum(&self) -> f64 {
        self.weights.values().sum()
    }

    /// Herfindahl index of the weight vector; higher means more concentrated.
    pub fn herfindahl(&self) -> f64 {
        self.weights.values().map(|w| w * w).sum()
    }

    /// Tickers referenced anywhere in the logic tree (branch assets and
    /// condition operands), excluding the top-level `assets` list.
    pub fn tree_assets(&self) -> BTreeSet<String> {
        self.logic_tree
            .as_ref()
            .map(|tree| tree.referenced_assets())
            .unwrap_or_default()
    }

    /// All condition strings in declaration order, outermost first.
    pub fn conditions(&self) -> Vec<&str> {
        self.logic_tree
            .as_ref()
            .map(|tree| tree.conditions())
            .unwrap_or_default()
    }

    /// Whether the strategy is a plain static allocation.
    pub fn is_static(&self) -> bool {
        self.logic_tree.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_strategy(weights: &[(&str, f64)]) -> Strategy {
        Strategy {
            name: "test".to_string(),
            assets: weights.iter().map(|(t, _)| t.to_string()).collect(),
            weights: weights
                .iter()
                .map(|(t, w)| (t.to_string(), *w))
                .collect(),
            rebalance_frequency: RebalanceFrequency::Monthly,
            logic_tree: None,
            thesis_document: String::new(),
            rebalancing_rationale: String::new(),
            edge_type: EdgeType::Structural,
            archetype: Archetype::Carry,
            concentration_intent: ConcentrationIntent::Diversified,
        }
    }

    #[test]
    fn herfindahl_orders_by_concentration() {
        let spread = static_strategy(&[("SPY", 0.5), ("AGG", 0.5)]);
        let tilted = static_strategy(&[("SPY", 0.9), ("AGG", 0.1)]);
        assert!(tilted.herfindahl() > spread.herfindahl());
    }

    #[test]
    fn enum_wire_names_are_snake_case() {
        let json = serde_json::to_value(EdgeType::RiskPremium).unwrap();
        assert_eq!(json, serde_json::json!("risk_premium"));
        let json = serde_json::to_value(ConcentrationIntent::HighConviction).unwrap();
        assert_eq!(json, serde_json::json!("high_conviction"));
    }

    #[test]
    fn strategy_roundtrips_through_json() {
        let strategy = static_strategy(&[("SPY", 0.6), ("AGG", 0.4)]);
        let json = serde_json::to_string(&strategy).unwrap();
        let back: Strategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, strategy);
        assert!(back.is_static());
    }
}
