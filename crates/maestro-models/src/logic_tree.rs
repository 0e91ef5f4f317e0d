//! Declarative allocation tree: the only shape allowed to influence deployment.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ranking key for filter leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortBy {
    CumulativeReturn,
    StandardDeviationReturn,
    StandardDeviationPrice,
    Rsi,
    CumulativeReturnPrice,
}

impl SortBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CumulativeReturn => "cumulative_return",
            Self::StandardDeviationReturn => "standard_deviation_return",
            Self::StandardDeviationPrice => "standard_deviation_price",
            Self::Rsi => "rsi",
            Self::CumulativeReturnPrice => "cumulative_return_price",
        }
    }
}

/// Which end of the ranking a filter keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SelectSide {
    Top,
    Bottom,
}

impl SelectSide {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

/// Rank-then-select specification. Selected assets are implicitly
/// equal-weighted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilterSpec {
    pub sort_by: SortBy,
    pub window_days: u32,
    pub select: SelectSide,
    pub n: usize,
}

/// Dynamic weighting method for weighting leaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WeightingMethod {
    InverseVol,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct WeightingSpec {
    pub method: WeightingMethod,
    pub window_days: u32,
}

/// Allocation tree: three leaf kinds plus one branch kind.
///
/// Serialized untagged; each variant is identified by its distinguishing
/// key (`condition`, `filter`, `weighting`, or bare `assets` + `weights`).
/// A filter leaf may appear at the root; a weighting leaf may not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum LogicTree {
    /// Scalar comparison gate with two child trees.
    Conditional {
        condition: String,
        if_true: Box<LogicTree>,
        if_false: Box<LogicTree>,
    },
    /// Rank the given assets and hold the selected slice equal-weighted.
    Filter {
        filter: FilterSpec,
        assets: Vec<String>,
    },
    /// Hold the given assets under a dynamic weighting scheme.
    Weighting {
        weighting: WeightingSpec,
        assets: Vec<String>,
    },
    /// Fixed allocation.
    Static {
        assets: Vec<String>,
        weights: BTreeMap<String, f64>,
    },
}

impl LogicTree {
    /// Every ticker named anywhere in the tree: leaf asset lists plus
    /// condition operand tickers.
    pub fn referenced_assets(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_assets(&mut out);
        out
    }

    fn collect_assets(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Conditional {
                if_true, if_false, ..
            } => {
                if_true.collect_assets(out);
                if_false.collect_assets(out);
            }
            Self::Filter { assets, .. } | Self::Weighting { assets, .. } => {
                out.extend(assets.iter().cloned());
            }
            Self::Static { assets, .. } => out.extend(assets.iter().cloned()),
        }
    }

    /// All condition strings, outermost first.
    pub fn conditions(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Self::Conditional {
            condition,
            if_true,
            if_false,
        } = self
        {
            out.push(condition.as_str());
            if_true.collect_conditions(out);
            if_false.collect_conditions(out);
        }
    }

    /// Depth-first visit of every node.
    pub fn visit<'a>(&'a self, f: &mut impl FnMut(&'a LogicTree)) {
        f(self);
        if let Self::Conditional {
            if_true, if_false, ..
        } = self
        {
            if_true.visit(f);
            if_false.visit(f);
        }
    }

    pub fn is_conditional(&self) -> bool {
        matches!(self, Self::Conditional { .. })
    }

    pub fn is_weighting(&self) -> bool {
        matches!(self, Self::Weighting { .. })
    }
}
