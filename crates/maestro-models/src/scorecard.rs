//! Candidate scoring and selection records.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Five-dimension integer rating of one candidate, each in 1..=5.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EdgeScorecard {
    pub thesis_quality: u8,
    pub edge_economics: u8,
    pub risk_framework: u8,
    pub regime_awareness: u8,
    pub strategic_coherence: u8,
    /// Narrative justification, at least 500 chars.
    pub evaluation_document: String,
}

impl EdgeScorecard {
    pub fn dimensions(&self) -> [u8; 5] {
        [
            self.thesis_quality,
            self.edge_economics,
            self.risk_framework,
            self.regime_awareness,
            self.strategic_coherence,
        ]
    }

    pub fn mean(&self) -> f64 {
        self.dimensions().iter().map(|d| f64::from(*d)).sum::<f64>() / 5.0
    }

    /// Passing threshold: every dimension >= 3 and mean >= 3.0.
    pub fn passes(&self) -> bool {
        self.dimensions().iter().all(|d| *d >= 3) && self.mean() >= 3.0
    }

    /// Whether each dimension sits in the 1..=5 band.
    pub fn in_bounds(&self) -> bool {
        self.dimensions().iter().all(|d| (1..=5).contains(d))
    }
}

/// A candidate passed over during selection, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RejectedAlternative {
    pub candidate_name: String,
    pub reason: String,
}

/// Why one candidate won.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SelectionReasoning {
    /// Index into the surviving candidate list.
    pub winner_index: usize,
    /// Selection confidence in [0, 1].
    pub conviction: f64,
    pub why_selected: String,
    pub tradeoffs_accepted: Vec<String>,
    /// Losers in ranking order, best first.
    pub alternatives_rejected: Vec<RejectedAlternative>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(dims: [u8; 5]) -> EdgeScorecard {
        EdgeScorecard {
            thesis_quality: dims[0],
            edge_economics: dims[1],
            risk_framework: dims[2],
            regime_awareness: dims[3],
            strategic_coherence: dims[4],
            evaluation_document: String::new(),
        }
    }

    #[test]
    fn passes_requires_every_dimension_at_three() {
        assert!(card([3, 3, 3, 3, 3]).passes());
        assert!(card([5, 4, 3, 4, 5]).passes());
        // High mean cannot rescue one weak dimension.
        assert!(!card([5, 5, 5, 5, 2]).passes());
    }

    #[test]
    fn mean_is_arithmetic_over_five_dimensions() {
        assert!((card([1, 2, 3, 4, 5]).mean() - 3.0).abs() < f64::EPSILON);
    }
}
