//! Per-call adaptive window trimming.

use crate::llm::Turn;

/// Per-stage rolling window budget, in turns (instructions excluded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryLimit {
    /// 5 turns - scoring-style calls with no tool chatter.
    Short,
    /// 10 turns - selection and confirmation calls.
    Medium,
    /// 20 turns - generation and charter calls with tool traffic.
    Long,
}

impl HistoryLimit {
    pub fn max_turns(&self) -> usize {
        match self {
            Self::Short => 5,
            Self::Medium => 10,
            Self::Long => 20,
        }
    }
}

/// Cut the conversation down to the budget, oldest turns first.
///
/// Instruction turns are pinned. The surviving tail must open with a request
/// turn (providers reject windows that start mid-exchange), so the cut point
/// slides forward to the next request; when none survives, an empty request
/// is planted ahead of the tail.
pub fn trim_window(turns: &[Turn], limit: HistoryLimit) -> Vec<Turn> {
    let budget = limit.max_turns();

    let rolling_len = turns.iter().filter(|t| !t.is_instructions()).count();
    if rolling_len <= budget {
        return turns.to_vec();
    }

    let mut window: Vec<Turn> = turns
        .iter()
        .filter(|t| t.is_instructions())
        .cloned()
        .collect();

    let rolling: Vec<&Turn> = turns.iter().filter(|t| !t.is_instructions()).collect();
    let tail_start = rolling.len() - budget;
    match rolling[tail_start..].iter().position(|t| t.is_request()) {
        Some(offset) => {
            window.extend(rolling[tail_start + offset..].iter().map(|t| (*t).clone()));
        }
        None => {
            window.push(Turn::request(""));
            window.extend(rolling[tail_start..].iter().map(|t| (*t).clone()));
        }
    }
    window
}
