//! Select stage: composite of scorecard means and an LLM multi-factor
//! ranking, with deterministic tie-breaking.

use maestro_ai::HistoryLimit;
use maestro_models::{
    ContextPack, EdgeScorecard, SelectionReasoning, Strategy,
};
use schemars::JsonSchema;
use serde::Deserialize;

use crate::error::{Result, WorkflowError};
use crate::prompts::{self, SELECT_SYSTEM, SELECT_USER};

use super::StageRunner;

/// Scorecard mean below this filters the candidate out before selection.
pub const PASSING_MEAN: f64 = 3.0;

const COMPOSITE_EPS: f64 = 1e-9;

/// The LLM's half of the decision.
#[derive(Debug, Deserialize, JsonSchema)]
struct SelectionBallot {
    /// Per-candidate fitness in [0, 1], in presentation order.
    fitness: Vec<f64>,
    /// Advisory pick; the composite decides.
    winner_index: usize,
    conviction: f64,
    why_selected: String,
    tradeoffs_accepted: Vec<String>,
    alternatives_rejected: Vec<maestro_models::RejectedAlternative>,
}

impl StageRunner {
    /// Choose the winner among candidates whose scorecard mean passes.
    ///
    /// `winner_index` in the returned reasoning indexes the *surviving*
    /// candidate list (below-threshold candidates are filtered first).
    pub async fn select(
        &self,
        candidates: &[Strategy],
        scorecards: &[EdgeScorecard],
        ctx: &ContextPack,
    ) -> Result<(Strategy, SelectionReasoning)> {
        let surviving: Vec<(usize, &Strategy, &EdgeScorecard)> = candidates
            .iter()
            .zip(scorecards.iter())
            .enumerate()
            .filter(|(_, (_, card))| card.mean() >= PASSING_MEAN)
            .map(|(index, (candidate, card))| (index, candidate, card))
            .collect();

        if surviving.is_empty() {
            return Err(WorkflowError::NoPassingCandidate);
        }
        for (index, candidate, card) in candidates
            .iter()
            .zip(scorecards.iter())
            .enumerate()
            .filter(|(_, (_, card))| card.mean() < PASSING_MEAN)
            .map(|(index, (candidate, card))| (index, candidate, card))
        {
            tracing::info!(
                index,
                name = %candidate.name,
                mean = card.mean(),
                "Candidate filtered below passing mean"
            );
        }

        let presentation = surviving
            .iter()
            .enumerate()
            .map(|(i, (_, candidate, card))| {
                serde_json::json!({
                    "index": i,
                    "strategy": candidate,
                    "scorecard": card,
                })
            })
            .collect::<Vec<_>>();

        let user_prompt = prompts::render(
            SELECT_USER,
            &[
                ("context_pack", &ctx.to_prompt_json()),
                (
                    "candidates",
                    &serde_json::to_string_pretty(&presentation)?,
                ),
            ],
        );

        let ballot: SelectionBallot = self
            .run(self.call(SELECT_SYSTEM, user_prompt, HistoryLimit::Medium))
            .await?;

        let winner_local = pick_winner(&surviving, &ballot.fitness);
        if ballot.winner_index != winner_local {
            tracing::info!(
                llm_pick = ballot.winner_index,
                composite_pick = winner_local,
                "Composite overrode the LLM's advisory pick"
            );
        }

        let (persona_index, winner, _) = surviving[winner_local];
        tracing::info!(
            winner = %winner.name,
            persona_index,
            conviction = ballot.conviction,
            "Winner selected"
        );

        let reasoning = SelectionReasoning {
            winner_index: winner_local,
            conviction: ballot.conviction.clamp(0.0, 1.0),
            why_selected: ballot.why_selected,
            tradeoffs_accepted: ballot.tradeoffs_accepted,
            alternatives_rejected: ballot.alternatives_rejected,
        };
        Ok((winner.clone(), reasoning))
    }
}

/// 50/50 composite of normalized scorecard mean and LLM fitness. Ties break
/// on (a) higher risk_framework, (b) lower weight concentration, (c) earlier
/// persona order - the last is implicit in the strict comparison.
fn pick_winner(
    surviving: &[(usize, &Strategy, &EdgeScorecard)],
    fitness: &[f64],
) -> usize {
    let mut best = 0usize;
    for challenger in 1..surviving.len() {
        if beats(surviving, fitness, challenger, best) {
            best = challenger;
        }
    }
    best
}

fn composite(
    surviving: &[(usize, &Strategy, &EdgeScorecard)],
    fitness: &[f64],
    index: usize,
) -> f64 {
    let (_, _, card) = surviving[index];
    let llm = fitness.get(index).copied().unwrap_or(0.5).clamp(0.0, 1.0);
    0.5 * (card.mean() / 5.0) + 0.5 * llm
}

fn beats(
    surviving: &[(usize, &Strategy, &EdgeScorecard)],
    fitness: &[f64],
    challenger: usize,
    incumbent: usize,
) -> bool {
    let diff = composite(surviving, fitness, challenger) - composite(surviving, fitness, incumbent);
    if diff.abs() > COMPOSITE_EPS {
        return diff > 0.0;
    }

    let (_, challenger_strategy, challenger_card) = surviving[challenger];
    let (_, incumbent_strategy, incumbent_card) = surviving[incumbent];

    if challenger_card.risk_framework != incumbent_card.risk_framework {
        return challenger_card.risk_framework > incumbent_card.risk_framework;
    }

    let concentration_diff = challenger_strategy.herfindahl() - incumbent_strategy.herfindahl();
    if concentration_diff.abs() > COMPOSITE_EPS {
        return concentration_diff < 0.0;
    }

    // Equal on every criterion: earlier persona order wins.
    false
}
