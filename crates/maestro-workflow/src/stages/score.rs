//! Score stage: per-candidate scorecards in parallel, no tools.

use futures::future::try_join_all;
use maestro_ai::HistoryLimit;
use maestro_models::{ContextPack, EdgeScorecard, Strategy, WorkflowStage};

use crate::error::{Result, WorkflowError};
use crate::prompts::{self, SCORE_SYSTEM, SCORE_USER};

use super::StageRunner;

/// Narrative floor for the evaluation document.
const MIN_EVALUATION_CHARS: usize = 500;

impl StageRunner {
    /// Score every candidate concurrently; results come back in candidate
    /// order. A failed scoring call fails the stage (the checkpoint stays at
    /// CANDIDATES and resume re-runs scoring), and `try_join_all` cancels the
    /// sibling calls in flight.
    pub async fn score_all(
        &self,
        candidates: &[Strategy],
        ctx: &ContextPack,
    ) -> Result<Vec<EdgeScorecard>> {
        let ctx_json = ctx.to_prompt_json();
        try_join_all(
            candidates
                .iter()
                .enumerate()
                .map(|(index, candidate)| self.score_one(index, candidate, &ctx_json)),
        )
        .await
    }

    async fn score_one(
        &self,
        index: usize,
        candidate: &Strategy,
        ctx_json: &str,
    ) -> Result<EdgeScorecard> {
        let user_prompt = prompts::render(
            SCORE_USER,
            &[
                ("context_pack", ctx_json),
                ("candidate_json", &serde_json::to_string_pretty(candidate)?),
            ],
        );

        // No tools and a short window: scoring is a pure read of the
        // candidate plus the pack.
        let mut scorecard: EdgeScorecard = self
            .run(self.call(SCORE_SYSTEM, user_prompt.clone(), HistoryLimit::Short))
            .await?;

        if !scorecard.in_bounds() {
            tracing::warn!(index, "Scorecard out of bounds, re-asking once");
            scorecard = self
                .run(self.call(
                    SCORE_SYSTEM,
                    format!(
                        "{user_prompt}\n\nYour previous scorecard had dimensions outside 1-5. \
Score again with every dimension an integer from 1 to 5."
                    ),
                    HistoryLimit::Short,
                ))
                .await?;
            if !scorecard.in_bounds() {
                return Err(WorkflowError::stage(
                    WorkflowStage::Scoring,
                    format!("candidate {index} scorecard out of bounds after retry"),
                ));
            }
        }

        if scorecard.evaluation_document.chars().count() < MIN_EVALUATION_CHARS {
            tracing::warn!(
                index,
                chars = scorecard.evaluation_document.chars().count(),
                "Evaluation document under {MIN_EVALUATION_CHARS} chars"
            );
        }

        tracing::info!(
            index,
            name = %candidate.name,
            mean = scorecard.mean(),
            passes = scorecard.passes(),
            "Candidate scored"
        );
        Ok(scorecard)
    }
}
