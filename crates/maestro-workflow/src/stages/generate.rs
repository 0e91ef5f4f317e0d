//! Generate stage: five persona candidates in parallel, each validated with
//! a targeted fix-retry protocol.

use std::collections::BTreeSet;

use maestro_ai::HistoryLimit;
use maestro_models::{ContextPack, Strategy, WorkflowStage};

use crate::error::{Result, WorkflowError};
use crate::prompts::{self, FIX_RETRY, GENERATE_RECIPE, GENERATE_SYSTEM, PERSONAS};
use crate::validate::{ValidationError, ValidationKind, all_retryable, blocking_errors};

use super::StageRunner;

pub const CANDIDATE_COUNT: usize = PERSONAS.len();

/// A candidate gets the initial call plus at most this many fix-retries.
const MAX_FIX_RETRIES: usize = 2;

const MIN_DISTINCT_EDGE_TYPES: usize = 3;
const MIN_DISTINCT_ARCHETYPES: usize = 3;

impl StageRunner {
    /// Produce the candidate set. Personas run concurrently; results are
    /// collected in persona order. A persona whose candidate cannot be
    /// repaired is dropped with a warning and the workflow continues.
    pub async fn generate(&self, ctx: &ContextPack) -> Result<Vec<Strategy>> {
        let ctx_json = ctx.to_prompt_json();

        let tasks = PERSONAS
            .iter()
            .enumerate()
            .map(|(index, &(name, persona))| {
                self.generate_one(index, name, persona, ctx, &ctx_json)
            });
        let results = futures::future::join_all(tasks).await;

        let candidates: Vec<Strategy> = results.into_iter().flatten().collect();
        if candidates.is_empty() {
            return Err(WorkflowError::stage(
                WorkflowStage::Candidates,
                "every persona candidate failed validation",
            ));
        }

        check_diversity(&candidates);
        Ok(candidates)
    }

    async fn generate_one(
        &self,
        index: usize,
        persona_name: &str,
        persona: &str,
        ctx: &ContextPack,
        ctx_json: &str,
    ) -> Option<Strategy> {
        let user_prompt = prompts::render(
            GENERATE_RECIPE,
            &[("persona", persona), ("context_pack", ctx_json)],
        );
        let call = self.research_call(
            GENERATE_SYSTEM,
            user_prompt,
            HistoryLimit::Long,
            self.config().stage_compression.generate,
        );

        let mut candidate: Strategy = match self.run(call).await {
            Ok(candidate) => candidate,
            Err(error) => {
                tracing::warn!(persona = persona_name, error = %error, "Persona call failed");
                return None;
            }
        };

        for attempt in 0..=MAX_FIX_RETRIES {
            let errors = self.validator().validate(&candidate, ctx);
            let blocking = blocking_errors(&errors);

            if blocking.is_empty() {
                for warning in errors.iter().filter(|e| !e.is_blocking()) {
                    tracing::warn!(
                        persona = persona_name,
                        kind = ?warning.kind,
                        message = %warning.message,
                        "Candidate accepted with warning"
                    );
                }
                tracing::info!(
                    persona = persona_name,
                    index,
                    name = %candidate.name,
                    attempts = attempt,
                    "Candidate accepted"
                );
                return Some(candidate);
            }

            if !all_retryable(&errors) {
                tracing::warn!(
                    persona = persona_name,
                    errors = blocking.len(),
                    "Candidate has non-retryable errors, dropping"
                );
                return None;
            }

            if attempt == MAX_FIX_RETRIES {
                tracing::warn!(
                    persona = persona_name,
                    errors = blocking.len(),
                    "Fix-retry budget exhausted, dropping candidate"
                );
                return None;
            }

            candidate = match self.fix_retry(&candidate, &errors).await {
                Ok(fixed) => fixed,
                Err(error) => {
                    tracing::warn!(persona = persona_name, error = %error, "Fix-retry call failed");
                    return None;
                }
            };
        }

        None
    }

    /// One targeted repair: the model sees the exact current strategy, the
    /// classified errors with guidance, and an immutability contract derived
    /// from which fields the errors implicate. The contract is enforced, not
    /// just requested: untouched fields are restored from the prior revision.
    async fn fix_retry(
        &self,
        current: &Strategy,
        errors: &[ValidationError],
    ) -> Result<Strategy> {
        let mutable = mutable_fields(errors);
        let immutable: Vec<&str> = ALL_FIELDS
            .iter()
            .copied()
            .filter(|f| !mutable.contains(f))
            .collect();

        let errors_text = errors
            .iter()
            .filter(|e| e.is_blocking())
            .map(|e| format!("- {} (fix: {})", e.message, e.fix_guidance))
            .collect::<Vec<_>>()
            .join("\n");

        let user_prompt = prompts::render(
            FIX_RETRY,
            &[
                ("strategy_json", &serde_json::to_string_pretty(current)?),
                ("errors", &errors_text),
                ("immutable_fields", &immutable.join(", ")),
                (
                    "mutable_fields",
                    &mutable.iter().copied().collect::<Vec<_>>().join(", "),
                ),
            ],
        );

        let call = self.call(GENERATE_SYSTEM, user_prompt, HistoryLimit::Long);
        let fixed: Strategy = self.run(call).await?;
        Ok(enforce_immutable(current, fixed, &mutable))
    }
}

const ALL_FIELDS: [&str; 10] = [
    "name",
    "assets",
    "weights",
    "rebalance_frequency",
    "logic_tree",
    "thesis_document",
    "rebalancing_rationale",
    "edge_type",
    "archetype",
    "concentration_intent",
];

/// Fields each error kind licenses the retry to change. The union over all
/// blocking errors is the mutable set; everything else is restored.
fn mutable_fields(errors: &[ValidationError]) -> BTreeSet<&'static str> {
    let mut fields = BTreeSet::new();
    for error in errors.iter().filter(|e| e.is_blocking()) {
        let implicated: &[&'static str] = match error.kind {
            ValidationKind::FieldBounds => {
                &["name", "assets", "weights", "thesis_document", "rebalancing_rationale"]
            }
            ValidationKind::WeightSum | ValidationKind::WeightKeys => &["weights"],
            ValidationKind::Concentration => &["weights", "assets", "concentration_intent"],
            ValidationKind::RoundWeights => &["weights", "rebalancing_rationale"],
            ValidationKind::MalformedTree
            | ValidationKind::TreeShape
            | ValidationKind::TreeAssets => &["logic_tree", "assets", "weights"],
            ValidationKind::ConditionSyntax | ValidationKind::AbsoluteThreshold => &["logic_tree"],
            ValidationKind::ArchetypeCoherence => &["logic_tree", "archetype"],
            ValidationKind::ThesisLogicMismatch => &["thesis_document", "logic_tree"],
            ValidationKind::LeverageJustification => &["thesis_document"],
            ValidationKind::VolProxyThesis => &["thesis_document", "rebalancing_rationale"],
        };
        fields.extend(implicated);
    }
    fields
}

/// Copy every non-mutable field back from the previous revision.
fn enforce_immutable(
    previous: &Strategy,
    mut fixed: Strategy,
    mutable: &BTreeSet<&'static str>,
) -> Strategy {
    if !mutable.contains("name") {
        fixed.name = previous.name.clone();
    }
    if !mutable.contains("assets") {
        fixed.assets = previous.assets.clone();
    }
    if !mutable.contains("weights") {
        fixed.weights = previous.weights.clone();
    }
    if !mutable.contains("rebalance_frequency") {
        fixed.rebalance_frequency = previous.rebalance_frequency;
    }
    if !mutable.contains("logic_tree") {
        fixed.logic_tree = previous.logic_tree.clone();
    }
    if !mutable.contains("thesis_document") {
        fixed.thesis_document = previous.thesis_document.clone();
    }
    if !mutable.contains("rebalancing_rationale") {
        fixed.rebalancing_rationale = previous.rebalancing_rationale.clone();
    }
    if !mutable.contains("edge_type") {
        fixed.edge_type = previous.edge_type;
    }
    if !mutable.contains("archetype") {
        fixed.archetype = previous.archetype;
    }
    if !mutable.contains("concentration_intent") {
        fixed.concentration_intent = previous.concentration_intent;
    }
    fixed
}

fn check_diversity(candidates: &[Strategy]) {
    let edge_types: BTreeSet<&str> = candidates.iter().map(|c| c.edge_type.as_str()).collect();
    let archetypes: BTreeSet<&str> = candidates.iter().map(|c| c.archetype.as_str()).collect();

    if edge_types.len() < MIN_DISTINCT_EDGE_TYPES || archetypes.len() < MIN_DISTINCT_ARCHETYPES {
        tracing::warn!(
            edge_types = edge_types.len(),
            archetypes = archetypes.len(),
            "Candidate set under-diversified (want >= {MIN_DISTINCT_EDGE_TYPES} edge types \
and >= {MIN_DISTINCT_ARCHETYPES} archetypes)"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;
    use maestro_models::{
        Archetype, ConcentrationIntent, EdgeType, RebalanceFrequency,
    };

    fn strategy(name: &str, thesis: &str) -> Strategy {
        Strategy {
            name: name.to_string(),
            assets: vec!["SPY".to_string(), "AGG".to_string()],
            weights: [("SPY".to_string(), 0.6), ("AGG".to_string(), 0.4)]
                .into_iter()
                .collect(),
            rebalance_frequency: RebalanceFrequency::Monthly,
            logic_tree: None,
            thesis_document: thesis.to_string(),
            rebalancing_rationale: "monthly matches the premium's decay".to_string(),
            edge_type: EdgeType::RiskPremium,
            archetype: Archetype::Carry,
            concentration_intent: ConcentrationIntent::Diversified,
        }
    }

    #[test]
    fn thesis_only_errors_leave_structure_immutable() {
        let errors = vec![ValidationError::error(
            ValidationKind::LeverageJustification,
            "thesis missing decay discussion",
            "discuss decay",
        )];
        let mutable = mutable_fields(&errors);
        assert!(mutable.contains("thesis_document"));
        assert!(!mutable.contains("weights"));
        assert!(!mutable.contains("assets"));

        let previous = strategy("a", "old thesis");
        let mut tampered = strategy("b", "new thesis");
        tampered.weights = [("SPY".to_string(), 0.5), ("AGG".to_string(), 0.5)]
            .into_iter()
            .collect();

        let enforced = enforce_immutable(&previous, tampered, &mutable);
        // Thesis change sticks, everything else reverts.
        assert_eq!(enforced.thesis_document, "new thesis");
        assert_eq!(enforced.name, "a");
        assert_eq!(enforced.weights, previous.weights);
        assert_eq!(enforced.assets, previous.assets);
    }

    #[test]
    fn condition_errors_only_open_the_logic_tree() {
        let errors = vec![ValidationError::error(
            ValidationKind::ConditionSyntax,
            "boolean operators not permitted",
            "single comparison",
        )];
        let mutable = mutable_fields(&errors);
        assert_eq!(
            mutable.into_iter().collect::<Vec<_>>(),
            vec!["logic_tree"]
        );
    }

    #[test]
    fn warnings_do_not_open_any_field() {
        let errors = vec![ValidationError::warning(
            ValidationKind::RoundWeights,
            "round weights",
            "explain",
        )];
        assert!(mutable_fields(&errors).is_empty());
    }
}
