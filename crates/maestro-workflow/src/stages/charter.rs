//! Charter stage: synthesize the five-section document, then run a
//! non-blocking logic audit.

use maestro_ai::HistoryLimit;
use maestro_models::{
    Charter, ContextPack, EdgeScorecard, LogicTree, SelectionReasoning, Strategy,
};

use crate::config::WorkflowConfig;
use crate::error::Result;
use crate::prompts::{self, CHARTER_SYSTEM, CHARTER_USER};
use crate::validate::{Operand, ParsedCondition, ValidatorConfig};

use super::StageRunner;

impl StageRunner {
    /// Write the charter. The entire context pack rides in the prompt so the
    /// pack, not a tool call, is the authoritative macro source; tools stay
    /// available for genuine gaps only.
    pub async fn charter(
        &self,
        winner: &Strategy,
        selection: &SelectionReasoning,
        candidates: &[Strategy],
        scorecards: &[EdgeScorecard],
        ctx: &ContextPack,
    ) -> Result<Charter> {
        let candidates_summary = candidates
            .iter()
            .zip(scorecards.iter())
            .map(|(candidate, card)| {
                format!(
                    "- {} ({} / {}): mean {:.1}",
                    candidate.name,
                    candidate.edge_type.as_str(),
                    candidate.archetype.as_str(),
                    card.mean()
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let user_prompt = prompts::render(
            CHARTER_USER,
            &[
                ("context_pack", &ctx.to_prompt_json()),
                ("winner_json", &serde_json::to_string_pretty(winner)?),
                ("selection_json", &serde_json::to_string_pretty(selection)?),
                ("candidates_summary", &candidates_summary),
            ],
        );

        let call = self.research_call(
            CHARTER_SYSTEM,
            user_prompt.clone(),
            HistoryLimit::Long,
            self.config().stage_compression.charter,
        );
        let mut charter: Charter = self.run(call).await?;

        if !charter.failure_mode_count_in_bounds() {
            tracing::warn!(
                failure_modes = charter.failure_modes.len(),
                "Charter failure modes out of the 3-8 band, re-asking once"
            );
            let retry_call = self.research_call(
                CHARTER_SYSTEM,
                format!(
                    "{user_prompt}\n\nYour previous charter listed {} failure modes; provide \
between 3 and 8.",
                    charter.failure_modes.len()
                ),
                HistoryLimit::Long,
                self.config().stage_compression.charter,
            );
            charter = self.run(retry_call).await?;
        }

        // Audit findings are logged and never mutate the charter or strategy.
        for finding in audit_charter(
            winner,
            &charter,
            ctx,
            self.validator().config(),
            self.config(),
        ) {
            tracing::warn!(finding = %finding, "Charter logic audit");
        }

        Ok(charter)
    }
}

/// Non-blocking post-synthesis audit of the winner's logic against the
/// charter and the regime snapshot. Returns human-readable findings.
pub fn audit_charter(
    winner: &Strategy,
    charter: &Charter,
    ctx: &ContextPack,
    validator_config: &ValidatorConfig,
    config: &WorkflowConfig,
) -> Vec<String> {
    let mut findings = Vec::new();
    let Some(tree) = &winner.logic_tree else {
        return findings;
    };

    let mut condition_tickers: Vec<String> = Vec::new();

    tree.visit(&mut |node| {
        if let LogicTree::Conditional {
            condition,
            if_true,
            if_false,
        } = node
        {
            match ParsedCondition::parse(condition) {
                Ok(parsed) => {
                    condition_tickers
                        .extend(parsed.tickers().iter().map(|t| t.to_string()));

                    audit_branch_population(if_true, "if_true", condition, &mut findings);
                    audit_branch_population(if_false, "if_false", condition, &mut findings);

                    // Defensive plausibility: a vol-proxy `>` gate should
                    // rotate into something defensive.
                    let is_vol_gate = validator_config
                        .vol_proxy_tickers
                        .contains(&parsed.left.ticker)
                        && matches!(
                            parsed.comparator,
                            crate::validate::Comparator::Gt | crate::validate::Comparator::Gte
                        );
                    if is_vol_gate {
                        let defensive = if_true
                            .referenced_assets()
                            .iter()
                            .any(|a| config.defensive_assets.contains(a));
                        if !defensive {
                            findings.push(format!(
                                "volatility-high branch of `{condition}` holds no defensive \
assets"
                            ));
                        }
                    }

                    audit_activation_likelihood(&parsed, condition, ctx, &mut findings);
                }
                Err(error) => findings.push(format!("condition `{condition}`: {error}")),
            }
        }
    });

    if !condition_tickers.is_empty() {
        let mentioned = charter.failure_modes.iter().any(|mode| {
            condition_tickers
                .iter()
                .any(|ticker| mode.contains(ticker.as_str()))
        });
        if !mentioned {
            findings.push(
                "charter failure_modes never mention a branch trigger indicator".to_string(),
            );
        }
    }

    findings
}

fn audit_branch_population(
    branch: &LogicTree,
    label: &str,
    condition: &str,
    findings: &mut Vec<String>,
) {
    if branch.referenced_assets().is_empty() {
        findings.push(format!("{label} branch of `{condition}` holds no assets"));
    }
}

/// Rough activation check: an absolute vol-proxy threshold far above the
/// pack's observed vol level will likely never trigger in the charter window.
fn audit_activation_likelihood(
    parsed: &ParsedCondition,
    condition: &str,
    ctx: &ContextPack,
    findings: &mut Vec<String>,
) {
    let Operand::Number(threshold) = &parsed.right else {
        return;
    };
    let threshold = *threshold;
    if !parsed.is_absolute_price() {
        return;
    }
    let observed = ["vix", "vix_level", "vixy", "vixy_price"]
        .iter()
        .find_map(|key| ctx.macro_indicators.get(key).and_then(|v| v.as_f64()));
    if let Some(level) = observed {
        if threshold > level * 2.0 {
            findings.push(format!(
                "condition `{condition}` threshold {threshold} is more than twice the \
pack's observed level {level}; unlikely to activate this quarter"
            ));
        }
    }
}
