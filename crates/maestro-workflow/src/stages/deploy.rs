//! Deploy stage: confirmation gate, blocking audit, translation, save.

use std::collections::BTreeSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use maestro_ai::{HistoryLimit, ToolInvocation, ToolReply};
use maestro_models::{Charter, ContextPack, LogicTree, Strategy};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::config::WorkflowConfig;
use crate::error::{Result, WorkflowError};
use crate::prompts::{self, DEPLOY_CONFIRM_SYSTEM, DEPLOY_CONFIRM_USER};
use crate::translate;
use crate::validate::ParsedCondition;

use super::StageRunner;

const SAVE_MAX_ATTEMPTS: u32 = 3;
const SAVE_BACKOFF_BASE_MS: u64 = 500;

/// Result of the deploy stage. All-`None` means a clean abort: the
/// checkpoint stays where it was and nothing reached the platform.
#[derive(Debug, Clone, Default)]
pub struct DeployOutcome {
    pub symphony_id: Option<String>,
    pub deployed_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

impl DeployOutcome {
    fn aborted() -> Self {
        Self::default()
    }

    pub fn is_deployed(&self) -> bool {
        self.symphony_id.is_some()
    }
}

/// Final human-shaped gate before anything irreversible.
#[derive(Debug, Deserialize, JsonSchema)]
struct DeployDecision {
    ready: bool,
    symphony_name: String,
    symphony_description: String,
    rationale: String,
}

impl StageRunner {
    /// Deploy the winner. Any step may abort cleanly by returning the empty
    /// outcome; only transport-level save failures surface as errors.
    pub async fn deploy(
        &self,
        winner: &Strategy,
        charter: &Charter,
        _ctx: &ContextPack,
    ) -> Result<DeployOutcome> {
        // 1. Confirmation call: the agent may refuse.
        let user_prompt = prompts::render(
            DEPLOY_CONFIRM_USER,
            &[
                ("winner_json", &serde_json::to_string_pretty(winner)?),
                ("charter_json", &serde_json::to_string_pretty(charter)?),
            ],
        );
        let decision: DeployDecision = self
            .run(self.call(DEPLOY_CONFIRM_SYSTEM, user_prompt, HistoryLimit::Medium))
            .await?;

        if !decision.ready {
            tracing::info!(
                rationale = %decision.rationale,
                "Deployment refused by confirmation agent"
            );
            return Ok(DeployOutcome::aborted());
        }

        // 2. Blocking audit: stricter superset of the validator's condition
        // checks. Failure aborts cleanly and preserves the checkpoint.
        if let Err(findings) = deployment_audit(winner, self.config()) {
            for finding in &findings {
                tracing::warn!(finding = %finding, "Deployment audit failure");
            }
            return Ok(DeployOutcome::aborted());
        }

        // 3. Deterministic translation; no LLM involvement.
        let tree = allocation_tree(winner);
        let root = translate::translate(&tree)
            .map_err(|e| WorkflowError::Translate(e.to_string()))?;
        let hashtag = format!(
            "mstr-{}",
            uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
        );
        let payload = translate::build_payload(
            root,
            &decision.symphony_name,
            &decision.symphony_description,
            &self.config().symphony_color,
            &hashtag,
            &self.config().asset_class,
        );

        // 4. Save under bounded retries; only transient errors retry.
        let response = self.save_with_retries(payload).await?;

        // 5. Extract the id and stamp the deployment time.
        let symphony_id = response
            .get("symphony_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| {
                WorkflowError::DeploymentAudit(
                    "platform response missing symphony_id".to_string(),
                )
            })?;

        tracing::info!(symphony_id = %symphony_id, name = %decision.symphony_name, "Deployed");
        Ok(DeployOutcome {
            symphony_id: Some(symphony_id),
            deployed_at: Some(Utc::now()),
            summary: Some(decision.symphony_description),
        })
    }

    async fn save_with_retries(&self, payload: Value) -> Result<Value> {
        let invocation = ToolInvocation::new("deploy-save", "symphony_save", payload);
        let mut last_error = None;

        for attempt in 1..=SAVE_MAX_ATTEMPTS {
            match self.deploy_tools().dispatch(&invocation).await {
                Ok(ToolReply::Data(body)) => return Ok(body),
                Ok(ToolReply::Refusal(reason)) => {
                    return Err(WorkflowError::DeploymentAudit(format!(
                        "symphony_save rejected the payload: {reason}"
                    )));
                }
                Err(error) => {
                    if !error.is_retryable() || attempt == SAVE_MAX_ATTEMPTS {
                        return Err(error.into());
                    }
                    let delay = error.retry_after().map(Duration::from_secs).unwrap_or(
                        Duration::from_millis(SAVE_BACKOFF_BASE_MS * 2u64.pow(attempt - 1)),
                    );
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Retrying symphony_save"
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(error);
                }
            }
        }

        Err(last_error
            .map(Into::into)
            .unwrap_or_else(|| {
                WorkflowError::DeploymentAudit("symphony_save failed after retries".to_string())
            }))
    }
}

/// The tree that actually deploys: the logic tree, or the top-level weights
/// as a static allocation.
fn allocation_tree(strategy: &Strategy) -> LogicTree {
    strategy.logic_tree.clone().unwrap_or_else(|| LogicTree::Static {
        assets: strategy.assets.clone(),
        weights: strategy.weights.clone(),
    })
}

const BRANCH_WEIGHT_EPS: f64 = 0.01;

/// Blocking pre-translation audit.
///
/// Strict superset of the validator's condition grammar checks: conditions
/// must parse (which excludes boolean connectives and non-ticker operands),
/// every branch ticker must be on the deployable universe when one is
/// configured, and every static branch must sum to 1.0.
pub fn deployment_audit(strategy: &Strategy, config: &WorkflowConfig) -> std::result::Result<(), Vec<String>> {
    let mut findings = Vec::new();
    let tree = allocation_tree(strategy);

    tree.visit(&mut |node| match node {
        LogicTree::Conditional { condition, .. } => {
            if let Err(error) = ParsedCondition::parse(condition) {
                findings.push(format!("condition `{condition}`: {error}"));
            }
        }
        LogicTree::Static { assets, weights } => {
            let sum: f64 = weights.values().sum();
            if (sum - 1.0).abs() > BRANCH_WEIGHT_EPS {
                findings.push(format!(
                    "branch weights for [{}] sum to {sum:.4}, expected 1.0",
                    assets.join(", ")
                ));
            }
        }
        LogicTree::Filter { filter, assets } => {
            if filter.n == 0 || filter.n > assets.len() {
                findings.push(format!(
                    "filter select-n {} outside [1, {}]",
                    filter.n,
                    assets.len()
                ));
            }
        }
        LogicTree::Weighting { .. } => {}
    });

    if let Some(universe) = &config.deployable_universe {
        check_universe(&tree, universe, &mut findings);
    }

    if findings.is_empty() {
        Ok(())
    } else {
        Err(findings)
    }
}

fn check_universe(tree: &LogicTree, universe: &BTreeSet<String>, findings: &mut Vec<String>) {
    for ticker in tree.referenced_assets() {
        if !universe.contains(&ticker) {
            findings.push(format!("`{ticker}` is not on the deployable universe"));
        }
    }
    for condition in tree.conditions() {
        if let Ok(parsed) = ParsedCondition::parse(condition) {
            for ticker in parsed.tickers() {
                if !universe.contains(ticker) {
                    findings.push(format!(
                        "condition ticker `{ticker}` is not on the deployable universe"
                    ));
                }
            }
        }
    }
}
