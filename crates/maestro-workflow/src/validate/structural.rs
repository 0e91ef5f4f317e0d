//! Structural validation: field bounds, weight arithmetic, tree shape.

use std::collections::BTreeSet;

use maestro_models::{LogicTree, Strategy};

use super::{ValidationError, ValidationKind, ValidatorConfig};

pub const WEIGHT_SUM_MIN: f64 = 0.99;
pub const WEIGHT_SUM_MAX: f64 = 1.01;

const NAME_MAX: usize = 200;
const ASSETS_MAX: usize = 50;
const THESIS_RANGE: (usize, usize) = (200, 2_000);
const RATIONALE_RANGE: (usize, usize) = (150, 1_000);

pub fn check_field_bounds(strategy: &Strategy, errors: &mut Vec<ValidationError>) {
    if strategy.name.trim().is_empty() || strategy.name.len() > NAME_MAX {
        errors.push(ValidationError::error(
            ValidationKind::FieldBounds,
            format!("name must be non-empty and at most {NAME_MAX} chars"),
            "Provide a concise descriptive strategy name.",
        ));
    }

    if strategy.assets.is_empty() || strategy.assets.len() > ASSETS_MAX {
        errors.push(ValidationError::error(
            ValidationKind::FieldBounds,
            format!(
                "assets must contain 1-{ASSETS_MAX} tickers, got {}",
                strategy.assets.len()
            ),
            "List between 1 and 50 tickers.",
        ));
    }

    let mut seen = BTreeSet::new();
    for ticker in &strategy.assets {
        if !seen.insert(ticker) {
            errors.push(ValidationError::error(
                ValidationKind::FieldBounds,
                format!("duplicate asset `{ticker}`"),
                "Each ticker may appear only once in assets.",
            ));
        }
    }

    check_narrative_length(
        "thesis_document",
        &strategy.thesis_document,
        THESIS_RANGE,
        errors,
    );
    check_narrative_length(
        "rebalancing_rationale",
        &strategy.rebalancing_rationale,
        RATIONALE_RANGE,
        errors,
    );
}

fn check_narrative_length(
    field: &str,
    text: &str,
    (min, max): (usize, usize),
    errors: &mut Vec<ValidationError>,
) {
    let len = text.chars().count();
    if len == 0 || (min..=max).contains(&len) {
        return;
    }
    errors.push(ValidationError::error(
        ValidationKind::FieldBounds,
        format!("{field} must be {min}-{max} chars when present, got {len}"),
        format!("Rewrite {field} to fit the {min}-{max} character band without losing substance."),
    ));
}

pub fn check_weights(strategy: &Strategy, errors: &mut Vec<ValidationError>) {
    let sum = strategy.weight_sum();
    if !(WEIGHT_SUM_MIN..=WEIGHT_SUM_MAX).contains(&sum) {
        errors.push(ValidationError::error(
            ValidationKind::WeightSum,
            format!("weights sum to {sum:.4}, expected [{WEIGHT_SUM_MIN}, {WEIGHT_SUM_MAX}]"),
            "Scale the weights so they sum to 1.0.",
        ));
    }

    for (ticker, weight) in &strategy.weights {
        if *weight < 0.0 {
            errors.push(ValidationError::error(
                ValidationKind::WeightSum,
                format!("negative weight {weight} for `{ticker}`"),
                "Weights must be non-negative; express short views via inverse products.",
            ));
        }
    }

    let tree_assets = strategy.tree_assets();
    for ticker in strategy.weights.keys() {
        if !strategy.assets.contains(ticker) && !tree_assets.contains(ticker) {
            errors.push(ValidationError::error(
                ValidationKind::WeightKeys,
                format!("weight key `{ticker}` is not in assets or the logic tree"),
                "Every weighted ticker must appear in assets or a logic-tree branch.",
            ));
        }
    }
}

pub fn check_tree(
    strategy: &Strategy,
    config: &ValidatorConfig,
    errors: &mut Vec<ValidationError>,
) {
    let Some(tree) = &strategy.logic_tree else {
        return;
    };

    if tree.is_weighting() {
        errors.push(ValidationError::error(
            ValidationKind::TreeShape,
            "weighting leaf is not permitted at the tree root".to_string(),
            "Wrap the weighting leaf in a conditional branch or use a static root.",
        ));
    }

    check_node(tree, errors);
    check_tree_assets(strategy, tree, config, errors);
}

fn check_node(tree: &LogicTree, errors: &mut Vec<ValidationError>) {
    match tree {
        LogicTree::Conditional {
            if_true, if_false, ..
        } => {
            check_node(if_true, errors);
            check_node(if_false, errors);
        }
        LogicTree::Filter { filter, assets } => {
            if assets.is_empty() {
                errors.push(ValidationError::fatal(
                    ValidationKind::MalformedTree,
                    "filter leaf has no assets".to_string(),
                    "Filter leaves need at least one asset to rank.",
                ));
                return;
            }
            if filter.n == 0 || filter.n > assets.len() {
                errors.push(ValidationError::error(
                    ValidationKind::TreeShape,
                    format!(
                        "filter selects {} of {} assets; n must be in [1, {}]",
                        filter.n,
                        assets.len(),
                        assets.len()
                    ),
                    "Pick n between 1 and the number of filtered assets.",
                ));
            }
            if filter.window_days == 0 {
                errors.push(ValidationError::error(
                    ValidationKind::TreeShape,
                    "filter window_days must be positive".to_string(),
                    "Use a positive lookback window, e.g. 30.",
                ));
            }
        }
        LogicTree::Weighting { weighting, assets } => {
            if assets.is_empty() {
                errors.push(ValidationError::fatal(
                    ValidationKind::MalformedTree,
                    "weighting leaf has no assets".to_string(),
                    "Weighting leaves need at least one asset.",
                ));
            }
            if weighting.window_days == 0 {
                errors.push(ValidationError::error(
                    ValidationKind::TreeShape,
                    "weighting window_days must be positive".to_string(),
                    "Use a positive lookback window, e.g. 21.",
                ));
            }
        }
        LogicTree::Static { assets, weights } => {
            if assets.is_empty() {
                errors.push(ValidationError::fatal(
                    ValidationKind::MalformedTree,
                    "static leaf has no assets".to_string(),
                    "Static leaves need at least one asset.",
                ));
                return;
            }
            let sum: f64 = weights.values().sum();
            if !(WEIGHT_SUM_MIN..=WEIGHT_SUM_MAX).contains(&sum) {
                errors.push(ValidationError::error(
                    ValidationKind::TreeShape,
                    format!("static leaf weights sum to {sum:.4}, expected ~1.0"),
                    "Scale each branch's weights so they sum to 1.0.",
                ));
            }
            for ticker in weights.keys() {
                if !assets.contains(ticker) {
                    errors.push(ValidationError::error(
                        ValidationKind::TreeShape,
                        format!("static leaf weight key `{ticker}` missing from its assets"),
                        "Leaf weights may only reference the leaf's own assets.",
                    ));
                }
            }
        }
    }
}

fn check_tree_assets(
    strategy: &Strategy,
    tree: &LogicTree,
    config: &ValidatorConfig,
    errors: &mut Vec<ValidationError>,
) {
    let held: BTreeSet<&str> = strategy.assets.iter().map(String::as_str).collect();
    for ticker in tree.referenced_assets() {
        if !held.contains(ticker.as_str()) && !config.signal_only_tickers.contains(&ticker) {
            errors.push(ValidationError::error(
                ValidationKind::TreeAssets,
                format!("logic tree references `{ticker}` which is not in assets"),
                format!(
                    "Add `{ticker}` to assets, or restrict branches to held tickers \
(signal-only tickers are allowed in conditions only)."
                ),
            ));
        }
    }
}
