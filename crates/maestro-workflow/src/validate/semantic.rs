//! Semantic validation: concentration, leverage, coherence and condition
//! rules.

use std::collections::BTreeMap;

use maestro_models::{Archetype, ConcentrationIntent, Strategy};
use once_cell::sync::Lazy;
use regex::Regex;

use super::condition::ParsedCondition;
use super::{ValidationError, ValidationKind, ValidatorConfig};

pub fn check_concentration(
    strategy: &Strategy,
    config: &ValidatorConfig,
    errors: &mut Vec<ValidationError>,
) {
    let intent = strategy.concentration_intent;

    if intent != ConcentrationIntent::HighConviction {
        if strategy.assets.len() < 2 {
            errors.push(ValidationError::error(
                ValidationKind::Concentration,
                "single-asset portfolios require concentration_intent=high_conviction".to_string(),
                "Add at least one more asset or declare high_conviction intent.",
            ));
        }
        for (ticker, weight) in &strategy.weights {
            if *weight > config.max_single_asset_weight {
                errors.push(ValidationError::error(
                    ValidationKind::Concentration,
                    format!(
                        "`{ticker}` at {:.0}% exceeds the {:.0}% single-asset cap for \
{} intent",
                        weight * 100.0,
                        config.max_single_asset_weight * 100.0,
                        intent.as_str()
                    ),
                    "Reduce the position below the cap or declare high_conviction intent.",
                ));
            }
        }
    }

    if intent != ConcentrationIntent::SectorFocus {
        let mut by_sector: BTreeMap<&str, f64> = BTreeMap::new();
        for (ticker, weight) in &strategy.weights {
            if let Some(sector) = config.sector_map.get(ticker) {
                *by_sector.entry(sector.as_str()).or_default() += *weight;
            }
        }
        for (sector, weight) in by_sector {
            if weight > config.max_single_sector_weight {
                errors.push(ValidationError::error(
                    ValidationKind::Concentration,
                    format!(
                        "sector `{sector}` at {:.0}% exceeds the {:.0}% cap for {} intent",
                        weight * 100.0,
                        config.max_single_sector_weight * 100.0,
                        intent.as_str()
                    ),
                    "Spread exposure across sectors or declare sector_focus intent.",
                ));
            }
        }
    }
}

/// Keyword groups a leveraged-product thesis must cover.
const LEVERAGE_TOPICS: [(&str, &[&str]); 3] = [
    ("convexity or decay", &["convexity", "decay"]),
    ("drawdown", &["drawdown"]),
    ("benchmark", &["benchmark"]),
];

pub fn check_leverage_justification(
    strategy: &Strategy,
    config: &ValidatorConfig,
    errors: &mut Vec<ValidationError>,
) {
    let levered: Vec<&String> = strategy
        .assets
        .iter()
        .filter(|t| config.leveraged_tickers.contains(*t))
        .collect();
    if levered.is_empty() {
        return;
    }

    let thesis = strategy.thesis_document.to_lowercase();
    let missing: Vec<&str> = LEVERAGE_TOPICS
        .iter()
        .filter(|(_, words)| !words.iter().any(|w| thesis.contains(w)))
        .map(|(label, _)| *label)
        .collect();

    if !missing.is_empty() {
        errors.push(ValidationError::error(
            ValidationKind::LeverageJustification,
            format!(
                "leveraged/inverse holdings ({}) but thesis does not address: {}",
                levered
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                missing.join(", ")
            ),
            "Extend the thesis to cover volatility decay/convexity, drawdown behavior, \
and the unlevered benchmark comparison.",
        ));
    }
}

static ROTATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\brotat|\bswitch|\bshift").expect("static regex"));

pub fn check_archetype_coherence(strategy: &Strategy, errors: &mut Vec<ValidationError>) {
    let needs_tree = match strategy.archetype {
        Archetype::Volatility => true,
        Archetype::Momentum => {
            ROTATION_RE.is_match(&strategy.thesis_document)
                || ROTATION_RE.is_match(&strategy.rebalancing_rationale)
        }
        _ => false,
    };

    if needs_tree && strategy.is_static() {
        errors.push(ValidationError::error(
            ValidationKind::ArchetypeCoherence,
            format!(
                "archetype `{}` claims conditional behavior but logic_tree is empty",
                strategy.archetype.as_str()
            ),
            "Add a logic tree implementing the claimed rotation/volatility response, \
or reclassify the archetype.",
        ));
    }
}

pub fn check_conditions(
    strategy: &Strategy,
    config: &ValidatorConfig,
    errors: &mut Vec<ValidationError>,
) {
    let conditions = strategy.conditions();
    if conditions.is_empty() {
        return;
    }

    let mut vol_condition_count = 0usize;

    for condition in &conditions {
        let parsed = match ParsedCondition::parse(condition) {
            Ok(parsed) => parsed,
            Err(error) => {
                errors.push(ValidationError::error(
                    ValidationKind::ConditionSyntax,
                    format!("condition `{condition}`: {error}"),
                    "Rewrite as a single scalar comparison: TICKER_metric <op> number \
or TICKER_metric <op> TICKER_metric. No AND/OR/NOT.",
                ));
                continue;
            }
        };

        if parsed.is_absolute_price()
            && !config.absolute_price_proxies.contains(&parsed.left.ticker)
        {
            errors.push(ValidationError::error(
                ValidationKind::AbsoluteThreshold,
                format!(
                    "absolute price threshold on `{}` is not approved; only {:?} may be \
compared to price levels",
                    parsed.left.ticker, config.absolute_price_proxies
                ),
                "Use a relative comparison (price vs moving average, or a cross-asset \
ratio) for this ticker.",
            ));
        }

        for ticker in parsed.tickers() {
            if !strategy.assets.iter().any(|a| a == ticker)
                && !config.signal_only_tickers.contains(ticker)
            {
                errors.push(ValidationError::error(
                    ValidationKind::TreeAssets,
                    format!(
                        "condition ticker `{ticker}` is neither held nor on the signal-only \
allow-list"
                    ),
                    "Gate on a held asset or an approved signal-only proxy.",
                ));
            }
        }

        if parsed
            .tickers()
            .iter()
            .any(|t| config.vol_proxy_tickers.contains(*t))
        {
            vol_condition_count += 1;
        }
    }

    if vol_condition_count > 0 && !mentions_vol_regime(strategy, config) {
        errors.push(ValidationError::error(
            ValidationKind::VolProxyThesis,
            format!(
                "logic tree gates on a volatility proxy (count={vol_condition_count}) but \
neither thesis_document nor rebalancing_rationale discusses a volatility regime"
            ),
            "Explain the volatility-regime trigger in the thesis or rationale \
(e.g. what a VIXY spike signals and why the defensive branch responds to it).",
        ));
    }
}

fn mentions_vol_regime(strategy: &Strategy, config: &ValidatorConfig) -> bool {
    let haystack = format!(
        "{} {}",
        strategy.thesis_document, strategy.rebalancing_rationale
    );
    config.vol_keywords.iter().any(|keyword| {
        Regex::new(&format!(r"(?i)\b{}\b", regex::escape(keyword)))
            .map(|re| re.is_match(&haystack))
            .unwrap_or(false)
    })
}

static THESIS_CLAIM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?:above|below|over|under|exceeds?|crosses?|greater than|less than|>=|<=|>|<)\s*\$?(\d+(?:\.\d+)?)\s*(%)?",
    )
    .expect("static regex")
});

/// Numeric claims in the thesis must line up with some tree threshold.
///
/// Only applies when a logic tree exists; static strategies have nothing to
/// cohere against and their numbers are narrative.
pub fn check_thesis_thresholds(
    strategy: &Strategy,
    config: &ValidatorConfig,
    errors: &mut Vec<ValidationError>,
) {
    let tree_thresholds: Vec<f64> = strategy
        .conditions()
        .iter()
        .filter_map(|c| ParsedCondition::parse(c).ok())
        .filter_map(|p| p.threshold())
        .collect();
    if tree_thresholds.is_empty() {
        return;
    }

    for caps in THESIS_CLAIM_RE.captures_iter(&strategy.thesis_document) {
        let Ok(value) = caps[1].parse::<f64>() else {
            continue;
        };
        let is_percent = caps.get(2).is_some();

        let matched = tree_thresholds.iter().any(|threshold| {
            relatively_close(value, *threshold, config.threshold_tolerance)
                || (is_percent
                    && relatively_close(value / 100.0, *threshold, config.threshold_tolerance))
        });

        if !matched {
            let rendered = &caps[0];
            errors.push(ValidationError::error(
                ValidationKind::ThesisLogicMismatch,
                format!(
                    "thesis claims `{}` but no logic-tree condition uses a threshold within \
{:.0}% of {value}",
                    rendered.trim(),
                    config.threshold_tolerance * 100.0
                ),
                "Align the thesis number with the actual trigger threshold, or adjust the \
condition to match the claimed level.",
            ));
        }
    }
}

fn relatively_close(value: f64, threshold: f64, tolerance: f64) -> bool {
    if threshold == 0.0 {
        return value.abs() <= tolerance;
    }
    ((value - threshold) / threshold).abs() <= tolerance
}

const ROUND_WEIGHT_STEP: f64 = 0.05;
const ROUND_WEIGHT_EPS: f64 = 1e-9;

/// All-round-number weights without a rationale reference smells like a
/// default allocation rather than a derived one.
pub fn check_round_weights(strategy: &Strategy, errors: &mut Vec<ValidationError>) {
    if strategy.weights.len() < 2 {
        return;
    }
    let all_round = strategy.weights.values().all(|w| {
        let steps = w / ROUND_WEIGHT_STEP;
        (steps - steps.round()).abs() < ROUND_WEIGHT_EPS
    });
    if !all_round {
        return;
    }

    let rationale = strategy.rebalancing_rationale.to_lowercase();
    let referenced = rationale.contains("equal weight")
        || rationale.contains("equal-weight")
        || strategy.weights.values().any(|w| {
            let pct = (w * 100.0).round() as i64;
            rationale.contains(&format!("{pct}%")) || rationale.contains(&format!("{w}"))
        });

    if !referenced {
        errors.push(ValidationError::warning(
            ValidationKind::RoundWeights,
            "all weights are round multiples of 0.05 and the rationale never references them"
                .to_string(),
            "Explain how the weights were derived, or cite the target percentages in the \
rebalancing rationale.",
        ));
    }
}
