//! Pure translation between logic trees and the deployment platform's
//! nested-step JSON.
//!
//! `translate` is deterministic code, not an LLM call; `parse` is its
//! inverse so well-formed trees round-trip byte-for-byte. Unknown metrics or
//! boolean connectives fail synchronously here even though the deployment
//! audit should have caught them first.

use std::collections::BTreeMap;

use maestro_models::{FilterSpec, LogicTree, SelectSide, SortBy, WeightingMethod, WeightingSpec};
use serde_json::{Value, json};
use thiserror::Error;

use crate::validate::{Comparator, ConditionError, Indicator, Metric, Operand, ParsedCondition};

const DEFAULT_EXCHANGE: &str = "ARCX";
const EQUAL_WEIGHT_EPS: f64 = 1e-9;

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error(transparent)]
    Condition(#[from] ConditionError),

    #[error("weight {0} cannot be expressed as a decimal fraction")]
    InvalidWeight(f64),

    #[error("malformed symphony node: {0}")]
    Malformed(String),
}

pub type Result<T> = std::result::Result<T, TranslateError>;

/// Translate a logic tree into the platform's root step node.
///
/// A filter leaf at the root is wrapped in an equal-weight node; every other
/// shape maps directly.
pub fn translate(tree: &LogicTree) -> Result<Value> {
    let mut ids = IdGen::default();
    match tree {
        LogicTree::Filter { .. } => {
            let inner = translate_node(tree, &mut ids)?;
            Ok(json!({
                "id": ids.next(),
                "step": "wt-cash-equal",
                "children": [inner],
            }))
        }
        _ => translate_node(tree, &mut ids),
    }
}

/// Wrap a translated root node into the `symphony_save` payload.
pub fn build_payload(
    mut root: Value,
    name: &str,
    description: &str,
    color: &str,
    hashtag: &str,
    asset_class: &str,
) -> Value {
    if let Some(obj) = root.as_object_mut() {
        obj.insert("name".to_string(), json!(name));
        obj.insert("description".to_string(), json!(description));
    }
    json!({
        "symphony_score": root,
        "color": color,
        "hashtag": hashtag,
        "asset_class": asset_class,
    })
}

#[derive(Default)]
struct IdGen(u32);

impl IdGen {
    fn next(&mut self) -> String {
        self.0 += 1;
        format!("node-{}", self.0)
    }
}

fn translate_node(tree: &LogicTree, ids: &mut IdGen) -> Result<Value> {
    match tree {
        LogicTree::Static { assets, weights } => translate_static(assets, weights, ids),
        LogicTree::Filter { filter, assets } => translate_filter(filter, assets, ids),
        LogicTree::Weighting { weighting, assets } => {
            translate_weighting(weighting, assets, ids)
        }
        LogicTree::Conditional {
            condition,
            if_true,
            if_false,
        } => translate_conditional(condition, if_true, if_false, ids),
    }
}

fn asset_node(ticker: &str, ids: &mut IdGen) -> Value {
    json!({
        "id": ids.next(),
        "step": "asset",
        "ticker": ticker,
        "exchange": DEFAULT_EXCHANGE,
    })
}

fn translate_static(
    assets: &[String],
    weights: &BTreeMap<String, f64>,
    ids: &mut IdGen,
) -> Result<Value> {
    let is_equal = {
        let mut values = assets.iter().map(|a| weights.get(a).copied().unwrap_or(0.0));
        let first = values.next().unwrap_or(0.0);
        values.all(|w| (w - first).abs() < EQUAL_WEIGHT_EPS)
    };

    if is_equal {
        let children: Vec<Value> = assets.iter().map(|a| asset_node(a, ids)).collect();
        return Ok(json!({
            "id": ids.next(),
            "step": "wt-cash-equal",
            "children": children,
        }));
    }

    // Explicit allocations always go out as WeightMap fractions; the
    // platform does not accept an `allocation` field.
    let mut children = Vec::with_capacity(assets.len());
    for ticker in assets {
        let weight = weights.get(ticker).copied().unwrap_or(0.0);
        let (num, den) = weight_fraction(weight)?;
        let mut node = asset_node(ticker, ids);
        node.as_object_mut()
            .expect("asset node is an object")
            .insert("weight".to_string(), json!({"num": num, "den": den}));
        children.push(node);
    }
    Ok(json!({
        "id": ids.next(),
        "step": "wt-cash-specified",
        "children": children,
    }))
}

/// Express a weight as `num/den` with the smallest power-of-ten denominator
/// (0.6 -> 6/10, 0.55 -> 55/100).
fn weight_fraction(weight: f64) -> Result<(u64, u64)> {
    if !(0.0..=1.0).contains(&weight) {
        return Err(TranslateError::InvalidWeight(weight));
    }
    for den in [10u64, 100, 1_000, 10_000] {
        let scaled = weight * den as f64;
        if (scaled - scaled.round()).abs() < 1e-6 {
            return Ok((scaled.round() as u64, den));
        }
    }
    Err(TranslateError::InvalidWeight(weight))
}

fn sort_by_fn(sort_by: SortBy) -> &'static str {
    match sort_by {
        SortBy::CumulativeReturn => "cumulative-return",
        SortBy::StandardDeviationReturn => "standard-deviation-return",
        SortBy::StandardDeviationPrice => "standard-deviation-price",
        SortBy::Rsi => "relative-strength-index",
        SortBy::CumulativeReturnPrice => "cumulative-return-price",
    }
}

fn sort_by_from_fn(code: &str) -> Option<SortBy> {
    match code {
        "cumulative-return" => Some(SortBy::CumulativeReturn),
        "standard-deviation-return" => Some(SortBy::StandardDeviationReturn),
        "standard-deviation-price" => Some(SortBy::StandardDeviationPrice),
        "relative-strength-index" => Some(SortBy::Rsi),
        "cumulative-return-price" => Some(SortBy::CumulativeReturnPrice),
        _ => None,
    }
}

fn translate_filter(filter: &FilterSpec, assets: &[String], ids: &mut IdGen) -> Result<Value> {
    let children: Vec<Value> = assets.iter().map(|a| asset_node(a, ids)).collect();
    // Selected assets are implicitly equal-weighted; no wrapper node.
    Ok(json!({
        "id": ids.next(),
        "step": "filter",
        "sort-by-fn": sort_by_fn(filter.sort_by),
        "sort-by-fn-params": {"window": filter.window_days},
        "select-fn": filter.select.as_str(),
        "select-n": filter.n,
        "children": children,
    }))
}

fn translate_weighting(
    weighting: &WeightingSpec,
    assets: &[String],
    ids: &mut IdGen,
) -> Result<Value> {
    let children: Vec<Value> = assets.iter().map(|a| asset_node(a, ids)).collect();
    match weighting.method {
        WeightingMethod::InverseVol => Ok(json!({
            "id": ids.next(),
            "step": "wt-inverse-vol",
            "window-days": weighting.window_days,
            "children": children,
        })),
    }
}

fn translate_conditional(
    condition: &str,
    if_true: &LogicTree,
    if_false: &LogicTree,
    ids: &mut IdGen,
) -> Result<Value> {
    let parsed = ParsedCondition::parse(condition)?;

    let mut then_child = json!({
        "id": ids.next(),
        "step": "if-child",
        "is-else": false,
        "lhs-fn": parsed.left.metric.symphony_fn(),
        "lhs-val": parsed.left.ticker,
        "comparator": parsed.comparator.symphony_code(),
        "children": [translate_node(if_true, ids)?],
    });
    {
        let obj = then_child.as_object_mut().expect("if-child is an object");
        if let Some(window) = parsed.left.metric.window() {
            obj.insert("lhs-fn-params".to_string(), json!({"window": window}));
        }
        match &parsed.right {
            Operand::Number(n) => {
                obj.insert("rhs-fixed-value".to_string(), json!(true));
                obj.insert("rhs-val".to_string(), json!(n));
            }
            Operand::Indicator(indicator) => {
                obj.insert("rhs-fixed-value".to_string(), json!(false));
                obj.insert("rhs-fn".to_string(), json!(indicator.metric.symphony_fn()));
                obj.insert("rhs-val".to_string(), json!(indicator.ticker));
                if let Some(window) = indicator.metric.window() {
                    obj.insert("rhs-fn-params".to_string(), json!({"window": window}));
                }
            }
        }
    }

    let else_child = json!({
        "id": ids.next(),
        "step": "if-child",
        "is-else": true,
        "children": [translate_node(if_false, ids)?],
    });

    Ok(json!({
        "id": ids.next(),
        "step": "if",
        "children": [then_child, else_child],
    }))
}

/// Parse a symphony step node back into a logic tree. Inverse of
/// [`translate`] on well-formed trees.
pub fn parse(node: &Value) -> Result<LogicTree> {
    let step = node
        .get("step")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslateError::Malformed("node missing `step`".to_string()))?;

    match step {
        "wt-cash-equal" => {
            let children = children_of(node)?;
            // A lone filter child is the filter-at-root wrapping.
            if children.len() == 1 && step_of(&children[0]) == Some("filter") {
                return parse(&children[0]);
            }
            let assets = asset_tickers(&children)?;
            if assets.is_empty() {
                return Err(TranslateError::Malformed(
                    "wt-cash-equal has no children".to_string(),
                ));
            }
            let weight = 1.0 / assets.len() as f64;
            let weights = assets.iter().map(|a| (a.clone(), weight)).collect();
            Ok(LogicTree::Static { assets, weights })
        }
        "wt-cash-specified" => {
            let children = children_of(node)?;
            let mut assets = Vec::new();
            let mut weights = BTreeMap::new();
            for child in &children {
                let ticker = ticker_of(child)?;
                let weight = child
                    .get("weight")
                    .and_then(|w| {
                        let num = w.get("num")?.as_f64()?;
                        let den = w.get("den")?.as_f64()?;
                        (den != 0.0).then_some(num / den)
                    })
                    .ok_or_else(|| {
                        TranslateError::Malformed(format!(
                            "asset `{ticker}` in wt-cash-specified lacks a weight map"
                        ))
                    })?;
                assets.push(ticker.clone());
                weights.insert(ticker, weight);
            }
            Ok(LogicTree::Static { assets, weights })
        }
        "wt-inverse-vol" => {
            let children = children_of(node)?;
            let window_days = node
                .get("window-days")
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    TranslateError::Malformed("wt-inverse-vol missing window-days".to_string())
                })? as u32;
            Ok(LogicTree::Weighting {
                weighting: WeightingSpec {
                    method: WeightingMethod::InverseVol,
                    window_days,
                },
                assets: asset_tickers(&children)?,
            })
        }
        "filter" => {
            let children = children_of(node)?;
            let sort_by = node
                .get("sort-by-fn")
                .and_then(Value::as_str)
                .and_then(sort_by_from_fn)
                .ok_or_else(|| {
                    TranslateError::Malformed("filter has unknown sort-by-fn".to_string())
                })?;
            let window_days = node
                .get("sort-by-fn-params")
                .and_then(|p| p.get("window"))
                .and_then(Value::as_u64)
                .ok_or_else(|| {
                    TranslateError::Malformed("filter missing sort window".to_string())
                })? as u32;
            let select = match node.get("select-fn").and_then(Value::as_str) {
                Some("top") => SelectSide::Top,
                Some("bottom") => SelectSide::Bottom,
                other => {
                    return Err(TranslateError::Malformed(format!(
                        "filter has invalid select-fn {other:?}"
                    )));
                }
            };
            let n = node
                .get("select-n")
                .and_then(Value::as_u64)
                .ok_or_else(|| TranslateError::Malformed("filter missing select-n".to_string()))?
                as usize;
            Ok(LogicTree::Filter {
                filter: FilterSpec {
                    sort_by,
                    window_days,
                    select,
                    n,
                },
                assets: asset_tickers(&children)?,
            })
        }
        "if" => parse_if(node),
        other => Err(TranslateError::Malformed(format!(
            "unsupported step `{other}`"
        ))),
    }
}

fn parse_if(node: &Value) -> Result<LogicTree> {
    let children = children_of(node)?;
    if children.len() != 2 {
        return Err(TranslateError::Malformed(format!(
            "if node must have exactly 2 children, got {}",
            children.len()
        )));
    }
    let then_child = &children[0];
    let else_child = &children[1];
    if then_child.get("is-else").and_then(Value::as_bool) != Some(false)
        || else_child.get("is-else").and_then(Value::as_bool) != Some(true)
    {
        return Err(TranslateError::Malformed(
            "if children must be [is-else:false, is-else:true]".to_string(),
        ));
    }

    let condition = condition_from_if_child(then_child)?;
    let if_true = parse(&single_child(then_child)?)?;
    let if_false = parse(&single_child(else_child)?)?;

    Ok(LogicTree::Conditional {
        condition: condition.render(),
        if_true: Box::new(if_true),
        if_false: Box::new(if_false),
    })
}

fn condition_from_if_child(child: &Value) -> Result<ParsedCondition> {
    let lhs_fn = child
        .get("lhs-fn")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslateError::Malformed("if-child missing lhs-fn".to_string()))?;
    let lhs_window = child
        .get("lhs-fn-params")
        .and_then(|p| p.get("window"))
        .and_then(Value::as_u64)
        .map(|w| w as u32);
    let lhs_metric = Metric::from_symphony_fn(lhs_fn, lhs_window)
        .ok_or_else(|| TranslateError::Malformed(format!("unknown lhs-fn `{lhs_fn}`")))?;
    let lhs_ticker = child
        .get("lhs-val")
        .and_then(Value::as_str)
        .ok_or_else(|| TranslateError::Malformed("if-child missing lhs-val".to_string()))?;

    let comparator = child
        .get("comparator")
        .and_then(Value::as_str)
        .and_then(Comparator::from_symphony_code)
        .ok_or_else(|| TranslateError::Malformed("if-child has invalid comparator".to_string()))?;

    let right = if child.get("rhs-fixed-value").and_then(Value::as_bool) == Some(true) {
        let value = child
            .get("rhs-val")
            .and_then(Value::as_f64)
            .ok_or_else(|| TranslateError::Malformed("fixed rhs-val must be numeric".to_string()))?;
        Operand::Number(value)
    } else {
        let rhs_fn = child
            .get("rhs-fn")
            .and_then(Value::as_str)
            .ok_or_else(|| TranslateError::Malformed("if-child missing rhs-fn".to_string()))?;
        let rhs_window = child
            .get("rhs-fn-params")
            .and_then(|p| p.get("window"))
            .and_then(Value::as_u64)
            .map(|w| w as u32);
        let rhs_metric = Metric::from_symphony_fn(rhs_fn, rhs_window)
            .ok_or_else(|| TranslateError::Malformed(format!("unknown rhs-fn `{rhs_fn}`")))?;
        let rhs_ticker = child
            .get("rhs-val")
            .and_then(Value::as_str)
            .ok_or_else(|| TranslateError::Malformed("if-child missing rhs-val".to_string()))?;
        Operand::Indicator(Indicator {
            ticker: rhs_ticker.to_string(),
            metric: rhs_metric,
        })
    };

    Ok(ParsedCondition {
        left: Indicator {
            ticker: lhs_ticker.to_string(),
            metric: lhs_metric,
        },
        comparator,
        right,
    })
}

fn step_of(node: &Value) -> Option<&str> {
    node.get("step").and_then(Value::as_str)
}

fn children_of(node: &Value) -> Result<Vec<Value>> {
    node.get("children")
        .and_then(Value::as_array)
        .cloned()
        .ok_or_else(|| TranslateError::Malformed("node missing children".to_string()))
}

fn single_child(node: &Value) -> Result<Value> {
    let children = children_of(node)?;
    if children.len() != 1 {
        return Err(TranslateError::Malformed(format!(
            "expected exactly one child, got {}",
            children.len()
        )));
    }
    Ok(children.into_iter().next().expect("length checked"))
}

fn ticker_of(node: &Value) -> Result<String> {
    if step_of(node) != Some("asset") {
        return Err(TranslateError::Malformed(format!(
            "expected asset node, got {:?}",
            step_of(node)
        )));
    }
    node.get("ticker")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TranslateError::Malformed("asset node missing ticker".to_string()))
}

fn asset_tickers(children: &[Value]) -> Result<Vec<String>> {
    children.iter().map(ticker_of).collect()
}
