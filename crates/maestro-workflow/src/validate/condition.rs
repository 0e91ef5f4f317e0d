//! Condition grammar: single scalar comparisons over ticker-qualified
//! indicators.
//!
//! The deployment platform evaluates one comparison per branch node, so the
//! grammar is deliberately closed: no boolean connectives, a fixed metric
//! vocabulary, and operands that are either numeric literals or another
//! qualified indicator. Macro index names ("VIX", breadth measures) are not
//! operands; they must be expressed through a tradeable proxy ticker.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    #[error("boolean operators not permitted in condition: {0}")]
    BooleanOperator(String),

    #[error("condition must contain exactly one comparison operator: {0}")]
    MissingComparator(String),

    #[error(
        "left operand must be a ticker-qualified indicator like TICKER_price or TICKER_200d_MA; \
got `{0}`. Macro index names need a proxy ticker (e.g. VIXY_price for volatility)"
    )]
    UnqualifiedOperand(String),

    #[error("unknown metric suffix `{0}`")]
    UnknownMetric(String),

    #[error("right operand must be a number or a qualified indicator: {0}")]
    InvalidOperand(String),
}

/// Indicator metric vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Price,
    MovingAverage(u32),
    Return(u32),
    CumulativeReturn(u32),
    StdDevReturn(u32),
    StdDevPrice(u32),
    Rsi(u32),
    Ema(u32),
}

static METRIC_WINDOW_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)d_(.+)$").expect("static regex"));
static METRIC_WINDOW_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(rsi|ema)_(\d+)$").expect("static regex"));

impl Metric {
    pub fn parse(suffix: &str) -> Result<Self, ConditionError> {
        if suffix == "price" {
            return Ok(Self::Price);
        }

        if let Some(caps) = METRIC_WINDOW_PREFIX.captures(suffix) {
            let window: u32 = caps[1]
                .parse()
                .map_err(|_| ConditionError::UnknownMetric(suffix.to_string()))?;
            return match &caps[2] {
                "MA" => Ok(Self::MovingAverage(window)),
                "return" => Ok(Self::Return(window)),
                "cumulative_return" => Ok(Self::CumulativeReturn(window)),
                "standard_deviation_return" => Ok(Self::StdDevReturn(window)),
                "standard_deviation_price" => Ok(Self::StdDevPrice(window)),
                _ => Err(ConditionError::UnknownMetric(suffix.to_string())),
            };
        }

        if let Some(caps) = METRIC_WINDOW_SUFFIX.captures(suffix) {
            let window: u32 = caps[2]
                .parse()
                .map_err(|_| ConditionError::UnknownMetric(suffix.to_string()))?;
            return match &caps[1] {
                "rsi" => Ok(Self::Rsi(window)),
                "ema" => Ok(Self::Ema(window)),
                _ => Err(ConditionError::UnknownMetric(suffix.to_string())),
            };
        }

        Err(ConditionError::UnknownMetric(suffix.to_string()))
    }

    /// Canonical suffix form, the exact inverse of [`Metric::parse`].
    pub fn render(&self) -> String {
        match self {
            Self::Price => "price".to_string(),
            Self::MovingAverage(w) => format!("{w}d_MA"),
            Self::Return(w) => format!("{w}d_return"),
            Self::CumulativeReturn(w) => format!("{w}d_cumulative_return"),
            Self::StdDevReturn(w) => format!("{w}d_standard_deviation_return"),
            Self::StdDevPrice(w) => format!("{w}d_standard_deviation_price"),
            Self::Rsi(w) => format!("rsi_{w}"),
            Self::Ema(w) => format!("ema_{w}"),
        }
    }

    pub fn window(&self) -> Option<u32> {
        match self {
            Self::Price => None,
            Self::MovingAverage(w)
            | Self::Return(w)
            | Self::CumulativeReturn(w)
            | Self::StdDevReturn(w)
            | Self::StdDevPrice(w)
            | Self::Rsi(w)
            | Self::Ema(w) => Some(*w),
        }
    }

    /// Platform function code for this metric.
    pub fn symphony_fn(&self) -> &'static str {
        match self {
            Self::Price => "current-price",
            Self::MovingAverage(_) => "moving-average-price",
            Self::Return(_) => "period-return",
            Self::CumulativeReturn(_) => "cumulative-return",
            Self::StdDevReturn(_) => "standard-deviation-return",
            Self::StdDevPrice(_) => "standard-deviation-price",
            Self::Rsi(_) => "relative-strength-index",
            Self::Ema(_) => "exponential-moving-average-price",
        }
    }

    /// Inverse of [`Metric::symphony_fn`].
    pub fn from_symphony_fn(code: &str, window: Option<u32>) -> Option<Self> {
        match code {
            "current-price" => Some(Self::Price),
            "moving-average-price" => window.map(Self::MovingAverage),
            "period-return" => window.map(Self::Return),
            "cumulative-return" => window.map(Self::CumulativeReturn),
            "standard-deviation-return" => window.map(Self::StdDevReturn),
            "standard-deviation-price" => window.map(Self::StdDevPrice),
            "relative-strength-index" => window.map(Self::Rsi),
            "exponential-moving-average-price" => window.map(Self::Ema),
            _ => None,
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Gt,
    Lt,
    Gte,
    Lte,
    Eq,
    Neq,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Eq => "==",
            Self::Neq => "!=",
        }
    }

    pub fn symphony_code(&self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::Gte => "gte",
            Self::Lte => "lte",
            Self::Eq => "eq",
            Self::Neq => "neq",
        }
    }

    pub fn from_symphony_code(code: &str) -> Option<Self> {
        match code {
            "gt" => Some(Self::Gt),
            "lt" => Some(Self::Lt),
            "gte" => Some(Self::Gte),
            "lte" => Some(Self::Lte),
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            _ => None,
        }
    }
}

/// Ticker-qualified indicator, e.g. `SPY_200d_MA`.
#[derive(Debug, Clone, PartialEq)]
pub struct Indicator {
    pub ticker: String,
    pub metric: Metric,
}

impl Indicator {
    pub fn render(&self) -> String {
        format!("{}_{}", self.ticker, self.metric.render())
    }
}

static INDICATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Z][A-Z0-9.]{0,9})_(.+)$").expect("static regex"));
static BOOLEAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(AND|OR|NOT)\b").expect("static regex"));

fn parse_indicator(text: &str) -> Result<Indicator, ConditionError> {
    let caps = INDICATOR_RE
        .captures(text)
        .ok_or_else(|| ConditionError::UnqualifiedOperand(text.to_string()))?;
    let metric = Metric::parse(&caps[2])?;
    Ok(Indicator {
        ticker: caps[1].to_string(),
        metric,
    })
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f64),
    Indicator(Indicator),
}

impl Operand {
    pub fn render(&self) -> String {
        match self {
            Self::Number(n) => format_number(*n),
            Self::Indicator(indicator) => indicator.render(),
        }
    }
}

/// Render without a trailing `.0` so round-trips stay byte-identical for
/// integer thresholds.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

/// A fully decomposed scalar comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCondition {
    pub left: Indicator,
    pub comparator: Comparator,
    pub right: Operand,
}

impl ParsedCondition {
    /// Decompose a condition string, rejecting anything outside the grammar.
    pub fn parse(condition: &str) -> Result<Self, ConditionError> {
        let trimmed = condition.trim();

        if let Some(m) = BOOLEAN_RE.find(trimmed) {
            return Err(ConditionError::BooleanOperator(m.as_str().to_string()));
        }

        // Two-char operators first so ">=" does not split as ">" + "=".
        let (op_text, comparator) = [
            (">=", Comparator::Gte),
            ("<=", Comparator::Lte),
            ("==", Comparator::Eq),
            ("!=", Comparator::Neq),
            (">", Comparator::Gt),
            ("<", Comparator::Lt),
        ]
        .into_iter()
        .find(|(text, _)| trimmed.contains(text))
        .ok_or_else(|| ConditionError::MissingComparator(trimmed.to_string()))?;

        let (lhs, rhs) = trimmed
            .split_once(op_text)
            .ok_or_else(|| ConditionError::MissingComparator(trimmed.to_string()))?;
        let lhs = lhs.trim();
        let rhs = rhs.trim();

        if rhs.contains(['>', '<', '=', '!']) {
            return Err(ConditionError::MissingComparator(trimmed.to_string()));
        }

        let left = parse_indicator(lhs)?;
        let right = if let Ok(number) = rhs.parse::<f64>() {
            Operand::Number(number)
        } else {
            Operand::Indicator(
                parse_indicator(rhs)
                    .map_err(|_| ConditionError::InvalidOperand(rhs.to_string()))?,
            )
        };

        Ok(Self {
            left,
            comparator,
            right,
        })
    }

    /// Canonical string form; `parse(render(c)) == c` for any parsed `c`.
    pub fn render(&self) -> String {
        format!(
            "{} {} {}",
            self.left.render(),
            self.comparator.as_str(),
            self.right.render()
        )
    }

    /// Numeric threshold if the right operand is a literal.
    pub fn threshold(&self) -> Option<f64> {
        match self.right {
            Operand::Number(n) => Some(n),
            Operand::Indicator(_) => None,
        }
    }

    /// Tickers named by either operand.
    pub fn tickers(&self) -> Vec<&str> {
        let mut out = vec![self.left.ticker.as_str()];
        if let Operand::Indicator(indicator) = &self.right {
            out.push(indicator.ticker.as_str());
        }
        out
    }

    /// Whether this is an absolute price-level comparison
    /// (`*_price <op> literal`).
    pub fn is_absolute_price(&self) -> bool {
        self.left.metric == Metric::Price && matches!(self.right, Operand::Number(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_price_vs_literal() {
        let parsed = ParsedCondition::parse("VIXY_price > 25").unwrap();
        assert_eq!(parsed.left.ticker, "VIXY");
        assert_eq!(parsed.left.metric, Metric::Price);
        assert_eq!(parsed.comparator, Comparator::Gt);
        assert_eq!(parsed.right, Operand::Number(25.0));
        assert!(parsed.is_absolute_price());
    }

    #[test]
    fn parses_cross_indicator_comparison() {
        let parsed = ParsedCondition::parse("SPY_price >= SPY_200d_MA").unwrap();
        assert_eq!(parsed.comparator, Comparator::Gte);
        let Operand::Indicator(right) = &parsed.right else {
            panic!("expected indicator rhs");
        };
        assert_eq!(right.ticker, "SPY");
        assert_eq!(right.metric, Metric::MovingAverage(200));
        assert!(!parsed.is_absolute_price());
    }

    #[test]
    fn parses_every_metric_suffix() {
        for (suffix, expected) in [
            ("price", Metric::Price),
            ("50d_MA", Metric::MovingAverage(50)),
            ("20d_return", Metric::Return(20)),
            ("30d_cumulative_return", Metric::CumulativeReturn(30)),
            ("21d_standard_deviation_return", Metric::StdDevReturn(21)),
            ("21d_standard_deviation_price", Metric::StdDevPrice(21)),
            ("rsi_14", Metric::Rsi(14)),
            ("ema_20", Metric::Ema(20)),
        ] {
            assert_eq!(Metric::parse(suffix).unwrap(), expected, "{suffix}");
            assert_eq!(expected.render(), suffix);
        }
    }

    #[test]
    fn rejects_boolean_operators_case_insensitively() {
        for condition in [
            "VIX > 25 AND SPY_200d_MA > 0",
            "VIXY_price > 25 and SPY_price > 400",
            "NOT VIXY_price > 25",
        ] {
            let err = ParsedCondition::parse(condition).unwrap_err();
            assert!(
                matches!(err, ConditionError::BooleanOperator(_)),
                "{condition}: {err}"
            );
            assert!(err.to_string().contains("boolean operators not permitted"));
        }
    }

    #[test]
    fn word_boundary_spares_embedded_fragments() {
        // "GRND" contains no standalone connective; ticker names with
        // AND/OR/NOT as substrings must not trip the check.
        assert!(ParsedCondition::parse("ANDE_price > 25").is_ok());
        assert!(ParsedCondition::parse("NOTE_price > 10").is_ok());
    }

    #[test]
    fn rejects_bare_macro_names() {
        let err = ParsedCondition::parse("VIX > 25").unwrap_err();
        assert!(matches!(err, ConditionError::UnqualifiedOperand(_)));
        assert!(err.to_string().contains("proxy"));
    }

    #[test]
    fn rejects_unknown_metric() {
        let err = ParsedCondition::parse("SPY_breadth > 0.5").unwrap_err();
        assert!(matches!(err, ConditionError::UnknownMetric(_)));
    }

    #[test]
    fn rejects_chained_comparisons() {
        let err = ParsedCondition::parse("SPY_price > 10 > 5").unwrap_err();
        assert!(matches!(err, ConditionError::MissingComparator(_)));
    }

    #[test]
    fn render_parse_round_trip_is_identity() {
        for condition in [
            "VIXY_price > 25",
            "SPY_price >= SPY_200d_MA",
            "QQQ_rsi_14 < 30",
            "XLE_30d_cumulative_return != XLF_30d_cumulative_return",
            "TLT_21d_standard_deviation_price <= 1.5",
        ] {
            let parsed = ParsedCondition::parse(condition).unwrap();
            assert_eq!(parsed.render(), condition);
            assert_eq!(ParsedCondition::parse(&parsed.render()).unwrap(), parsed);
        }
    }

    #[test]
    fn symphony_fn_codes_round_trip() {
        for metric in [
            Metric::Price,
            Metric::MovingAverage(200),
            Metric::Return(20),
            Metric::CumulativeReturn(30),
            Metric::StdDevReturn(21),
            Metric::StdDevPrice(21),
            Metric::Rsi(14),
            Metric::Ema(20),
        ] {
            let back = Metric::from_symphony_fn(metric.symphony_fn(), metric.window()).unwrap();
            assert_eq!(back, metric);
        }
    }
}
