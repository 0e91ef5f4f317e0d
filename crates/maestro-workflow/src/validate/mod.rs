//! Strategy validation: structural and semantic checks with fix guidance.

mod condition;
mod semantic;
mod structural;

use maestro_models::{ContextPack, Strategy};

pub use condition::{
    Comparator, ConditionError, Indicator, Metric, Operand, ParsedCondition,
};

use std::collections::{BTreeMap, BTreeSet};

/// What rule a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    FieldBounds,
    WeightSum,
    WeightKeys,
    MalformedTree,
    TreeShape,
    TreeAssets,
    Concentration,
    LeverageJustification,
    ArchetypeCoherence,
    ThesisLogicMismatch,
    RoundWeights,
    ConditionSyntax,
    AbsoluteThreshold,
    VolProxyThesis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// One validation finding with targeted fix guidance.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub kind: ValidationKind,
    pub severity: Severity,
    pub message: String,
    pub fix_guidance: String,
    /// Whether a targeted fix-retry can address this finding.
    pub retryable: bool,
}

impl ValidationError {
    pub fn error(
        kind: ValidationKind,
        message: impl Into<String>,
        fix_guidance: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            fix_guidance: fix_guidance.into(),
            retryable: true,
        }
    }

    pub fn fatal(
        kind: ValidationKind,
        message: impl Into<String>,
        fix_guidance: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            message: message.into(),
            fix_guidance: fix_guidance.into(),
            retryable: false,
        }
    }

    pub fn warning(
        kind: ValidationKind,
        message: impl Into<String>,
        fix_guidance: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity: Severity::Warning,
            message: message.into(),
            fix_guidance: fix_guidance.into(),
            retryable: false,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Tunable rule inputs. Defaults cover the common ETF universe; deployments
/// override per cohort.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Tickers that may appear in conditions without being held.
    pub signal_only_tickers: BTreeSet<String>,
    /// Leveraged / inverse products that demand an explicit risk discussion.
    pub leveraged_tickers: BTreeSet<String>,
    /// Tickers allowed in absolute `*_price vs literal` comparisons.
    pub absolute_price_proxies: BTreeSet<String>,
    /// Volatility proxies that require a vol-regime thesis.
    pub vol_proxy_tickers: BTreeSet<String>,
    /// Closed keyword vocabulary satisfying the vol-thesis requirement.
    pub vol_keywords: Vec<String>,
    /// Ticker -> sector label for the sector concentration rule.
    pub sector_map: BTreeMap<String, String>,
    /// Relative tolerance for thesis-vs-condition threshold matching.
    pub threshold_tolerance: f64,
    pub max_single_asset_weight: f64,
    pub max_single_sector_weight: f64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        let sectors = [
            ("XLK", "technology"),
            ("XLF", "financials"),
            ("XLE", "energy"),
            ("XLV", "health_care"),
            ("XLI", "industrials"),
            ("XLP", "consumer_staples"),
            ("XLY", "consumer_discretionary"),
            ("XLU", "utilities"),
            ("XLB", "materials"),
            ("XLRE", "real_estate"),
            ("XLC", "communications"),
            ("SMH", "technology"),
            ("KRE", "financials"),
            ("XOP", "energy"),
            ("XBI", "health_care"),
        ];
        Self {
            signal_only_tickers: to_set(&[
                "SPY", "QQQ", "IWM", "DIA", "VIXY", "VXX", "UVXY", "TLT", "HYG",
            ]),
            leveraged_tickers: to_set(&[
                "TQQQ", "SQQQ", "UPRO", "SPXU", "SSO", "SDS", "QLD", "QID", "UDOW", "SDOW",
                "TMF", "TMV", "SOXL", "SOXS", "TNA", "TZA", "UVXY", "SVXY",
            ]),
            absolute_price_proxies: to_set(&["VIXY", "VXX", "UVXY"]),
            vol_proxy_tickers: to_set(&["VIXY", "VXX", "UVXY", "VIXM"]),
            vol_keywords: [
                "vix",
                "vixy",
                "volatility",
                "vol regime",
                "vol spike",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            sector_map: sectors
                .iter()
                .map(|(t, s)| (t.to_string(), s.to_string()))
                .collect(),
            threshold_tolerance: 0.20,
            max_single_asset_weight: 0.30,
            max_single_sector_weight: 0.50,
        }
    }
}

fn to_set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Structural + semantic strategy validation.
pub struct Validator {
    config: ValidatorConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Run every rule and collect the findings. An empty list means the
    /// strategy is accepted and becomes immutable downstream.
    pub fn validate(&self, strategy: &Strategy, _ctx: &ContextPack) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        structural::check_field_bounds(strategy, &mut errors);
        structural::check_weights(strategy, &mut errors);
        structural::check_tree(strategy, &self.config, &mut errors);

        semantic::check_concentration(strategy, &self.config, &mut errors);
        semantic::check_leverage_justification(strategy, &self.config, &mut errors);
        semantic::check_archetype_coherence(strategy, &mut errors);
        semantic::check_conditions(strategy, &self.config, &mut errors);
        semantic::check_thesis_thresholds(strategy, &self.config, &mut errors);
        semantic::check_round_weights(strategy, &mut errors);

        for error in &errors {
            match error.severity {
                Severity::Error => tracing::debug!(
                    kind = ?error.kind,
                    retryable = error.retryable,
                    message = %error.message,
                    "Validation error"
                ),
                Severity::Warning => tracing::debug!(
                    kind = ?error.kind,
                    message = %error.message,
                    "Validation warning"
                ),
            }
        }

        errors
    }
}

/// Findings that must block acceptance (warnings never do).
pub fn blocking_errors(errors: &[ValidationError]) -> Vec<&ValidationError> {
    errors.iter().filter(|e| e.is_blocking()).collect()
}

/// Whether every blocking finding is addressable by a fix-retry.
pub fn all_retryable(errors: &[ValidationError]) -> bool {
    errors
        .iter()
        .filter(|e| e.is_blocking())
        .all(|e| e.retryable)
}
