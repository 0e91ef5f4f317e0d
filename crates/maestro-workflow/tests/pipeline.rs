//! End-to-end pipeline tests driven by a scripted LLM client and an
//! in-memory checkpoint store.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use maestro_ai::{AiError, ChatModel, ChatOutcome, ChatRequest, Toolbox, UsageMeter};
use maestro_models::{ContextPack, WorkflowStage};
use maestro_workflow::tools::SymphonySaveTool;
use maestro_workflow::{CheckpointStore, MemoryCheckpointStore, StrategyWorkflow, WorkflowError};

// ---------------------------------------------------------------------------
// Scripted model: routes each stage call by its instruction turn and returns
// canned JSON, so the five concurrent persona calls stay deterministic.
// ---------------------------------------------------------------------------

enum CharterStep {
    Succeed(Value),
    Fail(String),
}

#[derive(Default)]
struct RoutedClient {
    /// persona marker text -> candidate strategy JSON
    candidates: HashMap<&'static str, Value>,
    /// popped on each fix-retry call
    fix_responses: Mutex<VecDeque<Value>>,
    /// candidate name -> scorecard JSON
    scorecards: HashMap<String, Value>,
    ballot: Value,
    charter_steps: Mutex<VecDeque<CharterStep>>,
    default_charter: Value,
    confirm: Value,
    calls: Mutex<Vec<String>>,
}

impl RoutedClient {
    async fn record(&self, label: impl Into<String>) {
        self.calls.lock().await.push(label.into());
    }

    async fn call_labels(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    fn reply(content: Value) -> ChatOutcome {
        ChatOutcome::Answer {
            text: content.to_string(),
            usage: UsageMeter::default(),
        }
    }
}

const PERSONA_MARKERS: [&str; 5] = [
    "macro-regime allocator",
    "factor investor",
    "tail-risk manager",
    "sector rotator",
    "trend follower",
];

#[async_trait]
impl ChatModel for RoutedClient {
    fn provider(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "routed-mock"
    }

    async fn send(&self, request: ChatRequest) -> maestro_ai::Result<ChatOutcome> {
        let system = request
            .turns
            .iter()
            .find(|t| t.is_instructions())
            .map(|t| t.text().to_string())
            .unwrap_or_default();
        let user = request
            .turns
            .iter()
            .rev()
            .find(|t| t.is_request())
            .map(|t| t.text().to_string())
            .unwrap_or_default();

        if system.contains("portfolio strategist") {
            if user.contains("failed validation") {
                self.record("fix").await;
                return self
                    .fix_responses
                    .lock()
                    .await
                    .pop_front()
                    .map(Self::reply)
                    .ok_or_else(|| AiError::Llm("fix script exhausted".to_string()));
            }
            for marker in PERSONA_MARKERS {
                if user.contains(marker) {
                    self.record(format!("generate:{marker}")).await;
                    return self
                        .candidates
                        .get(marker)
                        .cloned()
                        .map(Self::reply)
                        .ok_or_else(|| AiError::Llm(format!("no candidate for {marker}")));
                }
            }
            return Err(AiError::Llm("unrecognized persona".to_string()));
        }

        if system.contains("investment committee reviewer") {
            for (name, card) in &self.scorecards {
                if user.contains(name.as_str()) {
                    self.record(format!("score:{name}")).await;
                    return Ok(Self::reply(card.clone()));
                }
            }
            return Err(AiError::Llm("no scorecard for candidate".to_string()));
        }

        if system.contains("chief investment officer") {
            self.record("select").await;
            return Ok(Self::reply(self.ballot.clone()));
        }

        if system.contains("deployment charter") {
            self.record("charter").await;
            return match self.charter_steps.lock().await.pop_front() {
                Some(CharterStep::Succeed(value)) => Ok(Self::reply(value)),
                Some(CharterStep::Fail(message)) => Err(AiError::Llm(message)),
                None => Ok(Self::reply(self.default_charter.clone())),
            };
        }

        if system.contains("final deployment gate") {
            self.record("confirm").await;
            return Ok(Self::reply(self.confirm.clone()));
        }

        Err(AiError::Llm(format!(
            "unrecognized stage call: {}",
            system.chars().take(60).collect::<String>()
        )))
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn context_pack() -> ContextPack {
    ContextPack {
        anchor_date: chrono::NaiveDate::from_ymd_opt(2025, 11, 14).unwrap(),
        regime_snapshot: "Late-cycle expansion; disinflation stalling; vol suppressed".to_string(),
        macro_indicators: json!({"vix": 16.8, "dgs10": 4.35, "t10y2y": 0.12}),
        benchmark_performance: json!({"SPY": {"ytd": 0.18}, "AGG": {"ytd": 0.04}}),
        recent_events: vec![
            "FOMC held rates, guidance unchanged".to_string(),
            "Megacap earnings beat, breadth narrow".to_string(),
        ],
        regime_tags: vec!["risk_on".to_string(), "low_vol".to_string()],
    }
}

fn pad(text: &str, target: usize) -> String {
    let filler = " The sizing reflects realized correlations rather than headline narratives, \
and the position set is liquid enough to exit within a session without moving markets.";
    let mut out = text.to_string();
    while out.chars().count() < target {
        out.push_str(filler);
    }
    out
}

fn macro_candidate() -> Value {
    json!({
        "name": "Global Carry 60/40",
        "assets": ["SPY", "AGG"],
        "weights": {"SPY": 0.6, "AGG": 0.4},
        "rebalance_frequency": "quarterly",
        "logic_tree": null,
        "thesis_document": pad(
            "Equity and term premia remain the two most reliable carriers of return in a \
late-cycle expansion. We hold beta and duration in a deliberate 60/40 split because the \
cycle evidence does not justify a defensive tilt yet.", 260),
        "rebalancing_rationale": pad(
            "Quarterly rebalancing matches the pace at which cycle evidence accumulates; the \
60% equity and 40% bond targets drift slowly and trading faster only adds cost.", 170),
        "edge_type": "risk_premium",
        "archetype": "carry",
        "concentration_intent": "high_conviction"
    })
}

fn factor_candidate() -> Value {
    json!({
        "name": "Factor Sleeve",
        "assets": ["VLUE", "QUAL", "MTUM", "USMV"],
        "weights": {"VLUE": 0.25, "QUAL": 0.25, "MTUM": 0.25, "USMV": 0.25},
        "rebalance_frequency": "monthly",
        "logic_tree": null,
        "thesis_document": pad(
            "Value, quality, momentum and low-volatility premia are paid by investors with \
institutional constraints that do not disappear with the cycle. Harvesting all four in one \
sleeve diversifies factor timing risk that single-factor carriers concentrate.", 280),
        "rebalancing_rationale": pad(
            "Monthly equal weight across the four factor carriers keeps tracking error \
symmetric; factor leadership rotates too fast for quarterly resets.", 160),
        "edge_type": "structural",
        "archetype": "multi_strategy",
        "concentration_intent": "diversified"
    })
}

fn tail_candidate() -> Value {
    json!({
        "name": "Vol Regime Rotation",
        "assets": ["TLT", "GLD", "QQQ", "IWM"],
        "weights": {"TLT": 0.3, "GLD": 0.2, "QQQ": 0.3, "IWM": 0.2},
        "rebalance_frequency": "weekly",
        "logic_tree": {
            "condition": "VIXY_price > 25",
            "if_true": {"assets": ["TLT", "GLD"], "weights": {"TLT": 0.7, "GLD": 0.3}},
            "if_false": {"assets": ["QQQ", "IWM"], "weights": {"QQQ": 0.6, "IWM": 0.4}}
        },
        "thesis_document": pad(
            "Investors systematically underpay for protection while the volatility regime is \
calm and overpay once it breaks. We hold growth beta in the calm state and rotate into \
duration and gold when VIXY pushes above 25, a level that has historically separated \
orderly pullbacks from deleveraging.", 320),
        "rebalancing_rationale": pad(
            "Weekly evaluation is fast enough to catch a regime break without whipsawing on \
daily noise; the 30% duration and 20% gold sleeves are sized to matter in the rotation.",
            180),
        "edge_type": "behavioral",
        "archetype": "volatility",
        "concentration_intent": "diversified"
    })
}

fn sector_candidate() -> Value {
    json!({
        "name": "Sector Momentum",
        "assets": ["XLK", "XLF", "XLE", "XLV"],
        "weights": {"XLK": 0.25, "XLF": 0.25, "XLE": 0.25, "XLV": 0.25},
        "rebalance_frequency": "monthly",
        "logic_tree": {
            "filter": {"sort_by": "cumulative_return", "window_days": 30, "select": "top", "n": 2},
            "assets": ["XLK", "XLF", "XLE", "XLV"]
        },
        "thesis_document": pad(
            "Sector leadership persists over one-to-three month horizons because capital \
rotates into confirmed earnings trends slowly. We rotate into the two leading sectors by \
one-month cumulative return and let the laggards go unheld.", 280),
        "rebalancing_rationale": pad(
            "Monthly re-ranking with equal weight across the selected leaders matches the \
persistence horizon of sector momentum without churning the book.", 160),
        "edge_type": "informational",
        "archetype": "momentum",
        "concentration_intent": "diversified"
    })
}

fn trend_candidate() -> Value {
    json!({
        "name": "Trend Core",
        "assets": ["SPY", "IEF", "GLD", "SHY"],
        "weights": {"SPY": 0.3, "IEF": 0.3, "GLD": 0.2, "SHY": 0.2},
        "rebalance_frequency": "weekly",
        "logic_tree": {
            "condition": "SPY_price > SPY_200d_MA",
            "if_true": {"assets": ["SPY", "GLD"], "weights": {"SPY": 0.6, "GLD": 0.4}},
            "if_false": {"assets": ["IEF", "SHY"], "weights": {"IEF": 0.5, "SHY": 0.5}}
        },
        "thesis_document": pad(
            "Price against its own long moving average is the cheapest real-time read on \
regime. We hold equity beta while SPY trades over trend and rotate to duration and bills \
once it loses trend, accepting whipsaw cost as the premium for catastrophe avoidance.",
            280),
        "rebalancing_rationale": pad(
            "Weekly checks keep trend lag tolerable; the 30% core sleeves and 20% \
satellites are sized so a whipsaw costs basis points, not percent.", 160),
        "edge_type": "behavioral",
        "archetype": "momentum",
        "concentration_intent": "diversified"
    })
}

fn scorecard(dims: [u8; 5], name: &str) -> Value {
    json!({
        "thesis_quality": dims[0],
        "edge_economics": dims[1],
        "risk_framework": dims[2],
        "regime_awareness": dims[3],
        "strategic_coherence": dims[4],
        "evaluation_document": pad(
            &format!("{name}: the edge claim is specific and the structure matches it."), 520),
    })
}

fn ballot() -> Value {
    json!({
        "fitness": [0.6, 0.9, 0.5, 0.4],
        "winner_index": 1,
        "conviction": 0.8,
        "why_selected": "Best risk asymmetry for a suppressed-vol regime with narrow breadth.",
        "tradeoffs_accepted": ["Whipsaw around the VIXY trigger", "Carry drag in the calm state"],
        "alternatives_rejected": [
            {"candidate_name": "Global Carry 60/40", "reason": "no answer to a vol break"},
            {"candidate_name": "Sector Momentum", "reason": "crowded leadership"},
            {"candidate_name": "Trend Core", "reason": "slower regime read than the vol gate"}
        ]
    })
}

fn charter_value() -> Value {
    json!({
        "market_thesis": "Suppressed volatility with narrow breadth; regime fragile to a rate surprise.",
        "strategy_selection": "Vol Regime Rotation won on risk asymmetry over pure carry and trend.",
        "expected_behavior": "Holds QQQ/IWM growth beta while calm; rotates to TLT/GLD when VIXY breaches 25.",
        "failure_modes": [
            "VIXY whipsaws around the 25 trigger and the rotation churns",
            "Duration and equities sell off together on an inflation surprise",
            "A vol spike resolves faster than the weekly evaluation cadence"
        ],
        "outlook_90d": "Base case range-bound with one or two vol events; rotation expected to trigger at most once."
    })
}

fn confirm_value() -> Value {
    json!({
        "ready": true,
        "symphony_name": "Vol Regime Rotation",
        "symphony_description": "Rotates into duration and gold when VIXY breaches 25; holds growth beta otherwise.",
        "rationale": "Structure, thesis and charter agree; both branches are populated."
    })
}

fn routed_client() -> RoutedClient {
    let mut candidates = HashMap::new();
    candidates.insert(PERSONA_MARKERS[0], macro_candidate());
    candidates.insert(PERSONA_MARKERS[1], factor_candidate());
    candidates.insert(PERSONA_MARKERS[2], tail_candidate());
    candidates.insert(PERSONA_MARKERS[3], sector_candidate());
    candidates.insert(PERSONA_MARKERS[4], trend_candidate());

    let mut scorecards = HashMap::new();
    scorecards.insert("Global Carry 60/40".to_string(), scorecard([3, 3, 3, 3, 3], "carry"));
    scorecards.insert("Factor Sleeve".to_string(), scorecard([2, 2, 2, 2, 2], "factor"));
    scorecards.insert("Vol Regime Rotation".to_string(), scorecard([4, 4, 4, 4, 4], "vol"));
    scorecards.insert("Sector Momentum".to_string(), scorecard([3, 3, 3, 4, 3], "sector"));
    scorecards.insert("Trend Core".to_string(), scorecard([3, 4, 3, 3, 3], "trend"));

    RoutedClient {
        candidates,
        scorecards,
        ballot: ballot(),
        default_charter: charter_value(),
        confirm: confirm_value(),
        ..RoutedClient::default()
    }
}

async fn symphony_server(symphony_id: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/symphonies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symphony_id": symphony_id,
            "version_id": "v1"
        })))
        .mount(&server)
        .await;
    server
}

fn workflow(
    client: Arc<RoutedClient>,
    store: Arc<MemoryCheckpointStore>,
    server: &MockServer,
) -> StrategyWorkflow {
    let deploy_tools = Toolbox::new().with(SymphonySaveTool::new(server.uri(), "test-key"));

    StrategyWorkflow::new(store)
        .with_client(client)
        .with_deploy_tools(deploy_tools)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_run_deploys_the_conditional_winner() {
    let client = Arc::new(routed_client());
    let store = Arc::new(MemoryCheckpointStore::new());
    let server = symphony_server("sym_e2e_1").await;
    let flow = workflow(client.clone(), store.clone(), &server);

    let outcome = flow
        .run(context_pack(), Some("mock:routed-mock"))
        .await
        .expect("workflow should complete");

    assert_eq!(outcome.symphony_id.as_deref(), Some("sym_e2e_1"));
    assert!(outcome.deployed_at.is_some());
    assert_eq!(
        outcome.checkpoint.last_completed_stage,
        WorkflowStage::Deployment
    );

    // The conditional vol-rotation candidate wins on the composite.
    let winner = outcome.checkpoint.winner.as_ref().expect("winner recorded");
    assert_eq!(winner.name, "Vol Regime Rotation");
    assert!(winner.logic_tree.is_some());

    // Five candidates generated, five scored, below-threshold one filtered
    // only at selection.
    assert_eq!(outcome.checkpoint.candidates.as_ref().unwrap().len(), 5);
    assert_eq!(outcome.checkpoint.scorecards.as_ref().unwrap().len(), 5);

    // Winner index is relative to the surviving (passing) list.
    assert_eq!(outcome.checkpoint.selection.as_ref().unwrap().winner_index, 1);

    // Successful deployment clears the stored checkpoint.
    assert!(store.load().await.unwrap().is_none());
    // One save per completed stage.
    assert_eq!(store.save_count().await, 5);

    let labels = client.call_labels().await;
    assert_eq!(labels.iter().filter(|l| l.starts_with("generate:")).count(), 5);
    assert_eq!(labels.iter().filter(|l| l.starts_with("score:")).count(), 5);
    assert_eq!(labels.iter().filter(|l| *l == "charter").count(), 1);
    assert_eq!(labels.iter().filter(|l| *l == "confirm").count(), 1);
}

#[tokio::test]
async fn unfixable_boolean_condition_drops_the_candidate_and_continues() {
    let mut client = routed_client();

    // The tail-risk persona insists on a boolean condition; both fix-retries
    // return the identical strategy.
    let mut bad = tail_candidate();
    bad["logic_tree"]["condition"] = json!("VIXY_price > 25 AND SPY_price > 400");
    client
        .candidates
        .insert(PERSONA_MARKERS[2], bad.clone());
    client.fix_responses = Mutex::new(VecDeque::from(vec![bad.clone(), bad.clone()]));

    // With the vol candidate gone the ballot covers the four survivors.
    client.ballot = json!({
        "fitness": [0.7, 0.4, 0.6, 0.5],
        "winner_index": 0,
        "conviction": 0.6,
        "why_selected": "Carry core is the cleanest remaining expression.",
        "tradeoffs_accepted": ["No explicit vol hedge"],
        "alternatives_rejected": [
            {"candidate_name": "Sector Momentum", "reason": "crowded"},
            {"candidate_name": "Trend Core", "reason": "slower regime read"}
        ]
    });

    let client = Arc::new(client);
    let store = Arc::new(MemoryCheckpointStore::new());
    let server = symphony_server("sym_e2e_2").await;
    let flow = workflow(client.clone(), store.clone(), &server);

    let outcome = flow
        .run(context_pack(), Some("mock:routed-mock"))
        .await
        .expect("workflow should continue with four candidates");

    let candidates = outcome.checkpoint.candidates.as_ref().unwrap();
    assert_eq!(candidates.len(), 4);
    assert!(candidates.iter().all(|c| c.name != "Vol Regime Rotation"));

    // One targeted fix-retry per attempt, two attempts, then the drop.
    let labels = client.call_labels().await;
    assert_eq!(labels.iter().filter(|l| *l == "fix").count(), 2);

    assert!(outcome.symphony_id.is_some());
}

#[tokio::test]
async fn charter_failure_preserves_selection_checkpoint_and_resume_finishes() {
    // First run: the charter call fails after selection completed.
    let mut client = routed_client();
    client.charter_steps = Mutex::new(VecDeque::from(vec![CharterStep::Fail(
        "injected charter failure".to_string(),
    )]));
    let client = Arc::new(client);
    let store = Arc::new(MemoryCheckpointStore::new());
    let server = symphony_server("sym_resume_1").await;
    let flow = workflow(client.clone(), store.clone(), &server);

    let error = flow
        .run(context_pack(), Some("mock:routed-mock"))
        .await
        .expect_err("charter failure must surface");
    assert!(matches!(error, WorkflowError::Ai(_)));

    let saved = store
        .load()
        .await
        .unwrap()
        .expect("checkpoint preserved on failure");
    assert_eq!(saved.last_completed_stage, WorkflowStage::Selection);
    assert!(saved.winner.is_some());
    assert!(saved.charter.is_none());
    let cached_candidates = serde_json::to_string(&saved.candidates).unwrap();
    let cached_winner = serde_json::to_string(&saved.winner).unwrap();

    // Second session: fresh client, resume from the stored checkpoint.
    let resume_client = Arc::new(routed_client());
    let resume_flow = workflow(resume_client.clone(), store.clone(), &server);

    let outcome = resume_flow
        .resume(saved)
        .await
        .expect("resume should complete the run");

    assert_eq!(outcome.symphony_id.as_deref(), Some("sym_resume_1"));
    assert_eq!(
        outcome.checkpoint.last_completed_stage,
        WorkflowStage::Deployment
    );

    // Generate, score and select were not re-invoked.
    let labels = resume_client.call_labels().await;
    assert!(labels.iter().all(|l| !l.starts_with("generate:")));
    assert!(labels.iter().all(|l| !l.starts_with("score:")));
    assert!(labels.iter().all(|l| l != "select"));
    assert_eq!(labels.iter().filter(|l| *l == "charter").count(), 1);

    // Cached outputs flow through byte-identical.
    assert_eq!(
        serde_json::to_string(&outcome.checkpoint.candidates).unwrap(),
        cached_candidates
    );
    assert_eq!(
        serde_json::to_string(&outcome.checkpoint.winner).unwrap(),
        cached_winner
    );

    // Checkpoint cleared after the successful deployment.
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn all_candidates_below_threshold_aborts_with_no_passing_candidate() {
    let mut client = routed_client();
    for name in [
        "Global Carry 60/40",
        "Factor Sleeve",
        "Vol Regime Rotation",
        "Sector Momentum",
        "Trend Core",
    ] {
        client
            .scorecards
            .insert(name.to_string(), scorecard([2, 2, 2, 2, 2], name));
    }
    let client = Arc::new(client);
    let store = Arc::new(MemoryCheckpointStore::new());
    let server = symphony_server("sym_never").await;
    let flow = workflow(client, store.clone(), &server);

    let error = flow
        .run(context_pack(), Some("mock:routed-mock"))
        .await
        .expect_err("workflow must abort");
    assert!(matches!(error, WorkflowError::NoPassingCandidate));

    // The scoring checkpoint survives for inspection and resume.
    let saved = store.load().await.unwrap().expect("checkpoint preserved");
    assert_eq!(saved.last_completed_stage, WorkflowStage::Scoring);
}

#[tokio::test]
async fn refused_confirmation_is_a_clean_noop_that_preserves_the_checkpoint() {
    let mut client = routed_client();
    client.confirm = json!({
        "ready": false,
        "symphony_name": "",
        "symphony_description": "",
        "rationale": "condition threshold looks unreachable this quarter"
    });
    let client = Arc::new(client);
    let store = Arc::new(MemoryCheckpointStore::new());
    let server = symphony_server("sym_refused").await;
    let flow = workflow(client, store.clone(), &server);

    let outcome = flow
        .run(context_pack(), Some("mock:routed-mock"))
        .await
        .expect("refusal is not an error");

    assert!(outcome.symphony_id.is_none());
    assert!(outcome.deployed_at.is_none());

    let saved = store.load().await.unwrap().expect("checkpoint preserved");
    assert_eq!(saved.last_completed_stage, WorkflowStage::Charter);
    assert!(saved.symphony_id.is_none());
}

#[tokio::test]
async fn static_winner_deploys_with_weight_maps() {
    // Score the static carry candidate to the top so a logic-tree-free
    // strategy reaches deployment.
    let mut client = routed_client();
    client
        .scorecards
        .insert("Global Carry 60/40".to_string(), scorecard([5, 5, 5, 5, 5], "carry"));
    client
        .scorecards
        .insert("Vol Regime Rotation".to_string(), scorecard([3, 3, 3, 3, 3], "vol"));
    client.ballot = json!({
        "fitness": [0.9, 0.4, 0.4, 0.4],
        "winner_index": 0,
        "conviction": 0.7,
        "why_selected": "Cleanest carry expression for the regime.",
        "tradeoffs_accepted": ["No vol hedge"],
        "alternatives_rejected": [
            {"candidate_name": "Vol Regime Rotation", "reason": "trigger unlikely this quarter"}
        ]
    });
    client.confirm = json!({
        "ready": true,
        "symphony_name": "Global Carry 60/40",
        "symphony_description": "Static 60/40 carry core.",
        "rationale": "static allocation, nothing conditional to audit"
    });

    let client = Arc::new(client);
    let store = Arc::new(MemoryCheckpointStore::new());

    // Capture the payload so the translated shape can be asserted.
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/symphonies"))
        .and(wiremock::matchers::body_partial_json(json!({
            "asset_class": "EQUITIES",
            "symphony_score": {"step": "wt-cash-specified"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symphony_id": "sym_static_1",
            "version_id": "v1"
        })))
        .mount(&server)
        .await;

    let flow = workflow(client, store, &server);
    let outcome = flow
        .run(context_pack(), Some("mock:routed-mock"))
        .await
        .expect("static deployment should succeed");

    assert_eq!(outcome.symphony_id.as_deref(), Some("sym_static_1"));
    assert_eq!(
        outcome.checkpoint.winner.as_ref().unwrap().name,
        "Global Carry 60/40"
    );
}
