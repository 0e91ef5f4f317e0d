//! Daily equity price history tool (heavy: compression-eligible).

use async_trait::async_trait;
use maestro_ai::http_client::build_http_client;
use maestro_ai::{Result, Tool, ToolReply, ToolSpec};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct PricesArgs {
    ticker: String,
    #[serde(default = "default_range")]
    range: String,
}

fn default_range() -> String {
    "6mo".to_string()
}

/// Fetch a daily close-price history for one ticker.
pub struct StockPricesTool {
    http: Client,
    base_url: String,
}

impl Default for StockPricesTool {
    fn default() -> Self {
        Self::new()
    }
}

impl StockPricesTool {
    pub fn new() -> Self {
        Self {
            http: build_http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Tool for StockPricesTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "stock_prices",
            "Fetch daily close prices for a ticker over a lookback range (e.g. 1mo, 6mo, 1y).",
            json!({
                "type": "object",
                "properties": {
                    "ticker": {"type": "string"},
                    "range": {
                        "type": "string",
                        "description": "Lookback range, default 6mo"
                    }
                },
                "required": ["ticker"]
            }),
        )
        .heavy()
    }

    async fn run(&self, args: Value) -> Result<ToolReply> {
        let args: PricesArgs = serde_json::from_value(args)?;

        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval=1d",
            self.base_url, args.ticker, args.range
        );

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let body: Value = response.json().await?;
                let result = body
                    .pointer("/chart/result/0")
                    .cloned()
                    .unwrap_or(Value::Null);
                Ok(ToolReply::Data(json!({
                    "ticker": args.ticker,
                    "range": args.range,
                    "timestamps": result.get("timestamp").cloned().unwrap_or(Value::Null),
                    "closes": result
                        .pointer("/indicators/quote/0/close")
                        .cloned()
                        .unwrap_or(Value::Null),
                })))
            }
            Ok(response) => Ok(ToolReply::Refusal(format!(
                "price service returned HTTP {}",
                response.status()
            ))),
            Err(e) => Ok(ToolReply::Refusal(e.to_string())),
        }
    }
}
