//! FRED macro series tool (heavy: compression-eligible).

use async_trait::async_trait;
use maestro_ai::http_client::build_http_client;
use maestro_ai::{Result, Tool, ToolReply, ToolSpec};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};

const DEFAULT_BASE_URL: &str = "https://api.stlouisfed.org";

#[derive(Debug, Deserialize)]
struct FredArgs {
    series_id: String,
    #[serde(default)]
    observation_start: Option<String>,
    #[serde(default)]
    limit: Option<u32>,
}

/// Fetch observations for one FRED series.
pub struct FredSeriesTool {
    http: Client,
    base_url: String,
    api_key: String,
}

impl FredSeriesTool {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: build_http_client(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl Tool for FredSeriesTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "fred_series",
            "Fetch observations for a FRED macro series (rates, spreads, inflation, employment).",
            json!({
                "type": "object",
                "properties": {
                    "series_id": {
                        "type": "string",
                        "description": "FRED series id, e.g. DGS10, T10Y2Y, CPIAUCSL"
                    },
                    "observation_start": {
                        "type": "string",
                        "description": "Optional ISO date lower bound"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Max observations, newest last"
                    }
                },
                "required": ["series_id"]
            }),
        )
        .heavy()
    }

    async fn run(&self, args: Value) -> Result<ToolReply> {
        let args: FredArgs = serde_json::from_value(args)?;

        let mut request = self
            .http
            .get(format!("{}/fred/series/observations", self.base_url))
            .query(&[
                ("series_id", args.series_id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
            ]);
        if let Some(start) = &args.observation_start {
            request = request.query(&[("observation_start", start.as_str())]);
        }
        if let Some(limit) = args.limit {
            request = request.query(&[("limit", limit.to_string())]);
        }

        match request.send().await {
            Ok(response) if response.status().is_success() => {
                let body: Value = response.json().await?;
                Ok(ToolReply::Data(json!({
                    "series_id": args.series_id,
                    "observations": body.get("observations").cloned().unwrap_or(Value::Null),
                })))
            }
            Ok(response) => Ok(ToolReply::Refusal(format!(
                "FRED returned HTTP {}",
                response.status()
            ))),
            Err(e) => Ok(ToolReply::Refusal(e.to_string())),
        }
    }
}
