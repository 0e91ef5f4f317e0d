//! Tool-result compression via a small-model summarization call.

use std::sync::Arc;

use crate::error::{AiError, Result};
use crate::llm::{ChatModel, ChatOutcome, ChatRequest, Sampling, Turn};

const SUMMARIZATION_INSTRUCTIONS: &str = "You summarize raw tool output for a trading research \
agent. Keep every number, date, ticker and trend direction that could matter; drop formatting, \
repetition and boilerplate. Reply with the summary only.";

const SUMMARY_TOKEN_BUDGET: u32 = 1_024;
const SUMMARY_TEMPERATURE: f32 = 0.2;

/// Per-call compression settings. Disabled by default; stages opt in.
#[derive(Debug, Clone)]
pub struct CompressionConfig {
    pub enabled: bool,
    /// Raw results at or below this many chars pass through untouched.
    pub min_chars: usize,
    /// Hard cap applied to the summary.
    pub max_summary_chars: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            min_chars: 200,
            max_summary_chars: 1_200,
        }
    }
}

impl CompressionConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }
}

/// Post-processor over rendered tool results.
///
/// Only heavy tools and only results above the threshold are compressed;
/// tool identity and every other result pass through untouched. Summarizer
/// failures fall back to the raw result rather than failing the call.
pub struct ToolResultCompressor {
    summarizer: Arc<dyn ChatModel>,
    config: CompressionConfig,
}

impl ToolResultCompressor {
    pub fn new(summarizer: Arc<dyn ChatModel>, config: CompressionConfig) -> Self {
        Self { summarizer, config }
    }

    pub fn should_compress(&self, heavy: bool, raw: &str) -> bool {
        self.config.enabled && heavy && raw.len() > self.config.min_chars
    }

    /// Compress the raw result if it qualifies, otherwise return it as-is.
    pub async fn process(&self, tool_name: &str, heavy: bool, raw: String) -> String {
        if !self.should_compress(heavy, &raw) {
            return raw;
        }

        match self.summarize(tool_name, &raw).await {
            Ok(summary) => {
                tracing::debug!(
                    tool = tool_name,
                    raw_chars = raw.len(),
                    summary_chars = summary.len(),
                    "Compressed tool result"
                );
                summary
            }
            Err(error) => {
                tracing::warn!(
                    tool = tool_name,
                    error = %error,
                    "Tool-result summarization failed, passing raw result through"
                );
                raw
            }
        }
    }

    async fn summarize(&self, tool_name: &str, raw: &str) -> Result<String> {
        let request = ChatRequest::new(
            vec![
                Turn::instructions(SUMMARIZATION_INSTRUCTIONS),
                Turn::request(format!(
                    "Tool `{tool_name}` returned:\n\n{raw}\n\nSummarize in at most {} characters.",
                    self.config.max_summary_chars
                )),
            ],
            Sampling::standard(SUMMARY_TOKEN_BUDGET, SUMMARY_TEMPERATURE),
        );

        let summary = match self.summarizer.send(request).await? {
            ChatOutcome::Answer { text, .. } | ChatOutcome::Truncated { text, .. } => text,
            ChatOutcome::ToolPass { .. } => {
                return Err(AiError::Llm(
                    "summarizer attempted a tool call".to_string(),
                ));
            }
        };
        Ok(truncate_chars(&summary, self.config.max_summary_chars))
    }
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ScriptedChat, ScriptedStep};

    fn compressor(steps: Vec<ScriptedStep>, config: CompressionConfig) -> ToolResultCompressor {
        ToolResultCompressor::new(Arc::new(ScriptedChat::new("scripted-small", steps)), config)
    }

    #[tokio::test]
    async fn short_results_pass_through() {
        let c = compressor(vec![], CompressionConfig::enabled());
        let raw = "short".to_string();
        assert_eq!(c.process("fred_series", true, raw.clone()).await, raw);
    }

    #[tokio::test]
    async fn light_tools_are_never_compressed() {
        let c = compressor(vec![], CompressionConfig::enabled());
        let raw = "x".repeat(5_000);
        assert_eq!(c.process("symphony_save", false, raw.clone()).await, raw);
    }

    #[tokio::test]
    async fn large_heavy_results_are_summarized() {
        let c = compressor(
            vec![ScriptedStep::answer(
                "10y yield rose 4.1 -> 4.6 over the window",
            )],
            CompressionConfig::enabled(),
        );
        let raw = "4.10, 4.11, 4.12, ".repeat(100);
        let out = c.process("fred_series", true, raw).await;
        assert_eq!(out, "10y yield rose 4.1 -> 4.6 over the window");
    }

    #[tokio::test]
    async fn summarizer_failure_falls_back_to_raw() {
        let c = compressor(
            vec![ScriptedStep::fail("summarizer down")],
            CompressionConfig::enabled(),
        );
        let raw = "y".repeat(500);
        assert_eq!(c.process("stock_prices", true, raw.clone()).await, raw);
    }

    #[tokio::test]
    async fn disabled_config_is_a_no_op() {
        let c = compressor(vec![], CompressionConfig::default());
        let raw = "z".repeat(500);
        assert_eq!(c.process("fred_series", true, raw.clone()).await, raw);
    }

    #[test]
    fn summary_is_hard_capped() {
        assert_eq!(truncate_chars("abcdef", 4), "abcd");
        assert_eq!(truncate_chars("abc", 4), "abc");
    }
}
