//! Agent runtime: per-call window limits, compression, structured output

mod compression;
mod history;
mod runtime;
mod schema;

pub use compression::{CompressionConfig, ToolResultCompressor};
pub use history::{HistoryLimit, trim_window};
pub use runtime::{AgentCall, AgentRuntime, env_flag};
pub use schema::{extract_json, parse_structured, schema_fix_prompt, schema_instructions};
