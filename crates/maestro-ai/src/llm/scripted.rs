//! Deterministic scripted model for stage and orchestrator tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{AiError, Result};
use crate::llm::chat::{ChatModel, ChatOutcome, ChatRequest, ToolInvocation, Turn, UsageMeter};

#[derive(Debug, Clone)]
enum ScriptedAction {
    Answer(String),
    Invoke(ToolInvocation),
    Fail(String),
}

/// One scripted exchange, optionally delayed (for deadline tests).
#[derive(Debug, Clone)]
pub struct ScriptedStep {
    pause: Duration,
    action: ScriptedAction,
}

impl ScriptedStep {
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            pause: Duration::ZERO,
            action: ScriptedAction::Answer(text.into()),
        }
    }

    /// Scripted JSON reply, serialized as the answer text.
    pub fn answer_json(value: &impl serde::Serialize) -> Self {
        Self::answer(serde_json::to_string(value).unwrap_or_default())
    }

    pub fn invoke(
        call_id: impl Into<String>,
        tool: impl Into<String>,
        args: serde_json::Value,
    ) -> Self {
        Self {
            pause: Duration::ZERO,
            action: ScriptedAction::Invoke(ToolInvocation::new(call_id, tool, args)),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            pause: Duration::ZERO,
            action: ScriptedAction::Fail(message.into()),
        }
    }

    pub fn after(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }
}

/// Plays back a queue of [`ScriptedStep`]s; once the script runs dry it
/// echoes the latest request so open-ended tests keep moving.
#[derive(Clone, Default)]
pub struct ScriptedChat {
    model: String,
    script: Arc<Mutex<VecDeque<ScriptedStep>>>,
}

impl ScriptedChat {
    pub fn new(model: impl Into<String>, steps: Vec<ScriptedStep>) -> Self {
        Self {
            model: model.into(),
            script: Arc::new(Mutex::new(VecDeque::from(steps))),
        }
    }

    pub async fn enqueue(&self, step: ScriptedStep) {
        self.script.lock().await.push_back(step);
    }

    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }

    fn echo(request: &ChatRequest) -> ChatOutcome {
        let text = request
            .turns
            .iter()
            .rev()
            .find(|turn| turn.is_request())
            .map(|turn| format!("scripted-echo: {}", turn.text()))
            .unwrap_or_else(|| "scripted-ok".to_string());
        ChatOutcome::Answer {
            text,
            usage: UsageMeter::default(),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    fn provider(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn send(&self, request: ChatRequest) -> Result<ChatOutcome> {
        let step = self.script.lock().await.pop_front();
        let Some(step) = step else {
            return Ok(Self::echo(&request));
        };

        if !step.pause.is_zero() {
            sleep(step.pause).await;
        }

        let usage = UsageMeter {
            input_tokens: request.turns.len() as u32,
            output_tokens: 1,
        };
        match step.action {
            ScriptedAction::Answer(text) => Ok(ChatOutcome::Answer { text, usage }),
            ScriptedAction::Invoke(call) => Ok(ChatOutcome::ToolPass {
                calls: vec![call],
                usage,
            }),
            ScriptedAction::Fail(message) => Err(AiError::Llm(message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Sampling;

    fn request(text: &str) -> ChatRequest {
        ChatRequest::new(vec![Turn::request(text)], Sampling::standard(512, 0.7))
    }

    #[tokio::test]
    async fn plays_the_script_in_order() {
        let chat = ScriptedChat::new(
            "scripted-model",
            vec![
                ScriptedStep::invoke("c1", "symphony_save", serde_json::json!({})),
                ScriptedStep::answer("done"),
            ],
        );

        let first = chat.send(request("go")).await.unwrap();
        assert!(matches!(first, ChatOutcome::ToolPass { .. }));

        let second = chat.send(request("and?")).await.unwrap();
        let ChatOutcome::Answer { text, .. } = second else {
            panic!("expected an answer");
        };
        assert_eq!(text, "done");
        assert_eq!(chat.remaining().await, 0);
    }

    #[tokio::test]
    async fn dry_script_echoes_the_request() {
        let chat = ScriptedChat::new("scripted-model", vec![]);
        let outcome = chat.send(request("ping")).await.unwrap();
        let ChatOutcome::Answer { text, .. } = outcome else {
            panic!("expected an answer");
        };
        assert_eq!(text, "scripted-echo: ping");
    }
}
