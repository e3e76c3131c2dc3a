//! Replaying adapter for the `LlmClient` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::llm::{CompletionFuture, CompletionRequest, LlmClient};

/// Serves recorded LLM completions from a cassette.
pub struct ReplayingLlmClient {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingLlmClient {
    /// Create a replaying LLM client backed by the given replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Completions recorded but not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.replayer
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remaining("llm", "complete")
    }
}

impl LlmClient for ReplayingLlmClient {
    fn complete(&self, _request: &CompletionRequest) -> CompletionFuture<'_> {
        let output = next_output(&self.replayer, "llm", "complete");
        Box::pin(async move { replay_result(output) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cassette::format::{Cassette, Interaction};
    use chrono::Utc;
    use serde_json::json;

    fn request() -> CompletionRequest {
        CompletionRequest {
            model: "m".into(),
            system: "s".into(),
            prompt: "p".into(),
            temperature: 0.2,
            json_mode: true,
        }
    }

    #[tokio::test]
    async fn serves_ok_then_err() {
        let cassette = Cassette {
            name: "llm".into(),
            recorded_at: Utc::now(),
            repository: String::new(),
            interactions: vec![
                Interaction {
                    seq: 0,
                    port: "llm".into(),
                    method: "complete".into(),
                    input: json!({}),
                    output: json!({"ok": {"text": "{}", "prompt_tokens": 3, "completion_tokens": 1}}),
                },
                Interaction {
                    seq: 1,
                    port: "llm".into(),
                    method: "complete".into(),
                    input: json!({}),
                    output: json!({"err": "rate limited"}),
                },
            ],
        };
        let client = ReplayingLlmClient::new(CassetteReplayer::new(&cassette));

        let first = client.complete(&request()).await.unwrap();
        assert_eq!(first.text, "{}");
        assert_eq!(first.prompt_tokens, 3);
        assert_eq!(client.remaining(), 1);

        let second = client.complete(&request()).await.unwrap_err();
        assert_eq!(second.to_string(), "rate limited");
        assert_eq!(client.remaining(), 0);
    }
}
