//! Graph synthesis from the model's analysis.
//!
//! The model is asked once for a full analysis. If that response carries
//! no usable graph, exactly one narrower graph-only request follows. Every
//! response is normalized by [`validate`]; transport failures and garbage
//! degrade to defaults and an empty graph rather than failing the run.

pub mod prompt;
pub mod validate;

use std::time::Duration;

use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::graph::Graph;
use crate::ports::llm::{CompletionRequest, LlmClient};
use validate::{has_graph, parse_model_json, validate_graph, validate_payload, AnalysisPayload};

/// Sampling temperature for analysis requests.
const TEMPERATURE: f32 = 0.2;

/// Repository context embedded in the prompts.
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    /// Newline-separated relative paths.
    pub file_tree: &'a str,
    /// Key file contents, `\n---\n`-separated.
    pub key_files: &'a str,
}

/// Validated output of the model stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Summary, main files and structure.
    pub payload: AnalysisPayload,
    /// The model-authored graph; possibly empty.
    pub graph: Graph,
    /// Whether the graph-only retry was issued.
    pub retried: bool,
}

/// Drives the model calls for one analysis.
pub struct Synthesizer<'a> {
    llm: &'a dyn LlmClient,
    model: String,
    timeout: Duration,
}

impl<'a> Synthesizer<'a> {
    /// Creates a synthesizer that bounds each model call by `timeout`.
    #[must_use]
    pub fn new(llm: &'a dyn LlmClient, model: impl Into<String>, timeout: Duration) -> Self {
        Self { llm, model: model.into(), timeout }
    }

    /// Requests and validates the analysis. Never fails.
    pub async fn synthesize(&self, input: SynthesisInput<'_>) -> Synthesis {
        let raw = self
            .ask(prompt::ANALYSIS_SYSTEM, prompt::analysis_prompt(input.file_tree, input.key_files))
            .await;
        let payload = validate_payload(&raw);
        let mut graph = validate_graph(&raw);

        let retried = !has_graph(&raw) || graph.is_empty();
        if retried {
            warn!("analysis response had no usable dependency graph; retrying graph-only request");
            let retry = self
                .ask(prompt::GRAPH_SYSTEM, prompt::graph_prompt(input.file_tree, input.key_files))
                .await;
            graph = validate_graph(&retry);
            if graph.is_empty() {
                warn!("graph-only retry was empty as well; continuing with an empty graph");
            }
        }

        info!(nodes = graph.nodes.len(), links = graph.links.len(), retried, "synthesized graph");
        Synthesis { payload, graph, retried }
    }

    /// One bounded model call, decoded to a JSON object (`{}` on any failure).
    async fn ask(&self, system: &str, prompt: String) -> Value {
        let request = CompletionRequest {
            model: self.model.clone(),
            system: system.to_string(),
            prompt,
            temperature: TEMPERATURE,
            json_mode: true,
        };
        match tokio::time::timeout(self.timeout, self.llm.complete(&request)).await {
            Ok(Ok(response)) => parse_model_json(&response.text),
            Ok(Err(e)) => {
                warn!("model call failed: {e}");
                Value::Object(Map::new())
            }
            Err(_) => {
                warn!("model call timed out after {}s", self.timeout.as_secs());
                Value::Object(Map::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::ReplayingLlmClient;
    use crate::cassette::format::{Cassette, Interaction};
    use crate::cassette::replayer::CassetteReplayer;
    use chrono::Utc;
    use serde_json::json;

    fn replaying(outputs: Vec<Value>) -> ReplayingLlmClient {
        let interactions = outputs
            .into_iter()
            .enumerate()
            .map(|(seq, output)| Interaction {
                seq: seq as u64,
                port: "llm".into(),
                method: "complete".into(),
                input: json!({}),
                output,
            })
            .collect();
        let cassette = Cassette {
            name: "synth".into(),
            recorded_at: Utc::now(),
            repository: String::new(),
            interactions,
        };
        ReplayingLlmClient::new(CassetteReplayer::new(&cassette))
    }

    fn text(body: &Value) -> Value {
        json!({"ok": {"text": body.to_string(), "prompt_tokens": 0, "completion_tokens": 0}})
    }

    const INPUT: SynthesisInput<'static> =
        SynthesisInput { file_tree: "app.js\nlib.js", key_files: "" };

    #[tokio::test]
    async fn empty_object_twice_yields_empty_graph() {
        let llm = replaying(vec![text(&json!({})), text(&json!({}))]);
        let synthesis = Synthesizer::new(&llm, "m", Duration::from_secs(5)).synthesize(INPUT).await;

        assert!(synthesis.retried);
        assert_eq!(synthesis.graph, Graph::default());
        assert_eq!(synthesis.payload, AnalysisPayload::default());
        assert_eq!(llm.remaining(), 0);
    }

    #[tokio::test]
    async fn retry_supplies_the_graph() {
        let first = json!({"summary": {"overview": "This is a demo."}, "dependencyGraph": {"nodes": []}});
        let second = json!({"dependencyGraph": {
            "nodes": [{"id": "app.js", "group": 1, "radius": 20}, {"id": "lib.js", "group": 2}],
            "links": [{"source": "app.js", "target": "lib.js", "value": 1}]
        }});
        let llm = replaying(vec![text(&first), text(&second)]);
        let synthesis = Synthesizer::new(&llm, "m", Duration::from_secs(5)).synthesize(INPUT).await;

        assert!(synthesis.retried);
        assert_eq!(synthesis.payload.summary.overview, "This is a demo.");
        assert_eq!(synthesis.graph.nodes.len(), 2);
        assert_eq!(synthesis.graph.links.len(), 1);
    }

    #[tokio::test]
    async fn usable_graph_needs_no_retry() {
        let body = json!({"projectType": "library", "dependencyGraph": {"nodes": [{"id": "lib.js"}]}});
        let llm = replaying(vec![text(&body), text(&json!({}))]);
        let synthesis = Synthesizer::new(&llm, "m", Duration::from_secs(5)).synthesize(INPUT).await;

        assert!(!synthesis.retried);
        assert_eq!(synthesis.payload.project_type, "library");
        assert_eq!(synthesis.graph.nodes[0].id, "lib.js");
        assert_eq!(llm.remaining(), 1);
    }

    #[tokio::test]
    async fn transport_errors_degrade_to_defaults() {
        let llm = replaying(vec![json!({"err": "connection reset"}), json!({"err": "connection reset"})]);
        let synthesis = Synthesizer::new(&llm, "m", Duration::from_secs(5)).synthesize(INPUT).await;

        assert!(synthesis.graph.is_empty());
        assert_eq!(synthesis.payload.project_type, "unknown");
    }
}
