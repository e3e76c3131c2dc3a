//! End-to-end pipeline runs against replayed cassettes.
//!
//! Each test writes a cassette holding a recorded checkout snapshot and
//! model responses, replays it through `ServiceContext::replaying`, and
//! checks the stored analysis.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use repograph::cassette::recorder::CassetteRecorder;
use repograph::config::Settings;
use repograph::context::ServiceContext;
use repograph::error::AnalysisError;
use repograph::pipeline::{self, AnalyzeRequest};
use repograph::store::GraphStore;

const URL: &str = "https://github.com/acme/widget.git";
const RECORDED_AT: &str = "2025-03-15T14:30:00Z";
const SCRATCH_MILLIS: &str = "1742049000000";

struct Sandbox {
    root: PathBuf,
}

impl Sandbox {
    fn new(name: &str) -> Self {
        let root = std::env::temp_dir().join(format!("repograph_pipeline_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn settings(&self) -> Settings {
        Settings {
            workdir: self.root.join("work"),
            store_root: self.root.join("store"),
            ..Settings::default()
        }
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

fn snapshot() -> Value {
    json!({"files": {
        "package.json": r#"{"dependencies": {"express": "4"}}"#,
        "README.md": "# widget\n",
        "src/app.js": "import express from 'express';\nimport { helper } from './lib';\nexport function main() {}\n",
        "src/lib.js": "export const helper = 1;\n"
    }})
}

fn completion(body: &Value) -> Value {
    json!({"ok": {"text": body.to_string(), "prompt_tokens": 10, "completion_tokens": 5}})
}

fn write_cassette(path: &Path, fetch: Value, completions: &[Value]) {
    let mut recorder = CassetteRecorder::new(path, "pipeline");
    recorder.set_repository(URL);
    recorder.record("clock", "now", json!({}), json!(RECORDED_AT));
    recorder.record("source", "fetch", json!({"url": URL, "branch": "main"}), fetch);
    for body in completions {
        recorder.record("llm", "complete", json!({}), completion(body));
    }
    recorder.record("clock", "now", json!({}), json!(RECORDED_AT));
    recorder.finish().unwrap();
}

fn request() -> AnalyzeRequest {
    AnalyzeRequest { url: URL.into(), branch: "main".into(), access_token: None, project_id: None }
}

#[tokio::test]
async fn replayed_analysis_is_stored_with_both_graphs() {
    let sandbox = Sandbox::new("stored");
    let settings = sandbox.settings();
    let cassette = sandbox.root.join("run.cassette.yaml");
    let model = json!({
        "projectType": "web service",
        "summary": {"overview": "An express app."},
        "mainFiles": [{"path": "src/app.js", "description": "entry", "confidence": 0.9}],
        "dependencyGraph": {
            "nodes": [{"id": "src/app.js", "group": 1, "radius": 20}, {"id": "src/lib.js", "group": 2}],
            "links": [{"source": "src/app.js", "target": "src/lib.js", "value": 1}]
        }
    });
    write_cassette(&cassette, json!({"ok": snapshot()}), &[model]);

    let ctx = ServiceContext::replaying(&cassette).unwrap();
    let analysis = pipeline::run(&ctx, &settings, &request()).await.unwrap();

    assert_eq!(analysis.project_id, "widget");
    assert!(!analysis.graph_retried);
    assert_eq!(analysis.payload.project_type, "web service");
    assert_eq!(analysis.payload.main_files.len(), 1);
    assert_eq!(analysis.payload.main_files[0].description, "entry");
    assert_eq!(analysis.graph.nodes.len(), 2);
    assert_eq!(analysis.graph.nodes[1].name, "src/lib.js");
    assert!(analysis.graph.is_canonical());

    let static_ids: Vec<&str> = analysis.static_graph.nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(static_ids, vec!["src/app.js", "src/lib.js"]);
    assert_eq!(analysis.static_graph.links.len(), 1);
    assert_eq!(analysis.static_graph.links[0].target, "src/lib.js");
    assert_eq!(analysis.exports["src/app.js"], vec!["main"]);

    assert_eq!(analysis.stats.file_count, 4);
    assert_eq!(analysis.stats.js_files, 2);
    assert_eq!(analysis.dependencies, vec!["express"]);
    assert_eq!(analysis.analyzed_at.to_rfc3339(), "2025-03-15T14:30:00+00:00");

    assert!(!settings.workdir.join(SCRATCH_MILLIS).exists(), "checkout was not cleaned up");
    let fs = repograph::adapters::live::filesystem::LiveFileSystem;
    let stored = GraphStore::new(&fs, &settings.store_root).load("widget").unwrap();
    assert_eq!(stored, analysis);
}

#[tokio::test]
async fn empty_model_output_twice_still_completes() {
    let sandbox = Sandbox::new("empty");
    let settings = sandbox.settings();
    let cassette = sandbox.root.join("empty.cassette.yaml");
    write_cassette(&cassette, json!({"ok": snapshot()}), &[json!({}), json!({})]);

    let ctx = ServiceContext::replaying(&cassette).unwrap();
    let analysis = pipeline::run(&ctx, &settings, &request()).await.unwrap();

    assert!(analysis.graph_retried);
    assert!(analysis.graph.nodes.is_empty());
    assert!(analysis.graph.links.is_empty());
    assert_eq!(analysis.payload.summary.overview, "No overview available");
    let main_files: Vec<&str> = analysis.payload.main_files.iter().map(|m| m.path.as_str()).collect();
    assert_eq!(main_files, vec!["src/app.js", "README.md", "package.json"]);
    assert_eq!(analysis.static_graph.nodes.len(), 2);
}

#[tokio::test]
async fn failed_fetch_is_a_retrieval_error_and_stores_nothing() {
    let sandbox = Sandbox::new("failed");
    let settings = sandbox.settings();
    let cassette = sandbox.root.join("failed.cassette.yaml");
    write_cassette(&cassette, json!({"err": "repository not found"}), &[]);

    let ctx = ServiceContext::replaying(&cassette).unwrap();
    let err = pipeline::run(&ctx, &settings, &request()).await.unwrap_err();

    match err {
        AnalysisError::Retrieval { url, reason } => {
            assert_eq!(url, URL);
            assert!(reason.contains("repository not found"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!settings.store_root.join("projects").join("widget.json").exists());
    assert!(!settings.workdir.join(SCRATCH_MILLIS).exists());
}
