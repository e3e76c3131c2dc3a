//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;

fn run_repograph(args: &[&str], store: &Path) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_repograph");
    Command::new(bin)
        .args(args)
        .env("REPOGRAPH_STORE", store)
        .env_remove("REPOGRAPH_RECORD")
        .output()
        .expect("failed to run repograph binary")
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("repograph_cli_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

const TWO_NODE_GRAPH: &str = r#"{
  "nodes": [
    {"id": "app.js", "group": 1, "radius": 20},
    {"id": "lib.js", "group": 2, "radius": 10}
  ],
  "links": [{"source": "app.js", "target": "lib.js", "value": 1}]
}"#;

#[test]
fn scan_prints_the_static_graph() {
    let dir = scratch("scan");
    std::fs::create_dir_all(dir.join("a/b")).unwrap();
    std::fs::write(dir.join("a/b/c.ts"), "import x from './d';\nimport express from 'express';\n").unwrap();
    std::fs::write(dir.join("a/b/d.ts"), "export const x = 1;\n").unwrap();

    let output = run_repograph(&["scan", dir.to_str().unwrap()], &dir.join("store"));
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let graph: Value = serde_json::from_slice(&output.stdout).unwrap();

    let links = graph["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["source"], "a/b/c.ts");
    assert_eq!(links[0]["target"], "a/b/d.ts");
    let ids: Vec<&str> = graph["nodes"].as_array().unwrap().iter().filter_map(|n| n["id"].as_str()).collect();
    assert!(!ids.contains(&"express"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn circular_layout_of_a_graph_file() {
    let dir = scratch("circular");
    let file = dir.join("graph.json");
    std::fs::write(&file, TWO_NODE_GRAPH).unwrap();

    let output = run_repograph(
        &["layout", file.to_str().unwrap(), "--view", "circular", "--width", "200", "--height", "200"],
        &dir.join("store"),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let scene: Value = serde_json::from_slice(&output.stdout).unwrap();

    assert_eq!(scene["view"], "circular");
    for node in scene["nodes"].as_array().unwrap() {
        assert_eq!(node["x"].as_f64(), Some(100.0));
        assert_eq!(node["y"].as_f64(), Some(100.0));
    }
    assert_eq!(scene["links"].as_array().unwrap().len(), 1);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn tree_layout_writes_an_svg_snapshot() {
    let dir = scratch("svg");
    let file = dir.join("graph.json");
    let out = dir.join("tree.svg");
    std::fs::write(&file, TWO_NODE_GRAPH).unwrap();

    let output = run_repograph(
        &["layout", file.to_str().unwrap(), "--view", "tree", "--svg", out.to_str().unwrap()],
        &dir.join("store"),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let svg = std::fs::read_to_string(&out).unwrap();
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("<path d=\"M"));
    assert_eq!(svg.matches("<circle").count(), 2);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn force_layout_keeps_nodes_in_the_viewport() {
    let dir = scratch("force");
    let file = dir.join("graph.json");
    std::fs::write(&file, TWO_NODE_GRAPH).unwrap();

    let output = run_repograph(
        &["layout", file.to_str().unwrap(), "--width", "300", "--height", "200", "--ticks", "50"],
        &dir.join("store"),
    );
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let scene: Value = serde_json::from_slice(&output.stdout).unwrap();
    for node in scene["nodes"].as_array().unwrap() {
        let (x, y, r) = (node["x"].as_f64().unwrap(), node["y"].as_f64().unwrap(), node["radius"].as_f64().unwrap());
        assert!(r <= x && x <= 300.0 - r);
        assert!(r <= y && y <= 200.0 - r);
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn show_on_an_empty_store() {
    let dir = scratch("show");
    let output = run_repograph(&["show"], &dir.join("store"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("No projects found"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn layout_of_an_unknown_project_fails() {
    let dir = scratch("unknown");
    let output = run_repograph(&["layout", "nowhere"], &dir.join("store"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("nowhere"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn invalid_subcommand_exits_with_error() {
    let output = run_repograph(&["nonsense"], &std::env::temp_dir());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("unrecognized subcommand"));
}
