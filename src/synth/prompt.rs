//! Prompt text sent to the model.

/// System message for the full analysis request.
pub const ANALYSIS_SYSTEM: &str = "You are a code analyzer. Explain WHAT the project does in plain \
terms, as if to a non-technical reader. Start the overview with 'This is a [type of project] that \
[main purpose]'. Describe file relationships as a dependency graph between repository paths.";

/// System message for the graph-only retry.
pub const GRAPH_SYSTEM: &str = "You are a code analyzer. You only output dependency graphs of \
source files as JSON.";

const GRAPH_SHAPE: &str = r#"  "dependencyGraph": {
    "nodes": [{"id": "relative/path.ts", "name": "path.ts", "group": 1, "radius": 10}],
    "links": [{"source": "relative/importer.ts", "target": "relative/imported.ts", "value": 1}]
  }"#;

/// Full request: summary, main files, structure and dependency graph.
#[must_use]
pub fn analysis_prompt(file_tree: &str, key_files: &str) -> String {
    format!(
        r#"Analyze this codebase and provide a JSON response.

For the overview, answer:
1. What is the main purpose of this project?
2. What problem does it solve?
3. Who are the intended users?
4. What are its key features?

Files:
{file_tree}

Content:
{key_files}

Return this exact JSON structure:
{{
  "mainFiles": [{{"path": "string", "description": "string", "confidence": 0.9}}],
  "projectType": "string",
  "suggestedStructure": {{
    "entryPoints": ["string"],
    "configFiles": ["string"],
    "testFiles": ["string"],
    "assetFiles": ["string"]
  }},
  "summary": {{
    "overview": "what the project does, its purpose, target users and key features",
    "architecture": "core design patterns used",
    "testingApproach": "testing methods",
    "codeQuality": "code quality overview"
  }},
{GRAPH_SHAPE}
}}

Use one node per source file, ids equal to the paths listed above, one group per directory."#
    )
}

/// Narrower retry asking only for the dependency graph.
#[must_use]
pub fn graph_prompt(file_tree: &str, key_files: &str) -> String {
    format!(
        r#"List the dependency relationships between the source files of this codebase.

Files:
{file_tree}

Content:
{key_files}

Return only this JSON structure with at least one node:
{{
{GRAPH_SHAPE}
}}"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_embed_tree_and_graph_shape() {
        let full = analysis_prompt("src/app.ts\nsrc/lib.ts", "package.json:\n{}\n");
        assert!(full.contains("src/app.ts\nsrc/lib.ts"));
        assert!(full.contains("\"dependencyGraph\""));
        assert!(full.contains("\"mainFiles\""));

        let retry = graph_prompt("src/app.ts", "");
        assert!(retry.contains("\"dependencyGraph\""));
        assert!(!retry.contains("\"mainFiles\""));
    }
}
