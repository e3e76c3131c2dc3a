//! Total normalization of untrusted model output.
//!
//! Every function here accepts any `serde_json::Value` and returns a
//! well-formed value; wrong types fall back to defaults field by field.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::graph::{DependencyLink, FileNode, Graph};

/// Radius given to model-supplied nodes without a usable radius.
pub const DEFAULT_NODE_RADIUS: f64 = 10.0;

/// A file the model considers central, with its explanation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MainFile {
    /// Repository-relative path.
    pub path: String,
    /// What the file does.
    pub description: String,
    /// Model confidence, unbounded.
    pub confidence: f64,
}

/// Files grouped by role.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestedStructure {
    /// Program entry points.
    pub entry_points: Vec<String>,
    /// Build and tooling configuration.
    pub config_files: Vec<String>,
    /// Test sources.
    pub test_files: Vec<String>,
    /// Static assets.
    pub asset_files: Vec<String>,
}

/// Prose sections of the analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectSummary {
    /// What the project is and who it is for.
    pub overview: String,
    /// Design patterns in use.
    pub architecture: String,
    /// How the project is tested.
    pub testing_approach: String,
    /// Code quality assessment.
    pub code_quality: String,
}

impl Default for ProjectSummary {
    fn default() -> Self {
        Self {
            overview: "No overview available".into(),
            architecture: "Architecture information not available".into(),
            testing_approach: "Testing information not available".into(),
            code_quality: "Code quality assessment not available".into(),
        }
    }
}

/// The non-graph part of a model analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisPayload {
    /// Central files.
    pub main_files: Vec<MainFile>,
    /// Free-form project kind, `unknown` when absent.
    pub project_type: String,
    /// Files by role.
    pub suggested_structure: SuggestedStructure,
    /// Prose summary.
    pub summary: ProjectSummary,
}

impl Default for AnalysisPayload {
    fn default() -> Self {
        Self {
            main_files: Vec::new(),
            project_type: "unknown".into(),
            suggested_structure: SuggestedStructure::default(),
            summary: ProjectSummary::default(),
        }
    }
}

/// Decodes model text into a JSON object.
///
/// The span from the first `{` to the last `}` is parsed, which tolerates
/// prose or code fences around the object. Anything unparseable, or a
/// non-object, yields `{}`.
#[must_use]
pub fn parse_model_json(text: &str) -> Value {
    let span = match (text.find('{'), text.rfind('}')) {
        (Some(start), Some(end)) if start < end => &text[start..=end],
        _ => return Value::Object(Map::new()),
    };
    match serde_json::from_str::<Value>(span) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Map::new()),
    }
}

/// Returns `true` if the response carries a `dependencyGraph` key.
#[must_use]
pub fn has_graph(raw: &Value) -> bool {
    raw.get("dependencyGraph").is_some()
}

/// Normalizes `raw.dependencyGraph` into a canonical [`Graph`].
///
/// Missing or wrongly typed containers become empty; non-object entries are
/// dropped; fields are coerced and defaulted one by one. Duplicate ids and
/// links with unknown endpoints are then removed.
#[must_use]
pub fn validate_graph(raw: &Value) -> Graph {
    let graph = raw.get("dependencyGraph");
    let nodes = array(graph.and_then(|g| g.get("nodes"))).iter().filter_map(validate_node).collect();
    let links = array(graph.and_then(|g| g.get("links"))).iter().filter_map(validate_link).collect();
    Graph { nodes, links }.canonicalize()
}

fn validate_node(value: &Value) -> Option<FileNode> {
    let obj = value.as_object()?;
    let id = coerce_string(obj.get("id"));
    let name = match coerce_string(obj.get("name")) {
        name if name.is_empty() => id.clone(),
        name => name,
    };
    let group = coerce_number(obj.get("group"))
        .filter(|g| *g >= 1.0)
        .map_or(1, |g| float_to_u32(g.floor()));
    let radius = coerce_number(obj.get("radius")).filter(|r| *r > 0.0).unwrap_or(DEFAULT_NODE_RADIUS);
    Some(FileNode { id, name, group, radius })
}

fn validate_link(value: &Value) -> Option<DependencyLink> {
    let obj = value.as_object()?;
    let value = coerce_number(obj.get("value"))
        .filter(|v| *v >= 1.0)
        .map_or(1, |v| float_to_u32(v.round()));
    Some(DependencyLink {
        source: coerce_string(obj.get("source")),
        target: coerce_string(obj.get("target")),
        value,
    })
}

/// Normalizes everything except the graph.
#[must_use]
pub fn validate_payload(raw: &Value) -> AnalysisPayload {
    let defaults = AnalysisPayload::default();
    let structure = raw.get("suggestedStructure");
    let summary = raw.get("summary");
    let summary_field = |key: &str, fallback: String| {
        non_empty_or(coerce_string(summary.and_then(|s| s.get(key))), fallback)
    };

    AnalysisPayload {
        main_files: array(raw.get("mainFiles"))
            .iter()
            .filter_map(Value::as_object)
            .map(|file| MainFile {
                path: coerce_string(file.get("path")),
                description: coerce_string(file.get("description")),
                confidence: coerce_number(file.get("confidence")).unwrap_or(0.0),
            })
            .collect(),
        project_type: non_empty_or(coerce_string(raw.get("projectType")), defaults.project_type),
        suggested_structure: SuggestedStructure {
            entry_points: string_list(structure.and_then(|s| s.get("entryPoints"))),
            config_files: string_list(structure.and_then(|s| s.get("configFiles"))),
            test_files: string_list(structure.and_then(|s| s.get("testFiles"))),
            asset_files: string_list(structure.and_then(|s| s.get("assetFiles"))),
        },
        summary: ProjectSummary {
            overview: summary_field("overview", defaults.summary.overview),
            architecture: summary_field("architecture", defaults.summary.architecture),
            testing_approach: summary_field("testingApproach", defaults.summary.testing_approach),
            code_quality: summary_field("codeQuality", defaults.summary.code_quality),
        },
    }
}

fn array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    array(value).iter().map(|v| coerce_string(Some(v))).filter(|s| !s.is_empty()).collect()
}

/// Strings pass through; numbers and booleans are rendered; anything else is `""`.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Finite numbers, including numeric strings.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn non_empty_or(value: String, fallback: String) -> String {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn float_to_u32(n: f64) -> u32 {
    n.clamp(1.0, f64::from(u32::MAX)) as u32
}
