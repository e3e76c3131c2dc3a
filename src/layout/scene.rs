//! The drawable output of a layout pass.
//!
//! A [`Scene`] is a flat list of links, circles and labels in drawing
//! order, plus the optional pan/zoom transform applied to all of them.

use serde::{Deserialize, Serialize};

use super::color::{brighter, group_color};
use super::zoom::Transform;
use super::{Point, ViewType};
use crate::graph::{FileNode, Graph};

/// Stroke width of tree links.
const TREE_LINK_WIDTH: f64 = 1.5;
/// Radius multiplier for the hovered node.
pub const HOVER_SCALE: f64 = 1.2;

/// A positioned, styled node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    /// Graph node id.
    pub id: String,
    /// Label text.
    pub label: String,
    /// Center, in layout space.
    pub x: f64,
    /// Center, in layout space.
    pub y: f64,
    /// Drawn radius.
    pub radius: f64,
    /// Fill color.
    pub fill: String,
    /// Label font size in pixels.
    pub font_size: f64,
    /// Whether the label is bold.
    pub bold: bool,
}

/// Link geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum LinkShape {
    /// Straight segment.
    Line {
        /// Source end.
        from: Point,
        /// Target end.
        to: Point,
    },
    /// Horizontal cubic Bézier, as an SVG path.
    Curve {
        /// SVG path data.
        path: String,
    },
}

/// A drawable link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLink {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Geometry.
    pub shape: LinkShape,
    /// Stroke width.
    pub width: f64,
}

/// Everything needed to draw one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Layout mode that produced the scene.
    pub view: ViewType,
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
    /// Layout-to-screen transform; absent for unzoomable views.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub transform: Option<Transform>,
    /// Links, drawn first.
    pub links: Vec<SceneLink>,
    /// Nodes, drawn over links with labels on top.
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// A scene with nothing in it.
    #[must_use]
    pub fn empty(view: ViewType, width: f64, height: f64) -> Self {
        Self { view, width, height, transform: None, links: Vec::new(), nodes: Vec::new() }
    }

    /// Looks up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

/// Straight-line scene for force and circular views. `positions` follows
/// `graph.nodes`; links with unknown endpoints are left out.
#[must_use]
pub fn flat(graph: &Graph, positions: &[Point], view: ViewType, width: f64, height: f64) -> Scene {
    let index = graph.index();
    let links = graph
        .links
        .iter()
        .filter_map(|link| {
            let from = positions[*index.get(link.source.as_str())?];
            let to = positions[*index.get(link.target.as_str())?];
            Some(SceneLink {
                source: link.source.clone(),
                target: link.target.clone(),
                shape: LinkShape::Line { from, to },
                width: f64::from(link.value).sqrt(),
            })
        })
        .collect();
    let nodes = graph
        .nodes
        .iter()
        .zip(positions)
        .map(|(node, p)| SceneNode {
            id: node.id.clone(),
            label: node.name.clone(),
            x: p.x,
            y: p.y,
            radius: node.radius,
            fill: group_color(node.group).to_string(),
            font_size: node.radius / 2.0,
            bold: false,
        })
        .collect();
    Scene { view, width, height, transform: None, links, nodes }
}

/// Tree scene: curved parent-child links and short labels, with the hovered
/// node enlarged and brightened.
#[must_use]
pub fn tree(
    graph: &Graph,
    positions: &[Point],
    edges: &[(usize, usize)],
    hovered: Option<usize>,
    transform: Transform,
    width: f64,
    height: f64,
) -> Scene {
    let links = edges
        .iter()
        .map(|&(parent, child)| SceneLink {
            source: graph.nodes[parent].id.clone(),
            target: graph.nodes[child].id.clone(),
            shape: LinkShape::Curve { path: curve(positions[parent], positions[child]) },
            width: TREE_LINK_WIDTH,
        })
        .collect();
    let nodes = graph
        .nodes
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(i, (node, p))| tree_node(node, *p, hovered == Some(i)))
        .collect();
    Scene { view: ViewType::Tree, width, height, transform: Some(transform), links, nodes }
}

fn tree_node(node: &FileNode, p: Point, hovered: bool) -> SceneNode {
    let color = group_color(node.group);
    let (radius, fill, font_size) = if hovered {
        (node.radius * HOVER_SCALE, brighter(color), (node.radius / 1.5).min(14.0))
    } else {
        (node.radius, color.to_string(), (node.radius / 2.0).min(12.0))
    };
    SceneNode {
        id: node.id.clone(),
        label: short_label(&node.name).to_string(),
        x: p.x,
        y: p.y,
        radius,
        fill,
        font_size,
        bold: hovered,
    }
}

/// Final path segment of a name.
fn short_label(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Cubic curve leaving `from` and entering `to` horizontally.
fn curve(from: Point, to: Point) -> String {
    let mid = (from.x + to.x) / 2.0;
    format!("M{},{} C{},{} {},{} {},{}", from.x, from.y, mid, from.y, mid, to.y, to.x, to.y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DependencyLink;

    fn sample() -> Graph {
        Graph {
            nodes: vec![
                FileNode { id: "src/app.js".into(), name: "src/app.js".into(), group: 1, radius: 20.0 },
                FileNode { id: "lib.js".into(), name: "lib.js".into(), group: 2, radius: 30.0 },
            ],
            links: vec![
                DependencyLink { source: "src/app.js".into(), target: "lib.js".into(), value: 4 },
                DependencyLink { source: "src/app.js".into(), target: "gone.js".into(), value: 1 },
            ],
        }
    }

    #[test]
    fn flat_scene_skips_dangling_links() {
        let positions = [Point::new(1.0, 2.0), Point::new(3.0, 4.0)];
        let scene = flat(&sample(), &positions, ViewType::Circular, 100.0, 100.0);
        assert_eq!(scene.links.len(), 1);
        assert_eq!(
            scene.links[0].shape,
            LinkShape::Line { from: Point::new(1.0, 2.0), to: Point::new(3.0, 4.0) }
        );
        assert!((scene.links[0].width - 2.0).abs() < f64::EPSILON);
        let app = scene.node("src/app.js").unwrap();
        assert_eq!(app.label, "src/app.js");
        assert_eq!(app.fill, "#3f51b5");
        assert!((app.font_size - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn hovered_tree_node_is_enlarged_brightened_and_bold() {
        let positions = [Point::new(0.0, 50.0), Point::new(100.0, 50.0)];
        let scene =
            tree(&sample(), &positions, &[(0, 1)], Some(1), Transform::default(), 100.0, 100.0);

        let app = scene.node("src/app.js").unwrap();
        assert_eq!(app.label, "app.js");
        assert!((app.radius - 20.0).abs() < f64::EPSILON);
        assert!((app.font_size - 10.0).abs() < f64::EPSILON);
        assert!(!app.bold);

        let lib = scene.node("lib.js").unwrap();
        assert!((lib.radius - 36.0).abs() < 1e-9);
        assert!((lib.font_size - 14.0).abs() < f64::EPSILON);
        assert_eq!(lib.fill, brighter("#5c6bc0"));
        assert!(lib.bold);

        assert_eq!(
            scene.links[0].shape,
            LinkShape::Curve { path: "M0,50 C50,50 50,50 100,50".into() }
        );
    }
}
