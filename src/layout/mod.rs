//! Layout engine: screen-space positions and an interactive scene for a
//! canonical [`Graph`](crate::graph::Graph).
//!
//! [`GraphView`] is the single entry point. It runs one of three mutually
//! exclusive modes; switching modes or data discards all derived state and
//! rebuilds from the graph.
//!
//! - **force**: d3-style velocity Verlet simulation with link, many-body and
//!   centering forces, advanced one tick per animation frame.
//! - **tree**: spanning tree rooted at the node with the most outgoing links,
//!   laid out with the Reingold-Tilford/Buchheim algorithm under a pan/zoom
//!   transform.
//! - **circular**: static ring in input order.

pub mod circular;
pub mod color;
pub mod force;
pub mod scene;
pub mod svg;
pub mod tree;
pub mod view;
pub mod zoom;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use scene::Scene;
pub use view::GraphView;

/// Layout mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ViewType {
    /// Force-directed simulation.
    Force,
    /// Hierarchical tree.
    Tree,
    /// Fixed ring.
    Circular,
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Force => "force",
            Self::Tree => "tree",
            Self::Circular => "circular",
        })
    }
}

/// A position in layout space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}
