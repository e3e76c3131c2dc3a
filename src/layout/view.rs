//! The mounted view: one graph, one viewport, one active layout mode.
//!
//! Every transition (new data, new mode) is a full rebuild from the
//! canonical graph; no positions survive it. The host drives animation by
//! calling [`GraphView::frame`] once per frame until it returns `false`, and
//! feeds pointer events in screen coordinates.

use tracing::{debug, info};

use super::force::{Simulation, DRAG_ALPHA_TARGET};
use super::scene::{self, Scene};
use super::tree::{self, Hierarchy};
use super::zoom::{Bounds, Transform};
use super::{circular, Point, ViewType};
use crate::graph::Graph;

/// Upper bound on frames for [`GraphView::settle`] without an explicit limit.
const MAX_SETTLE_FRAMES: usize = 10_000;

enum Mode {
    Force { sim: Simulation, dragging: Option<usize> },
    Tree(TreeView),
    Circular(Vec<Point>),
}

struct TreeView {
    positions: Vec<Point>,
    edges: Vec<(usize, usize)>,
    transform: Transform,
    /// Lowest wheel-zoom scale; below `MIN_SCALE` when the fit needed it.
    zoom_floor: f64,
    hovered: Option<usize>,
    pan_from: Option<Point>,
}

/// An interactive layout of one graph.
pub struct GraphView {
    graph: Graph,
    width: f64,
    height: f64,
    view: ViewType,
    /// `None` for an empty graph, or after [`GraphView::unmount`].
    mode: Option<Mode>,
}

impl GraphView {
    /// Lays out `graph` in a `width` x `height` viewport. An empty graph
    /// mounts a view that draws nothing and ignores input.
    #[must_use]
    pub fn mount(graph: Graph, width: f64, height: f64, view: ViewType) -> Self {
        let mut this = Self { graph, width, height, view, mode: None };
        this.rebuild();
        this
    }

    /// Replaces the data, keeping the mode.
    pub fn update(&mut self, graph: Graph) {
        self.graph = graph;
        self.rebuild();
    }

    /// Switches the layout mode.
    pub fn set_view(&mut self, view: ViewType) {
        self.view = view;
        self.rebuild();
    }

    /// Current mode.
    #[must_use]
    pub fn view(&self) -> ViewType {
        self.view
    }

    /// Halts any running simulation and drops all layout state.
    pub fn unmount(&mut self) {
        self.stop();
        self.mode = None;
    }

    /// Halts the force simulation, if any. Positions stay where they are.
    pub fn stop(&mut self) {
        if let Some(Mode::Force { sim, .. }) = &mut self.mode {
            sim.stop();
            debug!("force simulation stopped");
        }
    }

    /// Returns `true` while the view needs more frames.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        matches!(&self.mode, Some(Mode::Force { sim, .. }) if sim.is_running())
    }

    /// Advances one animation frame. Returns whether another frame is needed.
    pub fn frame(&mut self) -> bool {
        match &mut self.mode {
            Some(Mode::Force { sim, .. }) => sim.step(),
            _ => false,
        }
    }

    /// Runs frames until the view stops animating or `limit` frames have
    /// run. Returns the number of frames run.
    pub fn settle(&mut self, limit: Option<usize>) -> usize {
        let limit = limit.unwrap_or(MAX_SETTLE_FRAMES);
        let mut frames = 0;
        while frames < limit && self.is_animating() {
            self.frame();
            frames += 1;
        }
        debug!(frames, "layout settled");
        frames
    }

    /// The current drawable scene.
    #[must_use]
    pub fn scene(&self) -> Scene {
        match &self.mode {
            None => Scene::empty(self.view, self.width, self.height),
            Some(Mode::Force { sim, .. }) => {
                let positions: Vec<Point> = sim.bodies().iter().map(|b| b.position).collect();
                scene::flat(&self.graph, &positions, ViewType::Force, self.width, self.height)
            }
            Some(Mode::Circular(positions)) => {
                scene::flat(&self.graph, positions, ViewType::Circular, self.width, self.height)
            }
            Some(Mode::Tree(t)) => scene::tree(
                &self.graph,
                &t.positions,
                &t.edges,
                t.hovered,
                t.transform,
                self.width,
                self.height,
            ),
        }
    }

    /// Pointer pressed at a screen position. Starts a node drag in force
    /// mode, or a pan in tree mode.
    pub fn pointer_down(&mut self, at: Point) {
        let graph = &self.graph;
        match &mut self.mode {
            Some(Mode::Force { sim, dragging }) => {
                let hit = hit_test(graph, sim.bodies().iter().map(|b| b.position), at);
                if let Some(i) = hit {
                    if dragging.is_none() {
                        sim.set_alpha_target(DRAG_ALPHA_TARGET);
                        sim.restart();
                    }
                    let grabbed = sim.bodies()[i].position;
                    sim.pin(i, grabbed);
                    *dragging = Some(i);
                }
            }
            Some(Mode::Tree(t)) => t.pan_from = Some(at),
            _ => {}
        }
    }

    /// Pointer moved to a screen position: drags, pans, or updates hover.
    pub fn pointer_move(&mut self, at: Point) {
        let graph = &self.graph;
        match &mut self.mode {
            Some(Mode::Force { sim, dragging: Some(i) }) => sim.pin(*i, at),
            Some(Mode::Tree(t)) => {
                if let Some(from) = t.pan_from {
                    t.transform = t.transform.pan(at.x - from.x, at.y - from.y);
                    t.pan_from = Some(at);
                } else {
                    let local = t.transform.invert(at);
                    t.hovered = hit_test(graph, t.positions.iter().copied(), local);
                }
            }
            _ => {}
        }
    }

    /// Pointer released: ends a drag or pan.
    pub fn pointer_up(&mut self) {
        match &mut self.mode {
            Some(Mode::Force { sim, dragging }) => {
                if let Some(i) = dragging.take() {
                    sim.set_alpha_target(0.0);
                    sim.unpin(i);
                }
            }
            Some(Mode::Tree(t)) => t.pan_from = None,
            _ => {}
        }
    }

    /// Pointer left the canvas: clears hover and ends a pan. A node drag
    /// continues until [`GraphView::pointer_up`].
    pub fn pointer_leave(&mut self) {
        if let Some(Mode::Tree(t)) = &mut self.mode {
            t.hovered = None;
            t.pan_from = None;
        }
    }

    /// Wheel scrolled over a screen position; zooms the tree about it.
    pub fn wheel(&mut self, at: Point, delta_y: f64) {
        if let Some(Mode::Tree(t)) = &mut self.mode {
            t.transform = t.transform.wheel(at, delta_y, t.zoom_floor);
        }
    }

    fn rebuild(&mut self) {
        self.stop();
        self.mode = None;
        if self.graph.is_empty() {
            debug!(view = %self.view, "empty graph, nothing to lay out");
            return;
        }
        info!(
            view = %self.view,
            nodes = self.graph.nodes.len(),
            links = self.graph.links.len(),
            "building layout"
        );
        let (width, height) = (self.width, self.height);
        self.mode = match self.view {
            ViewType::Force => {
                Some(Mode::Force { sim: Simulation::new(&self.graph, width, height), dragging: None })
            }
            ViewType::Circular => {
                Some(Mode::Circular(circular::positions(self.graph.nodes.len(), width, height)))
            }
            ViewType::Tree => Hierarchy::build(&self.graph).map(|hierarchy| {
                let positions = tree::layout(&hierarchy, width, height);
                let circles = positions.iter().zip(&self.graph.nodes).map(|(p, n)| (*p, n.radius));
                let transform = Bounds::of_circles(circles)
                    .map_or_else(Transform::default, |b| Transform::fit(b, width, height));
                Mode::Tree(TreeView {
                    positions,
                    edges: hierarchy.edges(),
                    transform,
                    zoom_floor: transform.zoom_floor(),
                    hovered: None,
                    pan_from: None,
                })
            }),
        };
    }
}

/// Topmost node whose circle contains `at`. Later nodes draw on top.
fn hit_test(graph: &Graph, positions: impl Iterator<Item = Point>, at: Point) -> Option<usize> {
    let mut hit = None;
    for (i, (p, node)) in positions.zip(&graph.nodes).enumerate() {
        if p.distance(at) <= node.radius {
            hit = Some(i);
        }
    }
    hit
}
