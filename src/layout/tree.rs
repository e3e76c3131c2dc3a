//! Spanning-tree construction and tidy tree layout.
//!
//! [`Hierarchy::build`] turns a general graph into a tree that contains
//! every node exactly once. [`layout`] positions it with the
//! Buchheim-Jünger-Leipert refinement of Reingold-Tilford, the algorithm
//! behind `d3.tree`: siblings one unit apart, cousins two, parents centered
//! over their children, all in linear time.

use tracing::debug;

use super::Point;
use crate::graph::Graph;

/// Breadth given to each node when sizing the canvas.
const NODE_BREADTH: f64 = 40.0;
/// Depth given to each node when sizing the canvas.
const NODE_DEPTH: f64 = 80.0;
/// Breadth trimmed from the canvas for margins.
const BREADTH_MARGIN: f64 = 100.0;
/// Depth trimmed from the canvas for margins.
const DEPTH_MARGIN: f64 = 200.0;

/// A rooted spanning tree over graph node indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hierarchy {
    /// Index of the root node.
    pub root: usize,
    /// Children of each node, in attachment order.
    pub children: Vec<Vec<usize>>,
    /// Parent of each node; `None` for the root.
    pub parent: Vec<Option<usize>>,
    /// Distance from the root.
    pub depth: Vec<usize>,
}

impl Hierarchy {
    /// Builds the tree, or `None` for an empty graph.
    ///
    /// The root is the node with the most outgoing links, the earliest in
    /// input order on ties. A depth-first walk follows outgoing links in
    /// link order and attaches each node the first time it is reached.
    /// Nodes the walk never reaches hang directly off the root in input
    /// order. Links with unknown endpoints are ignored.
    #[must_use]
    pub fn build(graph: &Graph) -> Option<Self> {
        let n = graph.nodes.len();
        if n == 0 {
            return None;
        }
        let index = graph.index();
        let mut outgoing = vec![Vec::new(); n];
        for link in &graph.links {
            if let (Some(&s), Some(&t)) = (index.get(link.source.as_str()), index.get(link.target.as_str())) {
                outgoing[s].push(t);
            }
        }

        let mut root = 0;
        for (i, targets) in outgoing.iter().enumerate() {
            if targets.len() > outgoing[root].len() {
                root = i;
            }
        }

        let mut children = vec![Vec::new(); n];
        let mut parent = vec![None; n];
        let mut visited = vec![false; n];
        visited[root] = true;
        let mut stack = vec![(root, 0_usize)];
        while let Some(top) = stack.last_mut() {
            let (node, cursor) = *top;
            let Some(&target) = outgoing[node].get(cursor) else {
                stack.pop();
                continue;
            };
            top.1 += 1;
            if !visited[target] {
                visited[target] = true;
                children[node].push(target);
                parent[target] = Some(node);
                stack.push((target, 0));
            }
        }

        let unreached: Vec<usize> = (0..n).filter(|&i| !visited[i]).collect();
        if !unreached.is_empty() {
            debug!(count = unreached.len(), "attaching unreachable nodes under the tree root");
        }
        for i in unreached {
            children[root].push(i);
            parent[i] = Some(root);
        }

        let mut depth = vec![0; n];
        for node in preorder(root, &children) {
            for &child in &children[node] {
                depth[child] = depth[node] + 1;
            }
        }
        Some(Self { root, children, parent, depth })
    }

    /// Number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Always `false`: a hierarchy has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Parent-child pairs in preorder.
    #[must_use]
    pub fn edges(&self) -> Vec<(usize, usize)> {
        preorder(self.root, &self.children)
            .into_iter()
            .flat_map(|p| self.children[p].iter().map(move |&c| (p, c)))
            .collect()
    }
}

/// Canvas used for a tree of `count` nodes: the viewport, grown by
/// 80 pixels of depth and 40 of breadth per node.
#[must_use]
pub fn canvas(count: usize, width: f64, height: f64) -> (f64, f64) {
    #[allow(clippy::cast_precision_loss)]
    let count = count as f64;
    (width.max(count * NODE_DEPTH), height.max(count * NODE_BREADTH))
}

/// Screen positions for every node: depth runs left to right across the
/// canvas, breadth top to bottom.
#[must_use]
pub fn layout(tree: &Hierarchy, width: f64, height: f64) -> Vec<Point> {
    let (canvas_width, canvas_height) = canvas(tree.len(), width, height);
    let breadth = tidy(tree, canvas_height - BREADTH_MARGIN, canvas_width - DEPTH_MARGIN);
    breadth.into_iter().map(|(b, d)| Point::new(d, b)).collect()
}

/// Tidy layout scaled to `dx` of breadth and `dy` of depth. Returns
/// `(breadth, depth)` per node.
fn tidy(tree: &Hierarchy, dx: f64, dy: f64) -> Vec<(f64, f64)> {
    let mut walker = Walker::new(tree);
    for v in postorder(tree.root, &tree.children) {
        walker.first_walk(v);
    }
    let virtual_root = walker.virtual_root;
    walker.modifier[virtual_root] = -walker.prelim[tree.root];
    let order = preorder(tree.root, &tree.children);
    for &v in &order {
        walker.second_walk(v);
    }

    let x = &walker.x;
    let (mut left, mut right, mut bottom) = (tree.root, tree.root, 0);
    for &v in &order {
        if x[v] < x[left] {
            left = v;
        }
        if x[v] > x[right] {
            right = v;
        }
        bottom = bottom.max(tree.depth[v]);
    }
    let s = if left == right { 1.0 } else { walker.separation(left, right) / 2.0 };
    let tx = s - x[left];
    let kx = dx / (x[right] + s + tx);
    #[allow(clippy::cast_precision_loss)]
    let ky = dy / bottom.max(1) as f64;
    (0..tree.len())
        .map(|v| {
            #[allow(clippy::cast_precision_loss)]
            let depth = tree.depth[v] as f64;
            ((x[v] + tx) * kx, depth * ky)
        })
        .collect()
}

/// Per-node working state of the tidy layout. Index `virtual_root` is an
/// extra parent above the real root.
struct Walker {
    virtual_root: usize,
    children: Vec<Vec<usize>>,
    parent: Vec<usize>,
    number: Vec<usize>,
    ancestor: Vec<usize>,
    default_ancestor: Vec<Option<usize>>,
    thread: Vec<Option<usize>>,
    prelim: Vec<f64>,
    modifier: Vec<f64>,
    change: Vec<f64>,
    shift: Vec<f64>,
    x: Vec<f64>,
}

impl Walker {
    fn new(tree: &Hierarchy) -> Self {
        let n = tree.len();
        let mut children = tree.children.clone();
        children.push(vec![tree.root]);
        let mut parent: Vec<usize> = tree.parent.iter().map(|p| p.unwrap_or(n)).collect();
        parent.push(n);
        let mut number = vec![0; n + 1];
        for kids in &children {
            for (i, &kid) in kids.iter().enumerate() {
                number[kid] = i;
            }
        }
        Self {
            virtual_root: n,
            children,
            parent,
            number,
            ancestor: (0..=n).collect(),
            default_ancestor: vec![None; n + 1],
            thread: vec![None; n + 1],
            prelim: vec![0.0; n + 1],
            modifier: vec![0.0; n + 1],
            change: vec![0.0; n + 1],
            shift: vec![0.0; n + 1],
            x: vec![0.0; n],
        }
    }

    fn separation(&self, a: usize, b: usize) -> f64 {
        if self.parent[a] == self.parent[b] {
            1.0
        } else {
            2.0
        }
    }

    fn next_left(&self, v: usize) -> Option<usize> {
        self.children[v].first().copied().or(self.thread[v])
    }

    fn next_right(&self, v: usize) -> Option<usize> {
        self.children[v].last().copied().or(self.thread[v])
    }

    fn first_walk(&mut self, v: usize) {
        let p = self.parent[v];
        let left_sibling = (self.number[v] > 0).then(|| self.children[p][self.number[v] - 1]);
        if let (Some(&first), Some(&last)) = (self.children[v].first(), self.children[v].last()) {
            self.execute_shifts(v);
            let midpoint = (self.prelim[first] + self.prelim[last]) / 2.0;
            if let Some(w) = left_sibling {
                self.prelim[v] = self.prelim[w] + self.separation(v, w);
                self.modifier[v] = self.prelim[v] - midpoint;
            } else {
                self.prelim[v] = midpoint;
            }
        } else if let Some(w) = left_sibling {
            self.prelim[v] = self.prelim[w] + self.separation(v, w);
        }
        let fallback = self.default_ancestor[p].unwrap_or(self.children[p][0]);
        self.default_ancestor[p] = Some(self.apportion(v, left_sibling, fallback));
    }

    fn second_walk(&mut self, v: usize) {
        let p = self.parent[v];
        self.x[v] = self.prelim[v] + self.modifier[p];
        self.modifier[v] += self.modifier[p];
    }

    fn apportion(&mut self, v: usize, left_sibling: Option<usize>, mut ancestor: usize) -> usize {
        let Some(w) = left_sibling else {
            return ancestor;
        };
        // Inner/outer contours of the right (p) and left (m) subtrees.
        let (mut vip, mut vop, mut vim) = (v, v, w);
        let mut vom = self.children[self.parent[v]][0];
        let (mut sip, mut sop) = (self.modifier[vip], self.modifier[vop]);
        let (mut sim, mut som) = (self.modifier[vim], self.modifier[vom]);
        loop {
            match (self.next_right(vim), self.next_left(vip)) {
                (Some(im), Some(ip)) => {
                    vim = im;
                    vip = ip;
                    vom = self.next_left(vom).unwrap_or(vom);
                    vop = self.next_right(vop).unwrap_or(vop);
                    self.ancestor[vop] = v;
                    let shift =
                        self.prelim[vim] + sim - self.prelim[vip] - sip + self.separation(vim, vip);
                    if shift > 0.0 {
                        let wm = self.next_ancestor(vim, v, ancestor);
                        self.move_subtree(wm, v, shift);
                        sip += shift;
                        sop += shift;
                    }
                    sim += self.modifier[vim];
                    sip += self.modifier[vip];
                    som += self.modifier[vom];
                    sop += self.modifier[vop];
                }
                (im, ip) => {
                    if let Some(im) = im.filter(|_| self.next_right(vop).is_none()) {
                        self.thread[vop] = Some(im);
                        self.modifier[vop] += sim - sop;
                    }
                    if let Some(ip) = ip.filter(|_| self.next_left(vom).is_none()) {
                        self.thread[vom] = Some(ip);
                        self.modifier[vom] += sip - som;
                        ancestor = v;
                    }
                    return ancestor;
                }
            }
        }
    }

    fn next_ancestor(&self, vim: usize, v: usize, ancestor: usize) -> usize {
        let candidate = self.ancestor[vim];
        if self.parent[candidate] == self.parent[v] {
            candidate
        } else {
            ancestor
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn move_subtree(&mut self, wm: usize, wp: usize, shift: f64) {
        let change = shift / (self.number[wp] as f64 - self.number[wm] as f64);
        self.change[wp] -= change;
        self.shift[wp] += shift;
        self.change[wm] += change;
        self.prelim[wp] += shift;
        self.modifier[wp] += shift;
    }

    fn execute_shifts(&mut self, v: usize) {
        let (mut shift, mut change) = (0.0, 0.0);
        for i in (0..self.children[v].len()).rev() {
            let w = self.children[v][i];
            self.prelim[w] += shift;
            self.modifier[w] += shift;
            change += self.change[w];
            shift += self.shift[w] + change;
        }
    }
}

/// Nodes with each parent before its children, children left to right.
fn preorder(root: usize, children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        order.push(v);
        stack.extend(children[v].iter().rev());
    }
    order
}

/// Nodes with children (left to right) before their parent.
fn postorder(root: usize, children: &[Vec<usize>]) -> Vec<usize> {
    let mut order = Vec::with_capacity(children.len());
    let mut stack = vec![root];
    while let Some(v) = stack.pop() {
        order.push(v);
        stack.extend(children[v].iter());
    }
    order.reverse();
    order
}
