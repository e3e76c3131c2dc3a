//! Force-directed simulation.
//!
//! A velocity Verlet integrator in the style of d3-force: every tick decays
//! `alpha` toward `alpha_target`, applies link, many-body and centering
//! forces in that order, damps velocities, moves free bodies, and clamps
//! every body inside the viewport. The simulation owns its position table;
//! nothing aliases the graph's node records.

use std::f64::consts::PI;

use tracing::{debug, warn};

use super::Point;
use crate::graph::Graph;

/// Rest length of a link of value 1.
pub const LINK_DISTANCE: f64 = 100.0;
/// Many-body charge; negative repels.
pub const CHARGE_STRENGTH: f64 = -100.0;
/// Simulation stops once alpha falls below this.
pub const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is dragged.
pub const DRAG_ALPHA_TARGET: f64 = 0.3;
/// Fraction of velocity kept each tick.
const VELOCITY_RETAINED: f64 = 0.6;
/// Spacing of the initial phyllotaxis spiral.
const INITIAL_RADIUS: f64 = 10.0;

/// One particle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Body {
    /// Current position.
    pub position: Point,
    /// Velocity carried into the next tick.
    pub vx: f64,
    /// Velocity carried into the next tick.
    pub vy: f64,
    /// Pinned position, overriding integration while set.
    pub fixed: Option<Point>,
    /// Radius used for clamping.
    pub radius: f64,
}

#[derive(Debug, Clone, Copy)]
struct Spring {
    source: usize,
    target: usize,
    distance: f64,
    strength: f64,
    bias: f64,
}

/// Deterministic linear congruential generator used to separate
/// coincident bodies.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 1 << 32;

    #[allow(clippy::cast_precision_loss)]
    fn next(&mut self) -> f64 {
        self.0 = (Self::A * self.0 + Self::C) % Self::M;
        self.0 as f64 / Self::M as f64
    }

    fn jiggle(&mut self) -> f64 {
        (self.next() - 0.5) * 1e-6
    }
}

/// A running or stopped force simulation over one graph.
#[derive(Debug, Clone)]
pub struct Simulation {
    bodies: Vec<Body>,
    springs: Vec<Spring>,
    width: f64,
    height: f64,
    alpha: f64,
    alpha_target: f64,
    alpha_decay: f64,
    rng: Lcg,
    running: bool,
}

impl Simulation {
    /// Builds a simulation for `graph` inside a `width` x `height` viewport.
    ///
    /// Bodies start on a spiral around the viewport center. Links whose
    /// endpoints are unknown are skipped.
    #[must_use]
    pub fn new(graph: &Graph, width: f64, height: f64) -> Self {
        let center = Point::new(width / 2.0, height / 2.0);
        let golden_angle = PI * (3.0 - 5.0_f64.sqrt());
        let bodies = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                #[allow(clippy::cast_precision_loss)]
                let i = i as f64;
                let r = INITIAL_RADIUS * (0.5 + i).sqrt();
                let angle = i * golden_angle;
                let position = clamp(
                    Point::new(center.x + r * angle.cos(), center.y + r * angle.sin()),
                    node.radius,
                    width,
                    height,
                );
                Body { position, radius: node.radius, ..Body::default() }
            })
            .collect();

        let index = graph.index();
        let mut endpoints = Vec::with_capacity(graph.links.len());
        let mut degree = vec![0_u32; graph.nodes.len()];
        for link in &graph.links {
            let (Some(&source), Some(&target)) =
                (index.get(link.source.as_str()), index.get(link.target.as_str()))
            else {
                warn!(source = %link.source, target = %link.target, "skipping link with unknown endpoint");
                continue;
            };
            degree[source] += 1;
            degree[target] += 1;
            endpoints.push((source, target, link.value.max(1)));
        }
        let springs = endpoints
            .into_iter()
            .map(|(source, target, value)| {
                let (ds, dt) = (f64::from(degree[source]), f64::from(degree[target]));
                Spring {
                    source,
                    target,
                    distance: LINK_DISTANCE / f64::from(value).sqrt(),
                    strength: 1.0 / ds.min(dt),
                    bias: ds / (ds + dt),
                }
            })
            .collect();

        debug!(nodes = graph.nodes.len(), "force simulation created");
        Self {
            bodies,
            springs,
            width,
            height,
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / 300.0),
            rng: Lcg(1),
            running: true,
        }
    }

    /// Current bodies, in graph node order.
    #[must_use]
    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    /// Current residual energy.
    #[must_use]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Returns `true` until the simulation settles or is stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Sets the value alpha decays toward.
    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target;
    }

    /// Resumes ticking after a stop or settle.
    pub fn restart(&mut self) {
        self.running = true;
    }

    /// Halts the simulation; [`Simulation::step`] does nothing until restarted.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Pins body `i` at `at`.
    pub fn pin(&mut self, i: usize, at: Point) {
        if let Some(body) = self.bodies.get_mut(i) {
            body.fixed = Some(at);
        }
    }

    /// Releases a pinned body back to the simulation.
    pub fn unpin(&mut self, i: usize) {
        if let Some(body) = self.bodies.get_mut(i) {
            body.fixed = None;
        }
    }

    /// One animation frame: ticks if running, then stops once settled.
    /// Returns whether the simulation is still running.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        if self.alpha < ALPHA_MIN {
            self.running = false;
            debug!("force simulation settled");
        }
        self.running
    }

    /// Advances the simulation by one tick regardless of the running state.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.apply_links();
        self.apply_charge();
        self.apply_center();

        for body in &mut self.bodies {
            if let Some(fixed) = body.fixed {
                body.position = fixed;
                body.vx = 0.0;
                body.vy = 0.0;
            } else {
                body.vx *= VELOCITY_RETAINED;
                body.vy *= VELOCITY_RETAINED;
                body.position.x += body.vx;
                body.position.y += body.vy;
            }
            body.position = clamp(body.position, body.radius, self.width, self.height);
        }
    }

    fn apply_links(&mut self) {
        for spring in &self.springs {
            let (s, t) = (self.bodies[spring.source], self.bodies[spring.target]);
            let mut x = t.position.x + t.vx - s.position.x - s.vx;
            let mut y = t.position.y + t.vy - s.position.y - s.vy;
            if x == 0.0 {
                x = self.rng.jiggle();
            }
            if y == 0.0 {
                y = self.rng.jiggle();
            }
            let length = x.hypot(y);
            let l = (length - spring.distance) / length * self.alpha * spring.strength;
            let (x, y) = (x * l, y * l);

            let target = &mut self.bodies[spring.target];
            target.vx -= x * spring.bias;
            target.vy -= y * spring.bias;
            let source = &mut self.bodies[spring.source];
            source.vx += x * (1.0 - spring.bias);
            source.vy += y * (1.0 - spring.bias);
        }
    }

    fn apply_charge(&mut self) {
        let weight = CHARGE_STRENGTH * self.alpha;
        for i in 0..self.bodies.len() {
            let here = self.bodies[i].position;
            let (mut dvx, mut dvy) = (0.0, 0.0);
            for j in 0..self.bodies.len() {
                if i == j {
                    continue;
                }
                let there = self.bodies[j].position;
                let mut x = there.x - here.x;
                let mut y = there.y - here.y;
                if x == 0.0 {
                    x = self.rng.jiggle();
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                }
                let mut l = x * x + y * y;
                if l < 1.0 {
                    l = l.sqrt();
                }
                dvx += x * weight / l;
                dvy += y * weight / l;
            }
            self.bodies[i].vx += dvx;
            self.bodies[i].vy += dvy;
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn apply_center(&mut self) {
        if self.bodies.is_empty() {
            return;
        }
        let n = self.bodies.len() as f64;
        let (sx, sy) = self
            .bodies
            .iter()
            .fold((0.0, 0.0), |(sx, sy), b| (sx + b.position.x, sy + b.position.y));
        let dx = sx / n - self.width / 2.0;
        let dy = sy / n - self.height / 2.0;
        for body in &mut self.bodies {
            body.position.x -= dx;
            body.position.y -= dy;
        }
    }
}

/// Keeps a circle of radius `r` inside `[0, width] x [0, height]`. When the
/// viewport is narrower than the circle, the circle sits at `r`.
fn clamp(p: Point, r: f64, width: f64, height: f64) -> Point {
    Point::new(r.max((width - r).min(p.x)), r.max((height - r).min(p.y)))
}
