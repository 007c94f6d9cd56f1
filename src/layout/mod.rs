//! Force-directed placement for a validated [`Graph`].
//!
//! The engine owns every position. Callers read positions back through
//! [`Simulation::position`] or [`Simulation::snapshot`] and influence the layout
//! only through pins.

mod forces;
mod quadtree;

use std::collections::HashMap;

use emath::{Vec2, vec2};
use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::network::Graph;
use forces::{ChargeParams, Spring, accumulate_collisions, apply_charge, apply_springs, center_shift};
use quadtree::QuadTree;

const COLLISION_STRENGTH: f32 = 0.7;
const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationState {
    Idle,
    Running,
    Settled,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub pinned: bool,
}

pub struct Simulation {
    config: LayoutConfig,
    ids: Vec<String>,
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    pins: Vec<Option<Vec2>>,
    radii: Vec<f32>,
    springs: Vec<Spring>,
    collision_deltas: Vec<Vec2>,
    alpha: f32,
    alpha_target: f32,
    state: SimulationState,
}

impl Simulation {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            ids: Vec::new(),
            positions: Vec::new(),
            velocities: Vec::new(),
            pins: Vec::new(),
            radii: Vec::new(),
            springs: Vec::new(),
            collision_deltas: Vec::new(),
            alpha: 0.0,
            alpha_target: 0.0,
            state: SimulationState::Idle,
        }
    }

    /// Discards everything from the previous graph and starts over at full heat.
    pub fn reset(&mut self, graph: &Graph) {
        let count = graph.nodes.len();

        self.ids = graph.nodes.iter().map(|node| node.id.clone()).collect();
        self.radii = graph
            .nodes
            .iter()
            .map(|node| node.radius() + self.config.collision_margin)
            .collect();
        self.positions = (0..count).map(initial_position).collect();
        self.velocities = vec![Vec2::ZERO; count];
        self.pins = vec![None; count];
        self.collision_deltas = vec![Vec2::ZERO; count];

        let index_of: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect();

        let mut endpoints = Vec::with_capacity(graph.edges.len());
        let mut degree = vec![0usize; count];
        for edge in &graph.edges {
            let (Some(&from), Some(&to)) = (
                index_of.get(edge.source.as_str()),
                index_of.get(edge.target.as_str()),
            ) else {
                continue;
            };
            if from == to {
                continue;
            }
            degree[from] += 1;
            degree[to] += 1;
            endpoints.push((from, to, self.config.link_distance(edge.strength)));
        }

        self.springs = endpoints
            .into_iter()
            .map(|(from, to, distance)| {
                let (from_degree, to_degree) = (degree[from] as f32, degree[to] as f32);
                Spring {
                    from,
                    to,
                    distance,
                    strength: 1.0 / from_degree.min(to_degree),
                    bias: from_degree / (from_degree + to_degree),
                }
            })
            .collect();

        self.alpha = 1.0;
        self.alpha_target = 0.0;
        self.state = SimulationState::Running;

        debug!(
            nodes = count,
            springs = self.springs.len(),
            "layout reset"
        );
    }

    pub fn clear(&mut self) {
        *self = Self::new(self.config);
    }

    pub fn tick(&mut self) -> SimulationState {
        match self.state {
            SimulationState::Idle => return SimulationState::Idle,
            SimulationState::Settled if self.alpha_target < self.config.alpha_min => {
                return SimulationState::Settled;
            }
            SimulationState::Settled => self.state = SimulationState::Running,
            SimulationState::Running => {}
        }

        if self.positions.is_empty() {
            self.state = SimulationState::Settled;
            return self.state;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;

        apply_springs(
            &self.springs,
            &self.positions,
            &mut self.velocities,
            self.alpha,
        );
        self.apply_charge_and_collision();
        self.integrate();

        if self.alpha < self.config.alpha_min {
            self.state = SimulationState::Settled;
            debug!("layout settled");
        }
        self.state
    }

    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.state == SimulationState::Running {
            self.tick();
            ticks += 1;
        }
        ticks
    }

    fn apply_charge_and_collision(&mut self) {
        let Some(tree) = QuadTree::build(&self.positions, &self.radii) else {
            return;
        };

        apply_charge(
            &tree,
            &self.positions,
            &mut self.velocities,
            ChargeParams {
                strength: self.config.charge * self.alpha,
                theta_sq: self.config.theta * self.config.theta,
            },
        );

        self.collision_deltas.fill(Vec2::ZERO);
        accumulate_collisions(
            &tree,
            &self.positions,
            &self.radii,
            COLLISION_STRENGTH,
            &mut self.collision_deltas,
        );
        for (velocity, delta) in self.velocities.iter_mut().zip(&self.collision_deltas) {
            *velocity += *delta;
        }
    }

    fn integrate(&mut self) {
        let retain = 1.0 - self.config.velocity_decay;
        for ((position, velocity), pin) in self
            .positions
            .iter_mut()
            .zip(self.velocities.iter_mut())
            .zip(&self.pins)
        {
            if let Some(pin) = pin {
                *position = *pin;
                *velocity = Vec2::ZERO;
            } else {
                *velocity *= retain;
                *position += *velocity;
            }
        }

        let pinned = self.pins.iter().map(Option::is_some).collect::<Vec<_>>();
        let shift = center_shift(
            &self.positions,
            &pinned,
            Vec2::ZERO,
            self.config.center_strength,
        );
        if shift != Vec2::ZERO {
            for (position, is_pinned) in self.positions.iter_mut().zip(pinned) {
                if !is_pinned {
                    *position += shift;
                }
            }
        }
    }

    /// Fixes a node at `position` and reheats the layout so neighbours react.
    pub fn pin(&mut self, index: usize, position: Vec2) -> bool {
        let Some(pin) = self.pins.get_mut(index) else {
            return false;
        };
        *pin = Some(position);
        self.positions[index] = position;
        self.velocities[index] = Vec2::ZERO;
        self.alpha_target = self.config.drag_alpha_target;
        true
    }

    /// Moves an existing pin; ignored for unpinned nodes.
    pub fn move_pin(&mut self, index: usize, position: Vec2) {
        if let Some(pin) = self.pins.get_mut(index)
            && pin.is_some()
        {
            *pin = Some(position);
            self.positions[index] = position;
        }
    }

    pub fn release(&mut self, index: usize) {
        if let Some(pin) = self.pins.get_mut(index) {
            *pin = None;
        }
        if self.pins.iter().all(Option::is_none) {
            self.alpha_target = 0.0;
        }
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.positions.get(index).copied()
    }

    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn is_pinned(&self, index: usize) -> bool {
        self.pins.get(index).is_some_and(Option::is_some)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|candidate| candidate == id)
    }

    pub fn snapshot(&self) -> Vec<NodePosition> {
        self.ids
            .iter()
            .zip(&self.positions)
            .zip(&self.pins)
            .map(|((id, position), pin)| NodePosition {
                id: id.clone(),
                x: position.x,
                y: position.y,
                pinned: pin.is_some(),
            })
            .collect()
    }
}

/// Phyllotaxis spiral; spreads nodes evenly without randomness.
fn initial_position(index: usize) -> Vec2 {
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    vec2(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::network::{Edge, EdgeKind, LandClass, Node};

    fn node(id: &str, score: u8) -> Node {
        Node {
            id: id.to_owned(),
            label: format!("Project {id}"),
            country: String::new(),
            status: String::new(),
            sector: String::new(),
            land_intensity_score: Some(score),
            land_classification: LandClass::from_score(score),
            justification: String::new(),
        }
    }

    fn edge(source: &str, target: &str, strength: u8) -> Edge {
        Edge {
            source: source.to_owned(),
            target: target.to_owned(),
            strength,
            kind: EdgeKind::Thematic,
            description: String::new(),
        }
    }

    fn sample_graph() -> Graph {
        Graph {
            nodes: vec![node("a", 9), node("b", 5), node("c", 2), node("d", 7)],
            edges: vec![edge("a", "b", 8), edge("b", "c", 3), edge("c", "d", 6)],
            ..Graph::default()
        }
    }

    #[test]
    fn new_simulation_is_idle_and_ticks_do_nothing() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        assert_eq!(simulation.tick(), SimulationState::Idle);
        assert!(simulation.is_empty());
    }

    #[test]
    fn empty_graph_settles_on_first_tick() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&Graph::default());

        assert_eq!(simulation.state(), SimulationState::Running);
        assert_eq!(simulation.tick(), SimulationState::Settled);
    }

    #[test]
    fn layout_settles_and_then_stays_put() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());

        let ticks = simulation.run_until_settled(1_000);
        assert!(ticks < 1_000);
        assert_eq!(simulation.state(), SimulationState::Settled);

        let settled = simulation.positions().to_vec();
        assert_eq!(simulation.tick(), SimulationState::Settled);
        assert_eq!(simulation.positions(), settled.as_slice());
        assert!(settled.iter().all(|position| position.x.is_finite() && position.y.is_finite()));
    }

    #[test]
    fn settled_layout_keeps_nodes_apart() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());
        simulation.run_until_settled(1_000);

        let positions = simulation.positions();
        for (index, first) in positions.iter().enumerate() {
            for second in &positions[index + 1..] {
                assert!((*first - *second).length() > 10.0);
            }
        }
    }

    #[test]
    fn pinned_node_holds_while_others_move() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());
        for _ in 0..5 {
            simulation.tick();
        }

        let pin = vec2(120.0, -40.0);
        assert!(simulation.pin(0, pin));
        let before = simulation.positions().to_vec();

        for _ in 0..10 {
            assert_eq!(simulation.tick(), SimulationState::Running);
            assert_eq!(simulation.position(0), Some(pin));
        }
        assert!(simulation.is_pinned(0));
        assert!((1..4).any(|index| simulation.position(index) != Some(before[index])));

        simulation.release(0);
        simulation.tick();
        assert!(!simulation.is_pinned(0));
        assert_ne!(simulation.position(0), Some(pin));
    }

    #[test]
    fn pin_reheats_a_settled_layout() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());
        simulation.run_until_settled(1_000);

        simulation.pin(2, vec2(300.0, 300.0));
        assert_eq!(simulation.state(), SimulationState::Settled);
        assert_eq!(simulation.tick(), SimulationState::Running);
        assert!(simulation.alpha() > LayoutConfig::default().alpha_min);
    }

    #[test]
    fn dragging_moves_the_pin() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());

        simulation.move_pin(1, vec2(5.0, 5.0));
        assert!(!simulation.is_pinned(1));

        simulation.pin(1, vec2(0.0, 0.0));
        simulation.move_pin(1, vec2(80.0, 10.0));
        simulation.tick();
        assert_eq!(simulation.position(1), Some(vec2(80.0, 10.0)));
        assert!(!simulation.pin(99, Vec2::ZERO));
    }

    #[test]
    fn reset_discards_previous_positions() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());
        simulation.pin(0, vec2(500.0, 500.0));
        simulation.run_until_settled(50);

        let other = Graph {
            nodes: vec![node("x", 4), node("y", 4)],
            ..Graph::default()
        };
        simulation.reset(&other);

        assert_eq!(simulation.state(), SimulationState::Running);
        assert_eq!(simulation.alpha(), 1.0);
        assert_eq!(simulation.len(), 2);
        assert!(!simulation.is_pinned(0));
        assert_eq!(simulation.position(0), Some(initial_position(0)));
        assert_eq!(simulation.index_of("a"), None);
        assert_eq!(simulation.index_of("y"), Some(1));
    }

    #[test]
    fn snapshot_reports_ids_and_pins() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());
        simulation.pin(3, vec2(1.0, 2.0));

        let snapshot = simulation.snapshot();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(
            snapshot[3],
            NodePosition {
                id: "d".to_owned(),
                x: 1.0,
                y: 2.0,
                pinned: true,
            }
        );
        assert!(!snapshot[0].pinned);
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut simulation = Simulation::new(LayoutConfig::default());
        simulation.reset(&sample_graph());
        simulation.clear();

        assert_eq!(simulation.state(), SimulationState::Idle);
        assert!(simulation.snapshot().is_empty());
    }
}
