//! Explicit view context: one [`NetworkView`] owns the graph, its layout and the
//! current emphasis mode, and every user action goes through it.

mod details;
mod emphasis;

use emath::Vec2;
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::layout::{NodePosition, Simulation, SimulationState};
use crate::network::{Graph, LandClass, ValidationReport};

pub use details::{
    ClusterDetail, ClusterMember, ClusterSummary, Connection, DetailView, HoverCard, NodeDetail,
    Overview,
};
pub use emphasis::{EDGE_REST_OPACITY, Emphasis, EmphasisMode, NodeEmphasis, compute_emphasis};

#[derive(Clone, Debug, PartialEq, Eq)]
enum DetailTarget {
    Overview,
    Node(String),
    Cluster(usize),
}

/// Everything a renderer outside this process needs, in one document.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutExport<'a> {
    pub graph: &'a Graph,
    pub positions: Vec<NodePosition>,
    pub emphasis: &'a Emphasis,
    pub state: SimulationState,
    pub diagnostics: ValidationReport,
}

pub struct NetworkView {
    graph: Graph,
    simulation: Simulation,
    mode: EmphasisMode,
    emphasis: Emphasis,
    detail: DetailTarget,
    dragging: Option<usize>,
}

impl NetworkView {
    pub fn new(graph: Graph, config: LayoutConfig) -> Self {
        let mut simulation = Simulation::new(config);
        simulation.reset(&graph);
        let emphasis = Emphasis::rest(&graph);
        Self {
            graph,
            simulation,
            mode: EmphasisMode::None,
            emphasis,
            detail: DetailTarget::Overview,
            dragging: None,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn mode(&self) -> EmphasisMode {
        self.mode
    }

    pub fn emphasis(&self) -> &Emphasis {
        &self.emphasis
    }

    fn set_mode(&mut self, mode: EmphasisMode) {
        self.mode = mode;
        self.emphasis = compute_emphasis(&self.graph, mode);
        debug!(?mode, "emphasis changed");
    }

    pub fn hover(&self, id: &str) -> Option<HoverCard> {
        details::hover_card(&self.graph, id)
    }

    /// Shows a node in the details panel. Emphasis is left alone.
    pub fn select_node(&mut self, id: &str) -> Option<NodeDetail> {
        let detail = details::node_detail(&self.graph, id)?;
        self.detail = DetailTarget::Node(id.to_owned());
        Some(detail)
    }

    /// `None` clears emphasis.
    pub fn filter_by_class(&mut self, class: Option<LandClass>) {
        match class {
            Some(class) => self.set_mode(EmphasisMode::Filter(class)),
            None => self.set_mode(EmphasisMode::None),
        }
    }

    pub fn select_cluster(&mut self, index: usize) -> Option<ClusterDetail> {
        let detail = details::cluster_detail(&self.graph, index)?;
        self.set_mode(EmphasisMode::Cluster(index));
        self.detail = DetailTarget::Cluster(index);
        Some(detail)
    }

    /// Full opacity everywhere, no outlines, details back to the overview.
    pub fn reset_emphasis(&mut self) {
        self.set_mode(EmphasisMode::None);
        self.detail = DetailTarget::Overview;
    }

    pub fn overview(&self) -> Overview {
        details::overview(&self.graph)
    }

    pub fn detail(&self) -> DetailView {
        let view = match &self.detail {
            DetailTarget::Overview => None,
            DetailTarget::Node(id) => details::node_detail(&self.graph, id).map(DetailView::Node),
            DetailTarget::Cluster(index) => {
                details::cluster_detail(&self.graph, *index).map(DetailView::Cluster)
            }
        };
        view.unwrap_or_else(|| DetailView::Overview(self.overview()))
    }

    pub fn selected_node(&self) -> Option<&str> {
        match &self.detail {
            DetailTarget::Node(id) => Some(id.as_str()),
            _ => None,
        }
    }

    pub fn begin_drag(&mut self, index: usize, position: Vec2) -> bool {
        if !self.simulation.pin(index, position) {
            return false;
        }
        if let Some(previous) = self.dragging.replace(index)
            && previous != index
        {
            self.simulation.release(previous);
        }
        true
    }

    pub fn drag_to(&mut self, position: Vec2) {
        if let Some(index) = self.dragging {
            self.simulation.move_pin(index, position);
        }
    }

    pub fn end_drag(&mut self) {
        if let Some(index) = self.dragging.take() {
            self.simulation.release(index);
        }
    }

    pub fn dragging(&self) -> Option<usize> {
        self.dragging
    }

    pub fn tick(&mut self) -> SimulationState {
        self.simulation.tick()
    }

    pub fn settle(&mut self, max_ticks: usize) -> usize {
        self.simulation.run_until_settled(max_ticks)
    }

    pub fn export(&self) -> LayoutExport<'_> {
        LayoutExport {
            graph: &self.graph,
            positions: self.simulation.snapshot(),
            emphasis: &self.emphasis,
            state: self.simulation.state(),
            diagnostics: self.graph.report,
        }
    }

    /// Node whose circle contains `world`, preferring the closest centre.
    pub fn node_at(&self, world: Vec2) -> Option<usize> {
        self.graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let distance = (self.simulation.position(index)? - world).length();
                (distance <= node.radius()).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn search(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        self.graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                let score = fuzzy_match_score(&matcher, node.display_name(), query)
                    .max(fuzzy_match_score(&matcher, &node.id, query))?;
                Some((index, score))
            })
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .map(|(index, _)| index)
    }
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

#[cfg(test)]
pub(crate) mod tests {
    use emath::vec2;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::network::{Cluster, Edge, EdgeKind, Node, RoutePotential};

    fn node(id: &str, score: u8, country: &str) -> Node {
        Node {
            id: id.to_owned(),
            label: format!("Project {id}"),
            country: country.to_owned(),
            status: "active".to_owned(),
            sector: "land".to_owned(),
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
            description: format!("{source} and {target}"),
        }
    }

    /// a and c are High, b is Medium, d is Low.
    pub(crate) fn sample_graph() -> Graph {
        Graph {
            nodes: vec![
                node("a", 9, "Peru"),
                node("b", 5, "Bolivia"),
                node("c", 8, "Chile"),
                node("d", 2, "Peru"),
            ],
            edges: vec![
                edge("a", "b", 8),
                edge("b", "c", 5),
                edge("a", "c", 3),
                edge("c", "d", 6),
            ],
            clusters: vec![
                Cluster {
                    name: "North".to_owned(),
                    description: "Andean cadastre".to_owned(),
                    projects: vec!["a".to_owned(), "b".to_owned(), "ghost".to_owned()],
                    learning_route_potential: Some(RoutePotential::High),
                    learning_route_description: Some(
                        "Field visit to both titling offices".to_owned(),
                    ),
                    proposed_route: Some("a -> b".to_owned()),
                },
                Cluster {
                    name: "South".to_owned(),
                    description: String::new(),
                    projects: vec!["c".to_owned(), "d".to_owned()],
                    learning_route_potential: Some(RoutePotential::Medium),
                    learning_route_description: None,
                    proposed_route: None,
                },
            ],
            cross_cutting_findings: vec!["Tenure is a shared bottleneck".to_owned()],
            ..Graph::default()
        }
    }

    fn view() -> NetworkView {
        NetworkView::new(sample_graph(), LayoutConfig::default())
    }

    #[test]
    fn cluster_selection_replaces_filter() {
        let mut view = view();
        view.filter_by_class(Some(LandClass::High));
        assert_eq!(view.mode(), EmphasisMode::Filter(LandClass::High));

        let detail = view.select_cluster(1).unwrap();
        assert_eq!(detail.summary.name, "South");
        assert_eq!(view.mode(), EmphasisMode::Cluster(1));
        assert_eq!(
            view.emphasis(),
            &compute_emphasis(view.graph(), EmphasisMode::Cluster(1))
        );
    }

    #[test]
    fn reset_restores_rest_state_from_any_mode() {
        let mut view = view();
        for step in 0..3 {
            match step {
                0 => view.filter_by_class(Some(LandClass::Low)),
                1 => {
                    view.select_cluster(0);
                }
                _ => {
                    view.filter_by_class(Some(LandClass::Medium));
                    view.select_cluster(1);
                }
            }
            assert!(!view.emphasis().is_rest());

            view.reset_emphasis();
            assert_eq!(view.mode(), EmphasisMode::None);
            assert!(view.emphasis().is_rest());
            assert!(matches!(view.detail(), DetailView::Overview(_)));
        }
    }

    #[test]
    fn clearing_the_filter_clears_emphasis() {
        let mut view = view();
        view.filter_by_class(Some(LandClass::Medium));
        view.filter_by_class(None);
        assert_eq!(view.mode(), EmphasisMode::None);
        assert!(view.emphasis().is_rest());
    }

    #[test]
    fn selecting_a_node_keeps_emphasis() {
        let mut view = view();
        view.select_cluster(0);

        let detail = view.select_node("b").unwrap();
        assert_eq!(detail.connections.len(), 2);
        assert_eq!(view.mode(), EmphasisMode::Cluster(0));
        assert_eq!(view.selected_node(), Some("b"));
        assert!(matches!(view.detail(), DetailView::Node(_)));
    }

    #[test]
    fn invalid_selections_change_nothing() {
        let mut view = view();
        view.filter_by_class(Some(LandClass::High));

        assert!(view.select_cluster(7).is_none());
        assert!(view.select_node("missing").is_none());
        assert_eq!(view.mode(), EmphasisMode::Filter(LandClass::High));
        assert!(matches!(view.detail(), DetailView::Overview(_)));
    }

    #[test]
    fn hover_does_not_touch_state() {
        let view = view();
        let card = view.hover("d").unwrap();
        assert_eq!(card.country, "Peru");
        assert_eq!(view.mode(), EmphasisMode::None);
        assert_eq!(view.selected_node(), None);
    }

    #[test]
    fn drag_pins_and_release_unpins() {
        let mut view = view();
        assert!(view.begin_drag(2, vec2(40.0, 40.0)));
        view.drag_to(vec2(60.0, 10.0));
        view.tick();

        assert_eq!(view.simulation().position(2), Some(vec2(60.0, 10.0)));
        assert_eq!(view.dragging(), Some(2));

        view.end_drag();
        assert!(!view.simulation().is_pinned(2));
        assert_eq!(view.dragging(), None);
        assert!(!view.begin_drag(99, Vec2::ZERO));
    }

    #[test]
    fn node_at_hits_the_circle() {
        let view = view();
        let position = view.simulation().position(3).unwrap();

        assert_eq!(view.node_at(position), Some(3));
        assert_eq!(view.node_at(vec2(10_000.0, 10_000.0)), None);
    }

    #[test]
    fn export_carries_positions_and_diagnostics() {
        let mut view = view();
        let ticks = view.settle(1_000);
        assert!(ticks > 0);

        let export = serde_json::to_value(view.export()).unwrap();
        assert_eq!(export["state"], "settled");
        assert_eq!(export["positions"].as_array().map(Vec::len), Some(4));
        assert_eq!(export["positions"][0]["id"], "a");
        assert_eq!(export["graph"]["nodes"][0]["landClassification"], "High");
        assert_eq!(export["diagnostics"]["droppedEdges"], 0);
        assert_eq!(export["emphasis"]["edges"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn search_finds_label_and_id() {
        let view = view();
        assert_eq!(view.search("project c"), Some(2));
        assert_eq!(view.search("   "), None);
        assert_eq!(view.search("qqqq"), None);
    }
}
