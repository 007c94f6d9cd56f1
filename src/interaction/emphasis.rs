use std::collections::HashSet;

use serde::Serialize;

use crate::network::{Graph, LandClass};

pub const EDGE_REST_OPACITY: f32 = 0.6;

const FILTER_NODE_DIM: f32 = 0.12;
const FILTER_LABEL_DIM: f32 = 0.08;
const FILTER_EDGE_DIM: f32 = 0.05;

const CLUSTER_NODE_DIM: f32 = 0.3;
const CLUSTER_LABEL_DIM: f32 = 0.2;
const CLUSTER_EDGE_MATCH: f32 = 0.8;
const CLUSTER_EDGE_DIM: f32 = 0.1;

/// Exactly one mode is active; choosing one replaces the previous.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", content = "value", rename_all = "lowercase")]
pub enum EmphasisMode {
    #[default]
    None,
    Filter(LandClass),
    Cluster(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeEmphasis {
    pub opacity: f32,
    pub label_opacity: f32,
    pub outlined: bool,
}

impl NodeEmphasis {
    pub const REST: Self = Self {
        opacity: 1.0,
        label_opacity: 1.0,
        outlined: false,
    };
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Emphasis {
    pub nodes: Vec<NodeEmphasis>,
    pub edges: Vec<f32>,
}

impl Emphasis {
    pub fn rest(graph: &Graph) -> Self {
        Self {
            nodes: vec![NodeEmphasis::REST; graph.nodes.len()],
            edges: vec![EDGE_REST_OPACITY; graph.edges.len()],
        }
    }

    pub fn is_rest(&self) -> bool {
        self.nodes.iter().all(|node| *node == NodeEmphasis::REST)
            && self.edges.iter().all(|&opacity| opacity == EDGE_REST_OPACITY)
    }
}

/// Recomputes emphasis from scratch; the result depends on nothing but its inputs.
///
/// A cluster index that does not exist yields the resting state.
pub fn compute_emphasis(graph: &Graph, mode: EmphasisMode) -> Emphasis {
    match mode {
        EmphasisMode::None => Emphasis::rest(graph),
        EmphasisMode::Filter(class) => {
            let matches = graph
                .nodes
                .iter()
                .filter(|node| node.land_classification == class)
                .map(|node| node.id.as_str())
                .collect::<HashSet<_>>();
            dimmed(graph, &matches, false)
        }
        EmphasisMode::Cluster(index) => {
            let Some(cluster) = graph.clusters.get(index) else {
                return Emphasis::rest(graph);
            };
            let members = cluster
                .projects
                .iter()
                .map(String::as_str)
                .collect::<HashSet<_>>();
            dimmed(graph, &members, true)
        }
    }
}

fn dimmed(graph: &Graph, matches: &HashSet<&str>, cluster: bool) -> Emphasis {
    let (node_dim, label_dim, edge_match, edge_dim) = if cluster {
        (
            CLUSTER_NODE_DIM,
            CLUSTER_LABEL_DIM,
            CLUSTER_EDGE_MATCH,
            CLUSTER_EDGE_DIM,
        )
    } else {
        (
            FILTER_NODE_DIM,
            FILTER_LABEL_DIM,
            EDGE_REST_OPACITY,
            FILTER_EDGE_DIM,
        )
    };

    let nodes = graph
        .nodes
        .iter()
        .map(|node| {
            if matches.contains(node.id.as_str()) {
                NodeEmphasis {
                    outlined: cluster,
                    ..NodeEmphasis::REST
                }
            } else {
                NodeEmphasis {
                    opacity: node_dim,
                    label_opacity: label_dim,
                    outlined: false,
                }
            }
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .map(|edge| {
            if matches.contains(edge.source.as_str()) && matches.contains(edge.target.as_str()) {
                edge_match
            } else {
                edge_dim
            }
        })
        .collect();

    Emphasis { nodes, edges }
}
