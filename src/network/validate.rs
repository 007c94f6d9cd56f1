use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::AnalysisError;

use super::classify::normalize_classification;
use super::model::{
    Cluster, DEFAULT_STRENGTH, Edge, EdgeKind, Graph, Node, RoutePotential, ValidationReport,
};
use super::parse::{RawCluster, RawEdge, RawNode, scalar_text};

/// Turns a parsed payload into a referentially consistent [`Graph`].
///
/// Only a missing or non-array `nodes` field is fatal. Unusable nodes and
/// edges whose endpoints do not resolve are dropped and counted in
/// [`Graph::report`].
pub fn validate_graph(value: Value) -> Result<Graph, AnalysisError> {
    let Value::Object(mut object) = value else {
        return Err(AnalysisError::InvalidGraphShape(
            "top-level value is not an object".to_owned(),
        ));
    };

    let raw_nodes = match object.remove("nodes") {
        Some(Value::Array(items)) => items,
        Some(_) => {
            return Err(AnalysisError::InvalidGraphShape(
                "`nodes` is not an array".to_owned(),
            ));
        }
        None => {
            return Err(AnalysisError::InvalidGraphShape(
                "`nodes` is missing".to_owned(),
            ));
        }
    };

    let mut report = ValidationReport::default();
    let nodes = collect_nodes(raw_nodes, &mut report);
    let known_ids = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let edges = collect_edges(take_array(&mut object, "edges"), &known_ids, &mut report);
    let clusters = collect_clusters(take_array(&mut object, "clusters"), &known_ids, &mut report);
    let cross_cutting_findings = take_array(&mut object, "crossCuttingFindings")
        .iter()
        .filter_map(scalar_text)
        .filter(|finding| !finding.is_empty())
        .collect::<Vec<_>>();

    if !report.is_clean() {
        warn!(
            dropped_nodes = report.dropped_nodes,
            dropped_edges = report.dropped_edges,
            unresolved_cluster_members = report.unresolved_cluster_members,
            reclassified_nodes = report.reclassified_nodes,
            "absorbed inconsistencies in analysis graph"
        );
    }
    info!(
        nodes = nodes.len(),
        edges = edges.len(),
        clusters = clusters.len(),
        "validated analysis graph"
    );

    Ok(Graph {
        nodes,
        edges,
        clusters,
        cross_cutting_findings,
        report,
    })
}

fn take_array(object: &mut Map<String, Value>, key: &str) -> Vec<Value> {
    match object.remove(key) {
        Some(Value::Array(items)) => items,
        Some(other) => {
            debug!(key, kind = ?other, "ignoring non-array field");
            Vec::new()
        }
        None => Vec::new(),
    }
}

fn collect_nodes(raw_nodes: Vec<Value>, report: &mut ValidationReport) -> Vec<Node> {
    let mut seen = HashSet::with_capacity(raw_nodes.len());
    let mut nodes = Vec::with_capacity(raw_nodes.len());

    for item in raw_nodes {
        let Some((raw, id)) = RawNode::deserialize(item)
            .ok()
            .and_then(|raw| raw.id.clone().map(|id| (raw, id)))
        else {
            report.dropped_nodes += 1;
            continue;
        };

        if !seen.insert(id.clone()) {
            report.dropped_nodes += 1;
            continue;
        }

        let (land_classification, reclassified) = normalize_classification(
            raw.land_intensity_score,
            raw.land_classification.as_deref(),
        );
        if reclassified {
            report.reclassified_nodes += 1;
        }

        nodes.push(Node {
            id,
            label: raw.label.unwrap_or_default(),
            country: raw.country.unwrap_or_default(),
            status: raw.status.unwrap_or_default(),
            sector: raw.sector.unwrap_or_default(),
            land_intensity_score: raw.land_intensity_score,
            land_classification,
            justification: raw.justification.unwrap_or_default(),
        });
    }

    nodes
}

fn collect_edges(
    raw_edges: Vec<Value>,
    known_ids: &HashSet<&str>,
    report: &mut ValidationReport,
) -> Vec<Edge> {
    let mut edges = Vec::with_capacity(raw_edges.len());

    for item in raw_edges {
        let Ok(raw) = RawEdge::deserialize(item) else {
            report.dropped_edges += 1;
            continue;
        };

        let (Some(source), Some(target)) = (
            raw.source.map(|endpoint| endpoint.into_id()),
            raw.target.map(|endpoint| endpoint.into_id()),
        ) else {
            report.dropped_edges += 1;
            continue;
        };

        if !known_ids.contains(source.as_str()) || !known_ids.contains(target.as_str()) {
            report.dropped_edges += 1;
            continue;
        }

        edges.push(Edge {
            source,
            target,
            strength: raw.strength.unwrap_or(DEFAULT_STRENGTH),
            kind: raw
                .kind
                .as_deref()
                .map(EdgeKind::parse)
                .unwrap_or(EdgeKind::Other),
            description: raw.description.unwrap_or_default(),
        });
    }

    edges
}

fn collect_clusters(
    raw_clusters: Vec<Value>,
    known_ids: &HashSet<&str>,
    report: &mut ValidationReport,
) -> Vec<Cluster> {
    raw_clusters
        .into_iter()
        .filter_map(|item| RawCluster::deserialize(item).ok())
        .map(|raw| {
            let mut seen = HashSet::new();
            let projects = raw
                .projects
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect::<Vec<_>>();
            report.unresolved_cluster_members += projects
                .iter()
                .filter(|id| !known_ids.contains(id.as_str()))
                .count();

            Cluster {
                name: raw.name.unwrap_or_default(),
                description: raw.description.unwrap_or_default(),
                projects,
                learning_route_potential: raw
                    .learning_route_potential
                    .as_deref()
                    .and_then(RoutePotential::parse),
                learning_route_description: raw
                    .learning_route_description
                    .filter(|text| !text.is_empty()),
                proposed_route: raw.proposed_route.filter(|route| !route.is_empty()),
            }
        })
        .collect()
}
