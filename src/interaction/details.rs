use serde::Serialize;

use crate::network::{EdgeKind, Graph, LandClass, Node, RoutePotential};

/// Transient tooltip content for a hovered node.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HoverCard {
    pub title: String,
    pub country: String,
    pub score: Option<u8>,
    pub class: LandClass,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connection {
    pub other_id: String,
    pub other_label: String,
    pub kind: EdgeKind,
    pub strength: u8,
    pub description: String,
    /// True when the selected node is the edge's source.
    pub outgoing: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub learning_route_potential: Option<RoutePotential>,
    pub learning_route_description: Option<String>,
    pub proposed_route: Option<String>,
    pub member_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeDetail {
    pub node: Node,
    pub connections: Vec<Connection>,
    pub clusters: Vec<ClusterSummary>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterMember {
    pub id: String,
    /// `None` when the id names no node in the graph.
    pub label: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ClusterDetail {
    pub summary: ClusterSummary,
    pub members: Vec<ClusterMember>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Overview {
    pub findings: Vec<String>,
    pub clusters: Vec<ClusterSummary>,
    pub node_count: usize,
    pub edge_count: usize,
}

/// What the details panel is currently showing.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetailView {
    Overview(Overview),
    Node(NodeDetail),
    Cluster(ClusterDetail),
}

pub(super) fn hover_card(graph: &Graph, id: &str) -> Option<HoverCard> {
    let node = graph.node(id)?;
    Some(HoverCard {
        title: node.display_name().to_owned(),
        country: node.country.clone(),
        score: node.land_intensity_score,
        class: node.land_classification,
    })
}

fn cluster_summary(graph: &Graph, index: usize) -> Option<ClusterSummary> {
    let cluster = graph.clusters.get(index)?;
    Some(ClusterSummary {
        index,
        name: cluster.name.clone(),
        description: cluster.description.clone(),
        learning_route_potential: cluster.learning_route_potential,
        learning_route_description: cluster.learning_route_description.clone(),
        proposed_route: cluster.proposed_route.clone(),
        member_count: cluster.projects.len(),
    })
}

pub(super) fn node_detail(graph: &Graph, id: &str) -> Option<NodeDetail> {
    let node = graph.node(id)?;

    let connections = graph
        .edges
        .iter()
        .filter(|edge| edge.touches(id))
        .map(|edge| {
            let other_id = edge.other_end(id);
            Connection {
                other_id: other_id.to_owned(),
                other_label: graph
                    .node(other_id)
                    .map_or(other_id, Node::display_name)
                    .to_owned(),
                kind: edge.kind,
                strength: edge.strength,
                description: edge.description.clone(),
                outgoing: edge.source == id,
            }
        })
        .collect();

    let clusters = graph
        .clusters
        .iter()
        .enumerate()
        .filter(|(_, cluster)| cluster.contains(id))
        .filter_map(|(index, _)| cluster_summary(graph, index))
        .collect();

    Some(NodeDetail {
        node: node.clone(),
        connections,
        clusters,
    })
}

pub(super) fn cluster_detail(graph: &Graph, index: usize) -> Option<ClusterDetail> {
    let summary = cluster_summary(graph, index)?;
    let members = graph.clusters[index]
        .projects
        .iter()
        .map(|id| {
            let node = graph.node(id);
            ClusterMember {
                id: id.clone(),
                label: node.map(|node| node.display_name().to_owned()),
                country: node.map(|node| node.country.clone()),
            }
        })
        .collect();

    Some(ClusterDetail { summary, members })
}

pub(super) fn overview(graph: &Graph) -> Overview {
    Overview {
        findings: graph.cross_cutting_findings.clone(),
        clusters: (0..graph.clusters.len())
            .filter_map(|index| cluster_summary(graph, index))
            .collect(),
        node_count: graph.nodes.len(),
        edge_count: graph.edges.len(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::interaction::tests::sample_graph;

    #[test]
    fn node_detail_lists_edges_in_both_directions() {
        let graph = sample_graph();
        let detail = node_detail(&graph, "c").unwrap();

        let connections = detail
            .connections
            .iter()
            .map(|connection| (connection.other_id.as_str(), connection.outgoing))
            .collect::<Vec<_>>();
        assert_eq!(connections, vec![("b", false), ("a", false), ("d", true)]);
        assert_eq!(detail.connections[0].other_label, "Project b");

        let clusters = detail
            .clusters
            .iter()
            .map(|cluster| cluster.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(clusters, vec!["South"]);
    }

    #[test]
    fn unknown_node_has_no_detail() {
        let graph = sample_graph();
        assert!(node_detail(&graph, "zz").is_none());
        assert!(hover_card(&graph, "zz").is_none());
    }

    #[test]
    fn cluster_detail_flags_unresolved_members() {
        let graph = sample_graph();
        let detail = cluster_detail(&graph, 0).unwrap();

        assert_eq!(detail.summary.member_count, 3);
        assert_eq!(
            detail.summary.learning_route_description.as_deref(),
            Some("Field visit to both titling offices")
        );
        assert_eq!(detail.members[0].label.as_deref(), Some("Project a"));
        assert_eq!(detail.members[2].id, "ghost");
        assert_eq!(detail.members[2].label, None);
        assert!(cluster_detail(&graph, 9).is_none());
    }

    #[test]
    fn overview_lists_findings_and_clusters() {
        let graph = sample_graph();
        let overview = overview(&graph);

        assert_eq!(overview.findings, vec!["Tenure is a shared bottleneck".to_owned()]);
        assert_eq!(overview.clusters.len(), 2);
        assert_eq!(
            overview.clusters[1].learning_route_potential,
            Some(RoutePotential::Medium)
        );
        assert_eq!(overview.node_count, 4);
    }

    #[test]
    fn hover_card_uses_display_name() {
        let graph = sample_graph();
        let card = hover_card(&graph, "a").unwrap();

        assert_eq!(card.title, "Project a");
        assert_eq!(card.score, Some(9));
        assert_eq!(card.class, LandClass::High);
    }
}
