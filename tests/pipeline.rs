use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

use land_network::AnalysisError;
use land_network::config::LayoutConfig;
use land_network::interaction::{DetailView, EmphasisMode, NetworkView};
use land_network::layout::SimulationState;
use land_network::network::{LandClass, parse_analysis};
use land_network::pipeline::{
    AnalysisRequest, AnalysisService, AnalysisSession, Language, SessionState,
};

const TRUNCATED: &str = r#"Sure! Here is the network:
{"nodes":[
  {"id":"p1","label":"Andean terraces","country":"Peru","landIntensityScore":9,"landClassification":"Alta"},
  {"id":"p2","label":"Forest tenure","country":"Bolivia","landIntensityScore":5,"landClassification":"low"},
  {"id":"p3","label":"Coastal dunes","country":"Chile","landIntensityScore":2},
  {"id":"p3","label":"Duplicate"}
],
"edges":[
  {"source":"p1","target":"p2","strength":8,"type":"thematic","description":"Shared tenure model"},
  {"source":"p2","target":"p9","strength":4,"type":"geographic"},
  {"source":"p3","target":"p1","strength":6,"type":"Institutional"},
  {"source":"p2","target":"p3","strength":3,"type":"tempo"#;

fn sample_view() -> NetworkView {
    let raw = json!({
        "nodes": [
            {"id": "a", "label": "Alpha", "landIntensityScore": 9},
            {"id": "b", "label": "Beta", "landIntensityScore": 5},
            {"id": "c", "label": "Gamma", "landIntensityScore": 2},
        ],
        "edges": [
            {"source": "a", "target": "b", "strength": 8, "type": "thematic"},
            {"source": "b", "target": "c", "strength": 4, "type": "geographic"},
        ],
        "clusters": [
            {"name": "Highlands", "projects": ["a", "b"], "learningRoutePotential": "Alta"},
        ],
        "crossCuttingFindings": ["Water rights recur"],
    });
    let graph = parse_analysis(&raw.to_string()).unwrap();
    NetworkView::new(graph, LayoutConfig::default())
}

#[test]
fn truncated_response_recovers_a_consistent_graph() {
    let graph = parse_analysis(TRUNCATED).unwrap();

    let ids = graph.nodes.iter().map(|node| node.id.as_str()).collect::<Vec<_>>();
    assert_eq!(ids, ["p1", "p2", "p3"]);

    // p2 -> p9 dangles, the last edge was cut mid-entry.
    assert_eq!(graph.edges.len(), 2);
    for edge in &graph.edges {
        assert!(graph.node(&edge.source).is_some());
        assert!(graph.node(&edge.target).is_some());
    }

    assert_eq!(graph.report.dropped_nodes, 1);
    assert_eq!(graph.report.dropped_edges, 1);
}

#[test]
fn edge_cut_inside_an_inline_endpoint_is_not_kept() {
    let raw = r#"{"nodes":[{"id":"1"},{"id":"2"}],"edges":[{"source":"1","target":"2","strength":9,"type":"thematic","description":"d"},{"source":"2","target":{"id":"1"}"#;
    let graph = parse_analysis(raw).unwrap();

    assert_eq!(graph.edges.len(), 1);
    assert_eq!(graph.edges[0].strength, 9);
    assert_eq!(graph.edges[0].source, "1");
}

#[test]
fn classification_follows_the_score() {
    let graph = parse_analysis(TRUNCATED).unwrap();
    let classes = graph
        .nodes
        .iter()
        .map(|node| node.land_classification)
        .collect::<Vec<_>>();

    assert_eq!(classes, [LandClass::High, LandClass::Medium, LandClass::Low]);
    // "low" contradicted a score of 5 and p3 carried no classification text.
    assert_eq!(graph.report.reclassified_nodes, 2);
}

#[test]
fn prose_only_response_is_a_parse_failure() {
    let error = parse_analysis("I could not produce a network for these projects.").unwrap_err();
    assert_eq!(error.user_message(), "Could not parse the network analysis.");
}

#[test]
fn emphasis_modes_replace_each_other() {
    let mut view = sample_view();

    view.filter_by_class(Some(LandClass::High));
    assert_eq!(view.mode(), EmphasisMode::Filter(LandClass::High));

    view.select_cluster(0).unwrap();
    assert_eq!(view.mode(), EmphasisMode::Cluster(0));
    assert!(view.emphasis().nodes.iter().take(2).all(|node| node.outlined));

    view.filter_by_class(Some(LandClass::Low));
    assert_eq!(view.mode(), EmphasisMode::Filter(LandClass::Low));
    assert!(view.emphasis().nodes.iter().all(|node| !node.outlined));

    view.reset_emphasis();
    assert_eq!(view.mode(), EmphasisMode::None);
    assert!(view.emphasis().is_rest());
    assert!(matches!(view.detail(), DetailView::Overview(_)));
}

#[test]
fn headless_export_carries_graph_and_positions() {
    let mut view = sample_view();
    view.settle(5_000);
    assert_eq!(view.simulation().state(), SimulationState::Settled);

    let exported = serde_json::to_value(view.export()).unwrap();
    assert_eq!(exported["state"], json!("settled"));
    assert_eq!(exported["graph"]["nodes"].as_array().map(Vec::len), Some(3));
    assert_eq!(exported["positions"].as_array().map(Vec::len), Some(3));
    assert!(exported["positions"][0]["x"].is_number());
}

struct SlowService;

#[async_trait]
impl AnalysisService for SlowService {
    async fn generate(&self, _request: &AnalysisRequest) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(String::new())
    }
}

fn projects() -> Vec<Value> {
    (0..3).map(|index| json!({"id": index})).collect()
}

#[test]
fn session_times_out_without_a_graph() {
    let mut session = AnalysisSession::new(
        Arc::new(SlowService),
        Duration::from_millis(50),
        LayoutConfig::default(),
    );
    session.begin(AnalysisRequest::new(projects(), Language::English).unwrap());
    assert!(session.is_loading());

    let state = session.wait();
    assert!(matches!(
        state,
        SessionState::Failed(AnalysisError::Timeout(_))
    ));
    assert!(session.view().is_none());
}
