mod classify;
mod model;
mod parse;
mod repair;
mod validate;

pub use classify::{classify_text, normalize_classification};
pub use model::{
    Cluster, DEFAULT_SCORE, DEFAULT_STRENGTH, Edge, EdgeKind, Graph, LandClass, LineStyle, Node,
    RoutePotential, ValidationReport,
};
pub use repair::repair_response;
pub use validate::validate_graph;

use crate::error::AnalysisError;

/// Repair followed by validation: raw service text to a clean graph.
pub fn parse_analysis(raw: &str) -> Result<Graph, AnalysisError> {
    let value = repair_response(raw)?;
    validate_graph(value)
}
