use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandClass {
    High,
    Medium,
    Low,
}

impl LandClass {
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Band implied by a 1-10 intensity score.
    pub fn from_score(score: u8) -> Self {
        match score {
            8.. => Self::High,
            4..=7 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Thematic,
    Geographic,
    Methodological,
    Temporal,
    Institutional,
    Other,
}

impl EdgeKind {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "thematic" => Self::Thematic,
            "geographic" => Self::Geographic,
            "methodological" => Self::Methodological,
            "temporal" => Self::Temporal,
            "institutional" => Self::Institutional,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Thematic => "thematic",
            Self::Geographic => "geographic",
            Self::Methodological => "methodological",
            Self::Temporal => "temporal",
            Self::Institutional => "institutional",
            Self::Other => "other",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RoutePotential {
    High,
    Medium,
    Low,
}

impl RoutePotential {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "HIGH" | "ALTA" | "ALTO" => Some(Self::High),
            "MEDIUM" | "MEDIA" | "MEDIO" => Some(Self::Medium),
            "LOW" | "BAJA" | "BAJO" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// How an edge line is drawn, derived from its strength.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
}

pub const DEFAULT_SCORE: u8 = 3;
pub const DEFAULT_STRENGTH: u8 = 5;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    pub country: String,
    pub status: String,
    pub sector: String,
    /// Reported 1-10 score; `None` when the response omitted it.
    pub land_intensity_score: Option<u8>,
    pub land_classification: LandClass,
    pub justification: String,
}

impl Node {
    pub fn score(&self) -> u8 {
        self.land_intensity_score.unwrap_or(DEFAULT_SCORE)
    }

    pub fn display_name(&self) -> &str {
        if self.label.is_empty() {
            &self.id
        } else {
            &self.label
        }
    }

    /// Drawn radius; also the base of the collision radius.
    pub fn radius(&self) -> f32 {
        8.0 + f32::from(self.score()) * 3.0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub strength: u8,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub description: String,
}

impl Edge {
    pub fn touches(&self, id: &str) -> bool {
        self.source == id || self.target == id
    }

    pub fn other_end(&self, id: &str) -> &str {
        if self.source == id {
            &self.target
        } else {
            &self.source
        }
    }

    pub fn line_width(&self) -> f32 {
        0.5 + f32::from(self.strength) * 0.4
    }

    pub fn line_style(&self) -> LineStyle {
        match self.strength {
            7.. => LineStyle::Solid,
            4..=6 => LineStyle::Dashed,
            _ => LineStyle::Dotted,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub name: String,
    pub description: String,
    /// Member ids; may name nodes that are not in the graph.
    pub projects: Vec<String>,
    pub learning_route_potential: Option<RoutePotential>,
    pub learning_route_description: Option<String>,
    pub proposed_route: Option<String>,
}

impl Cluster {
    pub fn contains(&self, id: &str) -> bool {
        self.projects.iter().any(|member| member == id)
    }
}

/// Counts of data silently absorbed during validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub dropped_nodes: usize,
    pub dropped_edges: usize,
    pub unresolved_cluster_members: usize,
    pub reclassified_nodes: usize,
}

impl ValidationReport {
    pub fn is_clean(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub clusters: Vec<Cluster>,
    pub cross_cutting_findings: Vec<String>,
    #[serde(skip)]
    pub report: ValidationReport,
}

impl Graph {
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn node_index(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(strength: u8) -> Edge {
        Edge {
            source: "1".to_owned(),
            target: "2".to_owned(),
            strength,
            kind: EdgeKind::Thematic,
            description: String::new(),
        }
    }

    #[test]
    fn score_bands() {
        assert_eq!(LandClass::from_score(10), LandClass::High);
        assert_eq!(LandClass::from_score(8), LandClass::High);
        assert_eq!(LandClass::from_score(7), LandClass::Medium);
        assert_eq!(LandClass::from_score(4), LandClass::Medium);
        assert_eq!(LandClass::from_score(3), LandClass::Low);
        assert_eq!(LandClass::from_score(1), LandClass::Low);
    }

    #[test]
    fn edge_styles_follow_strength() {
        assert_eq!(edge(9).line_style(), LineStyle::Solid);
        assert_eq!(edge(7).line_style(), LineStyle::Solid);
        assert_eq!(edge(5).line_style(), LineStyle::Dashed);
        assert_eq!(edge(2).line_style(), LineStyle::Dotted);
        assert!(edge(9).line_width() > edge(2).line_width());
    }

    #[test]
    fn other_end_is_symmetric() {
        let edge = edge(5);
        assert_eq!(edge.other_end("1"), "2");
        assert_eq!(edge.other_end("2"), "1");
        assert!(edge.touches("2"));
        assert!(!edge.touches("3"));
    }

    #[test]
    fn edge_kind_and_route_parsing_is_lenient() {
        assert_eq!(EdgeKind::parse(" Geographic "), EdgeKind::Geographic);
        assert_eq!(EdgeKind::parse("financial"), EdgeKind::Other);
        assert_eq!(RoutePotential::parse("high"), Some(RoutePotential::High));
        assert_eq!(RoutePotential::parse("Media"), Some(RoutePotential::Medium));
        assert_eq!(RoutePotential::parse("n/a"), None);
    }
}
