//! From a project snapshot to a validated graph: request, fetch with a time
//! bound, repair, validate.

mod service;
mod session;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::network::{Graph, parse_analysis};

pub use service::{AnalysisService, HttpAnalysisService};
pub use session::{AnalysisSession, SessionState};

/// Fewer projects than this make no network.
pub const MIN_PROJECTS: usize = 3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "en")]
    English,
}

impl Language {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Spanish => "es",
            Self::English => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "es" | "spanish" | "español" => Ok(Self::Spanish),
            "en" | "english" => Ok(Self::English),
            other => Err(format!("unsupported language `{other}`, expected `es` or `en`")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub projects: Vec<Value>,
    #[serde(rename = "lang")]
    pub language: Language,
}

impl AnalysisRequest {
    pub fn new(projects: Vec<Value>, language: Language) -> Result<Self, AnalysisError> {
        if projects.len() < MIN_PROJECTS {
            return Err(AnalysisError::NotEnoughProjects {
                required: MIN_PROJECTS,
                found: projects.len(),
            });
        }
        Ok(Self { projects, language })
    }
}

/// Runs one request to completion, timeout or cancellation.
///
/// The service future is dropped on either interruption, which aborts any
/// in-flight HTTP exchange.
pub async fn run_analysis(
    service: &dyn AnalysisService,
    request: &AnalysisRequest,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<Graph, AnalysisError> {
    info!(
        projects = request.projects.len(),
        lang = %request.language,
        timeout_secs = timeout.as_secs(),
        "requesting network analysis"
    );

    let raw = tokio::select! {
        biased;
        () = cancel.cancelled() => {
            info!("network analysis cancelled");
            return Err(AnalysisError::Cancelled);
        }
        outcome = tokio::time::timeout(timeout, service.generate(request)) => match outcome {
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "network analysis timed out");
                return Err(AnalysisError::Timeout(timeout));
            }
            Ok(Err(error)) => {
                let message = format!("{error:#}");
                warn!(error = %message, "network analysis service failed");
                return Err(AnalysisError::Service(message));
            }
            Ok(Ok(raw)) => raw,
        },
    };

    let graph = parse_analysis(&raw)?;
    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        clusters = graph.clusters.len(),
        "network analysis ready"
    );
    Ok(graph)
}
