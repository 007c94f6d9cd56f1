use std::time::Duration;

/// Terminal failures of the response repair stage.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepairError {
    #[error("no JSON object found in the analysis response")]
    NoJsonFound,

    #[error("analysis JSON is incomplete and could not be repaired")]
    UnrepairableJson { raw: String },
}

/// Everything that can abort an analysis before a graph reaches the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Repair(#[from] RepairError),

    #[error("analysis JSON is not shaped like a network graph: {0}")]
    InvalidGraphShape(String),

    #[error("analysis service did not respond within {} seconds", .0.as_secs())]
    Timeout(Duration),

    #[error("analysis request was cancelled")]
    Cancelled,

    #[error("analysis service failed: {0}")]
    Service(String),

    #[error("network analysis needs at least {required} projects, got {found}")]
    NotEnoughProjects { required: usize, found: usize },
}

impl AnalysisError {
    /// Short text for the user, distinct per failure family.
    pub fn user_message(&self) -> String {
        match self {
            Self::Repair(RepairError::NoJsonFound) | Self::InvalidGraphShape(_) => {
                "Could not parse the network analysis.".to_owned()
            }
            Self::Repair(RepairError::UnrepairableJson { .. }) => {
                "The network analysis came back incomplete. Please try again.".to_owned()
            }
            Self::Timeout(limit) => format!(
                "The analysis service did not answer within {} seconds.",
                limit.as_secs()
            ),
            Self::Cancelled => "The analysis was cancelled.".to_owned(),
            Self::Service(_) => "The network analysis failed. Check the service settings.".to_owned(),
            Self::NotEnoughProjects { required, .. } => {
                format!("At least {required} projects are needed for a network analysis.")
            }
        }
    }

    /// Raw response text carried for diagnostics, when there is one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Repair(RepairError::UnrepairableJson { raw }) => Some(raw.as_str()),
            _ => None,
        }
    }
}
