//! Repair, validation, layout and exploration of AI-generated land project networks.

pub mod config;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod network;
pub mod pipeline;

pub use config::Config;
pub use error::{AnalysisError, RepairError};
