//! TOML configuration. Every field has a default so an absent or partial file is fine.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::Language;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub layout: LayoutConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Endpoint that turns a project snapshot into a raw network analysis.
    pub endpoint: Option<String>,
    pub timeout_secs: u64,
    pub language: Language,
    /// Name of the environment variable holding a bearer token, if the endpoint needs one.
    pub api_key_env: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: 180,
            language: Language::Spanish,
            api_key_env: None,
        }
    }
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Many-body strength; negative values repel.
    pub charge: f32,
    pub link_distance_base: f32,
    pub link_distance_per_strength: f32,
    pub min_link_distance: f32,
    pub collision_margin: f32,
    pub center_strength: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub velocity_decay: f32,
    /// Alpha target held while a node is dragged.
    pub drag_alpha_target: f32,
    /// Barnes-Hut opening angle.
    pub theta: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            charge: -300.0,
            link_distance_base: 200.0,
            link_distance_per_strength: 15.0,
            min_link_distance: 30.0,
            collision_margin: 5.0,
            center_strength: 0.1,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            theta: 0.9,
        }
    }
}

impl LayoutConfig {
    /// Target separation for a link of the given strength.
    pub fn link_distance(&self, strength: u8) -> f32 {
        (self.link_distance_base - f32::from(strength) * self.link_distance_per_strength)
            .max(self.min_link_distance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).context("config is not valid TOML")
    }
}
