use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::AnalysisRequest;
use crate::config::ServiceConfig;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 200;

/// Anything that turns a project snapshot into raw analysis text.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String>;
}

/// POSTs `{projects, lang}` as JSON and returns the response body untouched.
pub struct HttpAnalysisService {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpAnalysisService {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self> {
        let Some(endpoint) = config.endpoint.as_deref() else {
            bail!("no analysis endpoint configured; set service.endpoint or pass --endpoint");
        };

        let api_key = match config.api_key_env.as_deref() {
            Some(var) => Some(
                env::var(var).with_context(|| format!("environment variable {var} is not set"))?,
            ),
            None => None,
        };

        Self::new(endpoint, api_key)
    }
}

#[async_trait]
impl AnalysisService for HttpAnalysisService {
    async fn generate(&self, request: &AnalysisRequest) -> Result<String> {
        debug!(endpoint = %self.endpoint, "posting project snapshot");

        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .context("failed to read analysis response body")?;

        if !status.is_success() {
            bail!("service answered {status}: {}", error_summary(&body));
        }

        Ok(body)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// The `error` field of a JSON error body, or the start of the raw body.
fn error_summary(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }

    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &trimmed[..cut]),
        None => trimmed.to_owned(),
    }
}
