#[cfg(feature = "gui")]
mod app;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use land_network::Config;
use land_network::pipeline::{
    AnalysisRequest, AnalysisSession, HttpAnalysisService, Language, SessionState,
};

/// Ticks allowed for the headless layout before exporting whatever it reached.
const HEADLESS_MAX_TICKS: usize = 2_000;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw analysis response to load instead of calling the service.
    #[arg(long, conflicts_with = "projects")]
    payload: Option<PathBuf>,

    /// JSON array of project records to analyse.
    #[arg(long)]
    projects: Option<PathBuf>,

    /// Analysis service endpoint; overrides the config file.
    #[arg(long)]
    endpoint: Option<String>,

    /// Analysis language: es or en.
    #[arg(long)]
    lang: Option<Language>,

    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Settle the layout and print graph, positions and diagnostics as JSON.
    #[arg(long)]
    headless: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(endpoint) = &args.endpoint {
        config.service.endpoint = Some(endpoint.clone());
    }
    if let Some(language) = args.lang {
        config.service.language = language;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.service.timeout_secs = timeout_secs;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut session = if config.service.endpoint.is_some() {
        let service = HttpAnalysisService::from_config(&config.service)?;
        AnalysisSession::new(Arc::new(service), config.service.timeout(), config.layout)
    } else {
        AnalysisSession::offline(config.layout)
    };

    if let Some(path) = &args.payload {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read payload {}", path.display()))?;
        info!(path = %path.display(), bytes = raw.len(), "loading offline payload");
        session.load_raw(&raw);
    }

    let projects = args.projects.as_deref().map(read_projects).transpose()?;
    let language = config.service.language;

    if args.headless {
        return run_headless(session, projects, language);
    }

    run_window(session, projects, language)
}

#[cfg(feature = "gui")]
fn run_window(
    session: AnalysisSession,
    projects: Option<Vec<Value>>,
    language: Language,
) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Land Network",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::NetworkApp::new(
                cc, session, projects, language,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!("failed to start the window: {error}"))
}

#[cfg(not(feature = "gui"))]
fn run_window(
    _session: AnalysisSession,
    _projects: Option<Vec<Value>>,
    _language: Language,
) -> Result<()> {
    bail!("built without the `gui` feature; run with --headless")
}

fn read_projects(path: &std::path::Path) -> Result<Vec<Value>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read projects {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of projects", path.display()))
}

fn run_headless(
    mut session: AnalysisSession,
    projects: Option<Vec<Value>>,
    language: Language,
) -> Result<()> {
    if let Some(projects) = projects {
        let request = AnalysisRequest::new(projects, language)?;
        session.begin(request);
    }

    match session.wait() {
        SessionState::Ready(_) => {}
        SessionState::Failed(error) => {
            if let Some(raw) = error.raw_response() {
                eprintln!("{raw}");
            }
            bail!("{}: {error}", error.user_message());
        }
        SessionState::Empty | SessionState::Loading => {
            bail!("nothing to analyse: pass --payload, or --projects with an endpoint")
        }
    }

    let Some(view) = session.view_mut() else {
        bail!("no network loaded");
    };
    let ticks = view.settle(HEADLESS_MAX_TICKS);
    info!(ticks, state = ?view.simulation().state(), "headless layout finished");

    let output = serde_json::to_string_pretty(&view.export())
        .context("failed to serialize the layout export")?;
    println!("{output}");
    Ok(())
}
