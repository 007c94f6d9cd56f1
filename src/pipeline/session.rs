use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AnalysisRequest, AnalysisService, run_analysis};
use crate::config::LayoutConfig;
use crate::error::AnalysisError;
use crate::interaction::NetworkView;
use crate::network::{Graph, parse_analysis};

pub enum SessionState {
    Empty,
    Loading,
    Ready(Box<NetworkView>),
    Failed(AnalysisError),
}

struct PendingAnalysis {
    rx: Receiver<Result<Graph, AnalysisError>>,
    cancel: CancellationToken,
}

/// Owns the one live graph. A new request always replaces whatever came
/// before it, including a request still in flight.
pub struct AnalysisSession {
    service: Option<Arc<dyn AnalysisService>>,
    timeout: Duration,
    layout: LayoutConfig,
    state: SessionState,
    pending: Option<PendingAnalysis>,
    generation: u64,
}

impl AnalysisSession {
    pub fn new(service: Arc<dyn AnalysisService>, timeout: Duration, layout: LayoutConfig) -> Self {
        Self {
            service: Some(service),
            timeout,
            ..Self::offline(layout)
        }
    }

    /// A session that can only show raw payloads loaded with [`Self::load_raw`].
    pub fn offline(layout: LayoutConfig) -> Self {
        Self {
            service: None,
            timeout: Duration::ZERO,
            layout,
            state: SessionState::Empty,
            pending: None,
            generation: 0,
        }
    }

    pub fn can_request(&self) -> bool {
        self.service.is_some()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SessionState::Loading)
    }

    pub fn view(&self) -> Option<&NetworkView> {
        match &self.state {
            SessionState::Ready(view) => Some(view.as_ref()),
            _ => None,
        }
    }

    pub fn view_mut(&mut self) -> Option<&mut NetworkView> {
        match &mut self.state {
            SessionState::Ready(view) => Some(view.as_mut()),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        match &self.state {
            SessionState::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Incremented for every request; lets callers tell graphs apart.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancels anything pending, drops the current graph and starts `request`
    /// on a background worker.
    pub fn begin(&mut self, request: AnalysisRequest) {
        self.abandon_pending();
        self.generation += 1;

        let Some(service) = self.service.clone() else {
            self.install(Err(AnalysisError::Service(
                "no analysis service is configured".to_owned(),
            )));
            return;
        };

        let (tx, rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let worker_cancel = cancel.clone();
        let timeout = self.timeout;
        let generation = self.generation;

        thread::spawn(move || {
            let result = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime.block_on(run_analysis(
                    service.as_ref(),
                    &request,
                    timeout,
                    &worker_cancel,
                )),
                Err(error) => Err(AnalysisError::Service(format!(
                    "failed to start async runtime: {error}"
                ))),
            };
            if tx.send(result).is_err() {
                debug!(generation, "analysis result discarded, a newer request replaced it");
            }
        });

        self.pending = Some(PendingAnalysis { rx, cancel });
        self.state = SessionState::Loading;
        info!(generation, "analysis started");
    }

    pub fn load_raw(&mut self, raw: &str) {
        self.abandon_pending();
        self.generation += 1;
        let result = parse_analysis(raw);
        self.install(result);
    }

    /// Picks up a finished background result. Returns true when the state changed.
    pub fn poll(&mut self) -> bool {
        let Some(pending) = self.pending.as_ref() else {
            return false;
        };

        let result = match pending.rx.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(AnalysisError::Service(
                "analysis worker stopped without a result".to_owned(),
            )),
        };
        self.pending = None;
        self.install(result);
        true
    }

    pub fn wait(&mut self) -> &SessionState {
        if let Some(pending) = self.pending.take() {
            let result = pending.rx.recv().unwrap_or_else(|_| {
                Err(AnalysisError::Service(
                    "analysis worker stopped without a result".to_owned(),
                ))
            });
            self.install(result);
        }
        &self.state
    }

    pub fn cancel(&mut self) {
        if self.pending.is_some() {
            self.abandon_pending();
            self.state = SessionState::Empty;
            info!(generation = self.generation, "analysis cancelled");
        }
    }

    fn abandon_pending(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.cancel.cancel();
        }
    }

    fn install(&mut self, result: Result<Graph, AnalysisError>) {
        self.state = match result {
            Ok(graph) => {
                if !graph.report.is_clean() {
                    debug!(report = ?graph.report, "graph installed with dropped data");
                }
                SessionState::Ready(Box::new(NetworkView::new(graph, self.layout)))
            }
            Err(error) => {
                warn!(%error, generation = self.generation, "analysis failed");
                SessionState::Failed(error)
            }
        };
    }
}
