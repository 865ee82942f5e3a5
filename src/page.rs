//! Per-page-context wiring.
//!
//! One [`PageContext`] per tab: it owns the detector, the coordinator and
//! the suggestion service, plus the dispatch task that moves detector
//! signals into the coordinator. Contexts share nothing with each other;
//! they all funnel into the store through their [`StoreHandle`] clone.

use anyhow::{Context, Result};
use log::info;
use tokio::{sync::Mutex, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{
    config::CaptureConfig,
    coordinator::CaptureCoordinator,
    detector::{DomEvent, Signal, SignalDetector},
    models::{tool::host_of, AiTool, CaptureRecord},
    service::StoreHandle,
    suggest::SuggestionService,
};

pub struct PageContext {
    detector: SignalDetector,
    coordinator: CaptureCoordinator,
    suggestions: SuggestionService,
    ai_tool: AiTool,
    shutdown: CancellationToken,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl PageContext {
    /// Builds a fresh context for a loaded page. Constructed on page load,
    /// torn down on navigation/unload; a reload simply makes a new one.
    pub fn new(store: StoreHandle, page_url: &str, config: CaptureConfig) -> Self {
        let ai_tool = AiTool::from_host(host_of(page_url));
        info!("Page context starting for {} ({})", page_url, ai_tool.as_str());

        let (detector, mut signals) = SignalDetector::new(&config);
        let coordinator = CaptureCoordinator::new(store.clone(), ai_tool, page_url, &config);
        let suggestions = SuggestionService::new(store, detector.clone(), &config);

        let shutdown = CancellationToken::new();
        let dispatch = {
            let coordinator = coordinator.clone();
            let token = shutdown.clone();
            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        signal = signals.recv() => match signal {
                            Some(Signal::PromptSubmitted { content }) => {
                                coordinator.prompt_submitted(content).await;
                            }
                            Some(Signal::ResponseAppeared { content }) => {
                                coordinator.response_appeared(content).await;
                            }
                            None => break,
                        },
                        _ = token.cancelled() => break,
                    }
                }
            })
        };

        Self {
            detector,
            coordinator,
            suggestions,
            ai_tool,
            shutdown,
            dispatch: Mutex::new(Some(dispatch)),
        }
    }

    /// Feeds one raw DOM event through the detector.
    pub async fn handle_event(&self, event: DomEvent) {
        self.detector.handle_event(event).await;
    }

    /// Navigation signal (pushed by the embedder or its URL poller).
    pub async fn url_changed(&self, url: &str) {
        self.coordinator.set_session_url(url).await;
    }

    /// Suggestions for the current partial input.
    pub async fn suggest(&self, query: &str) -> Vec<CaptureRecord> {
        self.suggestions.suggest(query).await
    }

    /// The user picked a suggestion; keeps the detector's buffer in sync
    /// with the injected text.
    pub async fn apply_selection(&self, content: &str) {
        self.suggestions.apply_selection(content).await;
    }

    pub fn ai_tool(&self) -> AiTool {
        self.ai_tool
    }

    /// Stops the dispatch task and cancels any armed timers. A pending
    /// prompt that never saw its response is dropped with the page, the
    /// same way a reload would drop it.
    pub async fn teardown(&self) -> Result<()> {
        self.shutdown.cancel();
        self.detector.shutdown().await;
        self.coordinator.shutdown().await;

        if let Some(handle) = self.dispatch.lock().await.take() {
            handle
                .await
                .context("dispatch task failed to join")?;
        }
        info!("Page context torn down");
        Ok(())
    }
}
