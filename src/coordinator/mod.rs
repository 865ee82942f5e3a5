//! Capture coordinator.
//!
//! Reconciles the timing mismatch between prompt submission and response
//! arrival: a submitted prompt is held as a [`PendingCapture`] until the
//! response shows up, a newer prompt supersedes it, or the safety timer
//! decides to persist it anyway. The timer guarantees a queued prompt is
//! never silently lost when the response heuristics miss.
//!
//! Every transition happens behind one mutex; event handlers never observe
//! a half-updated state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{info, warn};
use tokio::{sync::Mutex, task::JoinHandle, time};

use crate::{
    config::CaptureConfig,
    models::{AiTool, CaptureType},
    service::StoreHandle,
};

/// A submitted prompt awaiting its response. At most one alive per page
/// context; exists only between submission and finalize.
#[derive(Debug, Clone)]
pub struct PendingCapture {
    pub content: String,
    pub queued_at: DateTime<Utc>,
    pub session_url: String,
}

struct CoordinatorState {
    pending: Option<PendingCapture>,
    session_url: String,
}

#[derive(Clone)]
pub struct CaptureCoordinator {
    state: Arc<Mutex<CoordinatorState>>,
    store: StoreHandle,
    ai_tool: AiTool,
    safety_timer: Arc<Mutex<Option<JoinHandle<()>>>>,
    safety_timeout: Duration,
}

impl CaptureCoordinator {
    pub fn new(
        store: StoreHandle,
        ai_tool: AiTool,
        session_url: &str,
        config: &CaptureConfig,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(CoordinatorState {
                pending: None,
                session_url: session_url.to_string(),
            })),
            store,
            ai_tool,
            safety_timer: Arc::new(Mutex::new(None)),
            safety_timeout: config.safety_timeout,
        }
    }

    /// A prompt was submitted. Any previously pending prompt is finalized
    /// first (never dropped), then the new one is queued and the safety
    /// timer re-armed.
    pub async fn prompt_submitted(&self, content: String) {
        self.disarm_safety_timer().await;

        let superseded = self.state.lock().await.pending.take();
        if let Some(old) = superseded {
            info!("New prompt supersedes pending one; finalizing the old prompt first");
            self.persist_prompt(old).await;
        }

        {
            let mut state = self.state.lock().await;
            state.pending = Some(PendingCapture {
                content,
                queued_at: Utc::now(),
                session_url: state.session_url.clone(),
            });
        }
        info!("Prompt queued, waiting for response");

        self.arm_safety_timer().await;
    }

    /// A response finished streaming. The pending prompt (if any) is
    /// finalized first so the pair lands in submission order, then the
    /// response is persisted against the latest known session URL.
    pub async fn response_appeared(&self, content: String) {
        self.finalize_pending().await;

        let session_url = self.state.lock().await.session_url.clone();
        match self
            .store
            .capture(CaptureType::Response, &content, self.ai_tool, &session_url)
            .await
        {
            Ok(true) => info!("Saved response"),
            Ok(false) => {}
            Err(err) => warn!("Failed to save response: {err:#}"),
        }
    }

    /// The page navigated while we may be waiting; the pending prompt keeps
    /// tracking the freshest URL so it is finalized against the right one.
    pub async fn set_session_url(&self, url: &str) {
        let mut state = self.state.lock().await;
        state.session_url = url.to_string();
        if let Some(pending) = state.pending.as_mut() {
            pending.session_url = url.to_string();
        }
    }

    /// Persists the pending prompt (if any) and disarms the safety timer.
    pub async fn finalize_pending(&self) {
        self.disarm_safety_timer().await;
        self.finalize_inner().await;
    }

    pub async fn is_pending(&self) -> bool {
        self.state.lock().await.pending.is_some()
    }

    /// Aborts the safety timer without finalizing; used on page teardown.
    pub async fn shutdown(&self) {
        self.disarm_safety_timer().await;
    }

    async fn finalize_inner(&self) {
        let pending = self.state.lock().await.pending.take();
        if let Some(pending) = pending {
            self.persist_prompt(pending).await;
        }
    }

    async fn persist_prompt(&self, pending: PendingCapture) {
        match self
            .store
            .capture(
                CaptureType::Prompt,
                &pending.content,
                self.ai_tool,
                &pending.session_url,
            )
            .await
        {
            Ok(true) => info!("Saved prompt"),
            Ok(false) => {}
            Err(err) => warn!("Failed to save prompt: {err:#}"),
        }
    }

    async fn arm_safety_timer(&self) {
        let mut guard = self.safety_timer.lock().await;
        if let Some(handle) = guard.take() {
            handle.abort();
        }

        let coordinator = self.clone();
        let timeout = self.safety_timeout;
        *guard = Some(tokio::spawn(async move {
            time::sleep(timeout).await;
            info!("No response observed within safety window; finalizing pending prompt");
            // Detach rather than abort: this task is the timer.
            coordinator.safety_timer.lock().await.take();
            coordinator.finalize_inner().await;
        }));
    }

    async fn disarm_safety_timer(&self) {
        if let Some(handle) = self.safety_timer.lock().await.take() {
            handle.abort();
        }
    }
}
