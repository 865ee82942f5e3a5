//! Background store-owner service.
//!
//! The capture store has exactly one owner: a dedicated worker thread that
//! receives boxed closures over an mpsc channel and replies over oneshot
//! channels. Any number of page contexts hold clones of [`StoreHandle`];
//! their requests are linearized by the channel, which gives the
//! last-writer-appends-on-top ordering the log requires.

use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use log::{error, info};
use tokio::sync::oneshot;

use crate::{
    config::CaptureConfig,
    export::write_snapshot,
    models::{AiTool, CaptureRecord, CaptureType, Stats},
    store::{CaptureStore, StorageBackend},
};

type StoreTask = Box<dyn FnOnce(&mut CaptureStore) + Send + 'static>;

enum StoreCommand {
    Execute(StoreTask),
    Shutdown,
}

struct ServiceInner {
    sender: mpsc::Sender<StoreCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for ServiceInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(StoreCommand::Shutdown) {
                error!("Failed to send shutdown to store thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join store thread: {join_err:?}");
            }
        }
    }
}

/// Clonable handle to the background store owner.
#[derive(Clone)]
pub struct StoreHandle {
    inner: Arc<ServiceInner>,
    min_prompt_chars: usize,
    min_query_chars: usize,
}

impl StoreHandle {
    /// Spawns the store-owner thread. The backend is constructed and the
    /// persisted log loaded on that thread; this fails if either does.
    pub fn spawn<B, F>(make_backend: F, config: &CaptureConfig) -> Result<Self>
    where
        B: StorageBackend + 'static,
        F: FnOnce() -> Result<B> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<StoreCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let max_records = config.max_records;
        let max_matches = config.max_suggestions;

        let worker = thread::Builder::new()
            .name("promptbin-store".into())
            .spawn(move || {
                let mut store = {
                    let opened = make_backend().and_then(|backend| {
                        CaptureStore::open(Box::new(backend), max_records, max_matches)
                    });
                    match opened {
                        Ok(store) => {
                            if ready_tx.send(Ok(())).is_err() {
                                error!("Store initialization receiver dropped before ready signal");
                                return;
                            }
                            store
                        }
                        Err(err) => {
                            let _ = ready_tx.send(Err(err));
                            return;
                        }
                    }
                };

                while let Ok(command) = command_rx.recv() {
                    match command {
                        StoreCommand::Execute(task) => task(&mut store),
                        StoreCommand::Shutdown => break,
                    }
                }

                info!("Store thread shutting down");
            })
            .context("failed to spawn store worker thread")?;

        ready_rx
            .recv()
            .context("store worker exited before signaling readiness")??;

        Ok(Self {
            inner: Arc::new(ServiceInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            min_prompt_chars: config.min_prompt_chars,
            min_query_chars: config.min_query_chars,
        })
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut CaptureStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = StoreCommand::Execute(Box::new(move |store| {
            let result = task(store);
            if reply_tx.send(result).is_err() {
                error!("Store caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to store thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("store thread terminated unexpectedly"))?
    }

    /// Builds and appends a capture record. Content shorter than the minimum
    /// is silently rejected; an adjacent duplicate is a normal `Ok(false)`.
    pub async fn capture(
        &self,
        kind: CaptureType,
        content: &str,
        ai_tool: AiTool,
        session_url: &str,
    ) -> Result<bool> {
        let content = content.trim().to_string();
        if content.chars().count() < self.min_prompt_chars {
            return Ok(false);
        }

        let session_url = session_url.to_string();
        self.execute(move |store| {
            let record = CaptureRecord::new(kind, &content, ai_tool, &session_url);
            store.append(record)
        })
        .await
    }

    /// Prompt-history search for the suggestion overlay; empty below the
    /// minimum query length.
    pub async fn search_history(&self, query: &str) -> Result<Vec<CaptureRecord>> {
        let query = query.trim().to_string();
        if query.chars().count() < self.min_query_chars {
            return Ok(Vec::new());
        }

        self.execute(move |store| Ok(store.find_matching(&query, CaptureType::Prompt)))
            .await
    }

    pub async fn clear_all(&self) -> Result<()> {
        self.execute(|store| store.clear()).await
    }

    pub async fn get_all_captures(&self) -> Result<Vec<CaptureRecord>> {
        self.execute(|store| Ok(store.all())).await
    }

    pub async fn get_stats(&self) -> Result<Stats> {
        self.execute(|store| Ok(store.stats())).await
    }

    /// Writes the full capture log as a pretty-printed JSON array into
    /// `dir`, returning the dated snapshot path.
    pub async fn export_snapshot(&self, dir: &Path) -> Result<PathBuf> {
        let dir = dir.to_path_buf();
        self.execute(move |store| write_snapshot(&store.all(), &dir))
            .await
    }
}
