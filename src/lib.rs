//! promptbin: passive capture pipeline for AI chat prompts and responses.
//!
//! Raw page events flow through a per-tab [`detector::SignalDetector`] into
//! a [`coordinator::CaptureCoordinator`], which persists finished captures
//! via the shared background [`service::StoreHandle`]. The store is a
//! bounded, deduplicating, newest-first log with substring search feeding
//! the [`suggest::SuggestionService`].

pub mod config;
pub mod coordinator;
pub mod detector;
pub mod estimator;
pub mod export;
pub mod models;
pub mod page;
pub mod service;
pub mod store;
pub mod suggest;

pub use config::CaptureConfig;
pub use coordinator::CaptureCoordinator;
pub use detector::{DomEvent, Signal, SignalDetector};
pub use models::{AiTool, CaptureRecord, CaptureType, Category, Stats};
pub use page::PageContext;
pub use service::StoreHandle;
pub use store::{CaptureStore, MemoryBackend, SqliteBackend, StorageBackend};
pub use suggest::SuggestionService;

/// Initializes logging (reads `RUST_LOG`, defaults to info).
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
}
