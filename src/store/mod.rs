//! Bounded, ordered, deduplicating capture log.
//!
//! Newest-first with FIFO tail eviction at the cap. The in-memory sequence
//! mirrors the backend exactly: mutations hit the backend first and only
//! touch memory once persistence succeeded.

mod backend;
mod sqlite;

pub use backend::{MemoryBackend, StorageBackend};
pub use sqlite::SqliteBackend;

use anyhow::{Context, Result};
use log::info;

use crate::models::{CaptureRecord, CaptureType, Stats};

pub struct CaptureStore {
    records: Vec<CaptureRecord>,
    backend: Box<dyn StorageBackend>,
    max_records: usize,
    max_matches: usize,
}

impl CaptureStore {
    /// Loads the persisted log through `backend`.
    pub fn open(
        mut backend: Box<dyn StorageBackend>,
        max_records: usize,
        max_matches: usize,
    ) -> Result<Self> {
        let mut records = backend.load().context("failed to load capture log")?;
        records.truncate(max_records);
        info!("Capture store opened with {} records", records.len());

        Ok(Self {
            records,
            backend,
            max_records,
            max_matches,
        })
    }

    /// Appends at the head. Returns `Ok(false)` without storing when the
    /// most recent record carries the identical `(content, ai_tool, kind)`
    /// triple; non-adjacent repeats are stored normally.
    pub fn append(&mut self, record: CaptureRecord) -> Result<bool> {
        if let Some(last) = self.records.first() {
            let is_duplicate = last.content == record.content
                && last.ai_tool == record.ai_tool
                && last.kind == record.kind;
            if is_duplicate {
                info!("Duplicate capture detected, skipping save");
                return Ok(false);
            }
        }

        self.backend
            .append(&record, self.max_records)
            .context("failed to persist capture record")?;

        self.records.insert(0, record);
        self.records.truncate(self.max_records);
        Ok(true)
    }

    /// Case-insensitive substring search over content, restricted to `kind`.
    /// Results are deduplicated by exact content, capped, and scanned in
    /// store order so the newest match of each content wins.
    pub fn find_matching(&self, query: &str, kind: CaptureType) -> Vec<CaptureRecord> {
        let query = query.to_lowercase();
        let mut matches: Vec<CaptureRecord> = Vec::new();

        for record in &self.records {
            if record.kind == kind && record.content.to_lowercase().contains(&query) {
                if !matches.iter().any(|m| m.content == record.content) {
                    matches.push(record.clone());
                }
            }
            if matches.len() >= self.max_matches {
                break;
            }
        }

        matches
    }

    pub fn clear(&mut self) -> Result<()> {
        self.backend.clear().context("failed to clear capture log")?;
        self.records.clear();
        Ok(())
    }

    /// Full ordered snapshot, newest first.
    pub fn all(&self) -> Vec<CaptureRecord> {
        self.records.clone()
    }

    pub fn stats(&self) -> Stats {
        Stats {
            total: self.records.len(),
            tokens: self.records.iter().map(|r| u64::from(r.tokens)).sum(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
