use anyhow::{anyhow, Result};

use crate::models::CaptureRecord;

/// Persistence collaborator behind the capture store.
///
/// The store calls `append`/`clear` before committing its own in-memory
/// state, so an implementation that fails must fail without partial writes.
/// All calls happen on the store-owner thread; implementations only need to
/// be `Send`.
pub trait StorageBackend: Send {
    /// Loads the persisted sequence, newest first.
    fn load(&mut self) -> Result<Vec<CaptureRecord>>;

    /// Persists one new record at the head and prunes anything beyond
    /// `max_records`, as a single atomic mutation.
    fn append(&mut self, record: &CaptureRecord, max_records: usize) -> Result<()>;

    /// Drops all persisted records.
    fn clear(&mut self) -> Result<()>;
}

/// Volatile backend for tests. `fail_next_append` injects a persistence
/// failure so callers can verify nothing diverges on error.
#[derive(Default)]
pub struct MemoryBackend {
    records: Vec<CaptureRecord>,
    pub fail_next_append: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently persisted, for assertions.
    pub fn persisted_len(&self) -> usize {
        self.records.len()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&mut self) -> Result<Vec<CaptureRecord>> {
        Ok(self.records.clone())
    }

    fn append(&mut self, record: &CaptureRecord, max_records: usize) -> Result<()> {
        if self.fail_next_append {
            self.fail_next_append = false;
            return Err(anyhow!("injected persistence failure"));
        }
        self.records.insert(0, record.clone());
        self.records.truncate(max_records);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        Ok(())
    }
}
