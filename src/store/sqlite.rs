use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use log::error;
use rusqlite::{params, Connection};

use crate::models::{AiTool, CaptureRecord, CaptureType, Category};

use super::backend::StorageBackend;

const CURRENT_SCHEMA_VERSION: i32 = 1;

/// Durable backend holding the capture log in a single `captures` table.
/// Insertion order is the ordering authority: `load` returns rows by
/// `rowid DESC`, so the newest append always comes back first even when
/// timestamps collide.
pub struct SqliteBackend {
    conn: Connection,
    db_path: PathBuf,
}

impl SqliteBackend {
    pub fn open(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let mut conn = Connection::open(&db_path)
            .with_context(|| format!("failed to open capture database {}", db_path.display()))?;

        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            error!("Failed to enable WAL mode: {err}");
        }

        run_migrations(&mut conn).context("failed to run capture database migrations")?;

        Ok(Self { conn, db_path })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }
}

impl StorageBackend for SqliteBackend {
    fn load(&mut self) -> Result<Vec<CaptureRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, type, content, ai_tool, timestamp, session_url, tokens, category
             FROM captures
             ORDER BY rowid DESC",
        )?;

        let mut rows = stmt.query([])?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(CaptureRecord {
                id: row.get::<_, String>(0)?,
                kind: CaptureType::from_str(&row.get::<_, String>(1)?)?,
                content: row.get::<_, String>(2)?,
                ai_tool: AiTool::from_str(&row.get::<_, String>(3)?)?,
                timestamp: parse_datetime(&row.get::<_, String>(4)?)?,
                session_url: row.get::<_, String>(5)?,
                tokens: u32::try_from(row.get::<_, i64>(6)?)
                    .map_err(|_| anyhow!("negative token count in stored record"))?,
                category: Category::from_str(&row.get::<_, String>(7)?)?,
            });
        }

        Ok(records)
    }

    fn append(&mut self, record: &CaptureRecord, max_records: usize) -> Result<()> {
        let tx = self
            .conn
            .transaction()
            .context("failed to open append transaction")?;

        tx.execute(
            "INSERT INTO captures (id, type, content, ai_tool, timestamp, session_url, tokens, category)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id,
                record.kind.as_str(),
                record.content,
                record.ai_tool.as_str(),
                record.timestamp.to_rfc3339(),
                record.session_url,
                i64::from(record.tokens),
                record.category.as_str(),
            ],
        )
        .context("failed to insert capture record")?;

        // Evict everything past the cap, oldest rows first.
        tx.execute(
            "DELETE FROM captures
             WHERE rowid NOT IN (SELECT rowid FROM captures ORDER BY rowid DESC LIMIT ?1)",
            params![max_records as i64],
        )
        .context("failed to prune capture log")?;

        tx.commit().context("failed to commit capture append")
    }

    fn clear(&mut self) -> Result<()> {
        self.conn
            .execute("DELETE FROM captures", [])
            .context("failed to clear capture log")?;
        Ok(())
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn run_migrations(conn: &mut Connection) -> Result<()> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "capture database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    if version == CURRENT_SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS captures (
            id          TEXT PRIMARY KEY,
            type        TEXT NOT NULL,
            content     TEXT NOT NULL,
            ai_tool     TEXT NOT NULL,
            timestamp   TEXT NOT NULL,
            session_url TEXT NOT NULL,
            tokens      INTEGER NOT NULL,
            category    TEXT NOT NULL
        );",
    )
    .context("failed to create captures table")?;

    tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
        .context("failed to update user_version pragma")?;
    tx.commit().context("failed to commit migrations")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(content: &str) -> CaptureRecord {
        CaptureRecord::new(
            CaptureType::Prompt,
            content,
            AiTool::ChatGpt,
            "https://chatgpt.com/c/1",
        )
    }

    #[test]
    fn round_trips_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captures.sqlite3");

        {
            let mut backend = SqliteBackend::open(path.clone()).unwrap();
            backend.append(&record("first prompt"), 5000).unwrap();
            backend.append(&record("second prompt"), 5000).unwrap();
        }

        let mut reopened = SqliteBackend::open(path).unwrap();
        let records = reopened.load().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "second prompt");
        assert_eq!(records[1].content, "first prompt");
        assert_eq!(records[0].ai_tool, AiTool::ChatGpt);
        assert_eq!(records[0].kind, CaptureType::Prompt);
    }

    #[test]
    fn append_prunes_past_cap() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = SqliteBackend::open(dir.path().join("c.sqlite3")).unwrap();

        for i in 0..6 {
            backend.append(&record(&format!("prompt number {i}")), 4).unwrap();
        }

        let records = backend.load().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[0].content, "prompt number 5");
        assert_eq!(records[3].content, "prompt number 2");
    }

    #[test]
    fn clear_empties_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = SqliteBackend::open(dir.path().join("c.sqlite3")).unwrap();
        backend.append(&record("some prompt"), 5000).unwrap();
        backend.clear().unwrap();
        assert!(backend.load().unwrap().is_empty());
    }
}
