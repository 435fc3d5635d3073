//! SQLite-backed result store
//!
//! One row per delivered run: the headline columns for listing, plus the
//! full record as JSON for audit. Thread-safe via an internal mutex on the
//! connection.

use super::{ResultSink, SinkResult};
use crate::record::ResearchRecord;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

/// Headline view of a stored run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: String,
    pub address: String,
    pub stage: String,
    pub owner: Option<String>,
    pub contact_number: Option<String>,
    pub completed_at: Option<String>,
}

/// Result sink writing each terminal record to a SQLite database.
pub struct SqliteSink {
    conn: Mutex<Connection>,
}

impl SqliteSink {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>) -> SinkResult<Self> {
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (tests).
    pub fn open_in_memory() -> SinkResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> SinkResult<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                run_id TEXT PRIMARY KEY,
                address TEXT NOT NULL,
                stage TEXT NOT NULL,
                owner TEXT,
                contact_number TEXT,
                completed_at TEXT,
                record_json TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_runs_address
                ON runs(address);
            "#,
        )?;
        Ok(())
    }

    /// Most recently completed runs, newest first.
    pub fn recent(&self, limit: usize) -> SinkResult<Vec<RunSummary>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT run_id, address, stage, owner, contact_number, completed_at
             FROM runs ORDER BY completed_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(RunSummary {
                run_id: row.get(0)?,
                address: row.get(1)?,
                stage: row.get(2)?,
                owner: row.get(3)?,
                contact_number: row.get(4)?,
                completed_at: row.get(5)?,
            })
        })?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    /// Load the full record for a stored run.
    pub fn load(&self, run_id: &str) -> SinkResult<Option<ResearchRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT record_json FROM runs WHERE run_id = ?1")?;
        let mut rows = stmt.query(params![run_id])?;
        match rows.next()? {
            Some(row) => {
                let json: String = row.get(0)?;
                Ok(Some(serde_json::from_str(&json)?))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl ResultSink for SqliteSink {
    async fn deliver(&self, record: &ResearchRecord) -> SinkResult<()> {
        let json = serde_json::to_string(record)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO runs
                (run_id, address, stage, owner, contact_number, completed_at, record_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.run_id.to_string(),
                record.address,
                record.stage.to_string(),
                record.primary_owner,
                record.contact_number,
                record.completed_at.map(|t| t.to_rfc3339()),
                json,
            ],
        )?;
        Ok(())
    }
}
