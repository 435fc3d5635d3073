//! Result sinks — where terminal records go
//!
//! The core makes no assumption about storage medium: a sink receives the
//! terminal record and owns all persistence and formatting concerns.

mod sqlite;

pub use sqlite::{RunSummary, SqliteSink};

use crate::record::ResearchRecord;
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from delivering a terminal record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Consumer of terminal research records.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, record: &ResearchRecord) -> SinkResult<()>;
}

/// In-memory sink for tests and embedding.
#[derive(Debug, Default)]
pub struct MemorySink {
    delivered: Mutex<Vec<ResearchRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records delivered so far, in delivery order.
    pub fn records(&self) -> Vec<ResearchRecord> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn deliver(&self, record: &ResearchRecord) -> SinkResult<()> {
        self.delivered.lock().unwrap().push(record.clone());
        Ok(())
    }
}
