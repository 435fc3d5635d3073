//! Collector trait — the contract every data-source step implements
//!
//! A collector takes a read snapshot of the research record and produces a
//! partial update plus zero or more non-fatal error strings. It must not
//! mutate shared state; only the engine folds updates into the canonical
//! record. A collector that cannot produce anything useful returns an empty
//! update and reports the reason — "fail soft, report, continue".

use super::cancel::CancellationToken;
use crate::record::{RecordUpdate, ResearchRecord};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// What a collector hands back to the engine.
#[derive(Debug, Clone, Default)]
pub struct CollectorOutput {
    /// Partial update; all fields optional or empty by default
    pub update: RecordUpdate,
    /// Non-fatal errors, folded into the record's diagnostics
    pub errors: Vec<String>,
}

impl CollectorOutput {
    pub fn new(update: RecordUpdate) -> Self {
        Self {
            update,
            errors: Vec::new(),
        }
    }

    /// Best-effort empty output carrying only a progress note.
    pub fn empty(step_note: impl Into<String>) -> Self {
        Self::new(RecordUpdate::step(step_note))
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }
}

/// Faults a collector invocation can raise.
///
/// A fault never halts the run: the engine records it and keeps routing
/// with an empty update.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("malformed source response: {0}")]
    Malformed(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for collector invocations
pub type CollectorResult = Result<CollectorOutput, CollectorError>;

/// The contract data-source steps implement.
///
/// Collectors are opaque externally-sourced capabilities; the engine knows
/// nothing about their internals beyond this interface.
#[async_trait]
pub trait Collector: Send + Sync {
    /// Step identifier, unique within a graph (e.g. "registry_lookup")
    fn id(&self) -> &str;

    /// Human-readable name for logs
    fn name(&self) -> &str;

    /// Run against a read-only snapshot of the current record.
    ///
    /// Must return within the engine's configured step timeout or the
    /// invocation is treated as a fault.
    async fn collect(
        &self,
        snapshot: &ResearchRecord,
        cancel: &CancellationToken,
    ) -> CollectorResult;
}
