//! Deedtrace: Property Ownership Research Engine
//!
//! Resolves the current legal owner and best-known contact number of a
//! property by orchestrating independent, unreliable data sources and
//! reconciling their conflicting evidence into one ranked answer.
//!
//! # Core Concepts
//!
//! - **Collectors**: opaque data-source steps producing partial updates
//! - **Step graph**: conditional branching, parallel fan-out, join barriers
//! - **Merge**: a declared reducer per record field, commutative where
//!   branches race
//! - **Reconciliation**: dedup and confidence labels over identity and
//!   phone evidence
//!
//! # Example
//!
//! ```no_run
//! use deedtrace::{FixtureSources, MemorySink, ResearchApi, ResearchConfig};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), deedtrace::ResearchError> {
//! let api = ResearchApi::standard(
//!     &FixtureSources::clients(),
//!     ResearchConfig::default(),
//!     Arc::new(MemorySink::new()),
//! )?;
//! let record = api.run_research("798 Lexington Avenue, New York, NY").await?;
//! println!("owner: {:?}", record.primary_owner);
//! # Ok(())
//! # }
//! ```

mod api;
pub mod collect;
mod pipeline;
pub mod reconcile;
pub mod record;
pub mod sink;
pub mod workflow;

pub use api::{ResearchApi, ResearchConfig, ResearchError};
pub use collect::{
    CancellationToken, Collector, CollectorError, CollectorOutput, CollectorResult,
    FixtureSources, SourceClients,
};
pub use pipeline::standard_graph;
pub use reconcile::{EvidenceReconciler, ReconcileConfig, ReconcileOutcome};
pub use record::{
    merge, Confidence, IndividualContact, OwnerCandidate, OwnerType, PhoneCandidate,
    PhoneValidation, RecordUpdate, ResearchRecord, RunId, SourceId, SourceReport, Stage,
};
pub use sink::{MemorySink, ResultSink, SinkError, SqliteSink};
pub use workflow::{
    EngineConfig, GraphError, StepEdge, StepGraph, StepGraphBuilder, StepId, WorkflowEngine,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
