//! Transport-independent API layer
//!
//! `ResearchApi` is the single entry point for consumers. Front ends (CLI,
//! direct embedding) call it; they never reach into the engine, the graph,
//! or the sink directly. A run always completes with a record — diagnostics
//! land in `record.errors`, not in the `Result`.

use crate::collect::SourceClients;
use crate::pipeline::standard_graph;
use crate::reconcile::ReconcileConfig;
use crate::record::{ResearchRecord, RunId, Stage};
use crate::sink::ResultSink;
use crate::workflow::{EngineConfig, GraphError, StepGraph, WorkflowEngine};
use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Errors that prevent a run from starting. Once a run starts it always
/// finishes with a record.
#[derive(Debug, Error)]
pub enum ResearchError {
    #[error("address must not be empty")]
    EmptyAddress,

    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// Top-level configuration for a research runtime.
#[derive(Debug, Clone, Default)]
pub struct ResearchConfig {
    pub engine: EngineConfig,
    pub reconcile: ReconcileConfig,
}

/// Single entry point for running property research.
pub struct ResearchApi {
    engine: WorkflowEngine,
    graph: StepGraph,
    sink: Arc<dyn ResultSink>,
    /// Finished runs kept for listing and lookup by concurrent callers
    runs: DashMap<RunId, ResearchRecord>,
}

impl ResearchApi {
    /// Assemble an API over an already-built graph.
    pub fn new(graph: StepGraph, engine: WorkflowEngine, sink: Arc<dyn ResultSink>) -> Self {
        Self {
            engine,
            graph,
            sink,
            runs: DashMap::new(),
        }
    }

    /// Assemble the standard pipeline over the given source clients.
    pub fn standard(
        clients: &SourceClients,
        config: ResearchConfig,
        sink: Arc<dyn ResultSink>,
    ) -> Result<Self, ResearchError> {
        let graph = standard_graph(clients, config.reconcile)?;
        Ok(Self::new(graph, WorkflowEngine::new(config.engine), sink))
    }

    /// Research one address to completion.
    ///
    /// Synchronous from the caller's perspective: resolves once the whole
    /// graph has terminated and the record was handed to the sink. Sink
    /// failures are folded into the record's diagnostics, never raised.
    pub async fn run_research(&self, address: &str) -> Result<ResearchRecord, ResearchError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ResearchError::EmptyAddress);
        }

        let record = ResearchRecord::new(address);
        let mut record = self.engine.run(&self.graph, record).await;

        if let Err(e) = self.sink.deliver(&record).await {
            warn!(error = %e, "result sink delivery failed");
            record.errors.push(format!("result sink: {}", e));
        }

        self.runs.insert(record.run_id, record.clone());
        Ok(record)
    }

    /// A finished run by id.
    pub fn run(&self, id: &RunId) -> Option<ResearchRecord> {
        self.runs.get(id).map(|r| r.clone())
    }

    /// Headline view of all runs held by this instance.
    pub fn list_runs(&self) -> Vec<(RunId, String, Stage)> {
        self.runs
            .iter()
            .map(|r| (r.run_id, r.address.clone(), r.stage))
            .collect()
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::FixtureSources;
    use crate::sink::MemorySink;

    fn api(sink: Arc<MemorySink>) -> ResearchApi {
        ResearchApi::standard(&FixtureSources::clients(), ResearchConfig::default(), sink)
            .unwrap()
    }

    #[tokio::test]
    async fn empty_address_is_rejected_before_running() {
        let sink = Arc::new(MemorySink::new());
        let api = api(sink.clone());
        let err = api.run_research("   ").await;
        assert!(matches!(err, Err(ResearchError::EmptyAddress)));
        assert!(sink.records().is_empty());
    }

    #[tokio::test]
    async fn run_is_registered_and_delivered() {
        let sink = Arc::new(MemorySink::new());
        let api = api(sink.clone());
        let record = api.run_research("798 Lexington Avenue").await.unwrap();
        assert_eq!(record.stage, Stage::Completed);
        assert_eq!(sink.records().len(), 1);
        assert_eq!(api.run_count(), 1);
        assert_eq!(
            api.run(&record.run_id).unwrap().address,
            "798 Lexington Avenue"
        );
        let listed = api.list_runs();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].2, Stage::Completed);
    }
}
