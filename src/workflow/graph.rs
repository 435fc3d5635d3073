//! Step graph construction and validation
//!
//! Graphs are built once through `StepGraphBuilder` and immutable
//! afterwards. All wiring mistakes (dangling edges, undeclared join
//! predecessors, missing start) surface as `GraphError` at build time,
//! before any run starts.

use super::edge::StepEdge;
use super::step::StepId;
use crate::collect::Collector;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while constructing a graph. These are the only fatal
/// errors in the system; a running graph never raises them.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("no start step declared")]
    MissingStart,

    #[error("start step '{0}' is not in the graph")]
    UnknownStart(String),

    #[error("duplicate step '{0}'")]
    DuplicateStep(String),

    #[error("edge from unknown step '{0}'")]
    UnknownEdgeSource(String),

    #[error("edge from '{from}' to unknown step '{to}'")]
    DanglingEdge { from: String, to: String },

    #[error("join declared on unknown step '{0}'")]
    UnknownJoinTarget(String),

    #[error("join '{join}' declares unknown predecessor '{predecessor}'")]
    UnknownJoinPredecessor { join: String, predecessor: String },

    #[error("join '{join}' predecessor '{predecessor}' has no edge to the join")]
    JoinPredecessorNotWired { join: String, predecessor: String },

    #[error("join '{0}' declares no predecessors")]
    EmptyJoin(String),
}

/// An immutable, validated workflow graph.
///
/// Owns the step-to-collector bindings and the edge list; the engine only
/// reads it.
pub struct StepGraph {
    start: StepId,
    steps: HashMap<StepId, Arc<dyn Collector>>,
    edges: Vec<StepEdge>,
    joins: HashMap<StepId, BTreeSet<StepId>>,
    fatal: HashSet<StepId>,
}

impl StepGraph {
    /// Start building a graph.
    pub fn builder() -> StepGraphBuilder {
        StepGraphBuilder::new()
    }

    pub fn start(&self) -> &StepId {
        &self.start
    }

    pub fn contains(&self, step: &StepId) -> bool {
        self.steps.contains_key(step)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The collector bound to a step. Validated graphs always resolve.
    pub fn collector(&self, step: &StepId) -> Option<Arc<dyn Collector>> {
        self.steps.get(step).cloned()
    }

    /// Outgoing edges of a step, in declaration order.
    pub fn outgoing<'a>(&'a self, step: &'a StepId) -> impl Iterator<Item = &'a StepEdge> + 'a {
        self.edges.iter().filter(move |e| e.from() == step)
    }

    /// The declared predecessor set if the step is a join barrier.
    pub fn join_set(&self, step: &StepId) -> Option<&BTreeSet<StepId>> {
        self.joins.get(step)
    }

    /// Whether a fault in this step fails the whole run.
    pub fn is_fatal(&self, step: &StepId) -> bool {
        self.fatal.contains(step)
    }
}

impl std::fmt::Debug for StepGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepGraph")
            .field("start", &self.start)
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .field("edges", &self.edges)
            .field("joins", &self.joins)
            .finish()
    }
}

/// Builder producing a validated `StepGraph`.
#[derive(Default)]
pub struct StepGraphBuilder {
    start: Option<StepId>,
    steps: HashMap<StepId, Arc<dyn Collector>>,
    duplicates: Vec<StepId>,
    edges: Vec<StepEdge>,
    joins: HashMap<StepId, BTreeSet<StepId>>,
    fatal: HashSet<StepId>,
}

impl StepGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step bound to a collector.
    pub fn step(mut self, id: impl Into<StepId>, collector: Arc<dyn Collector>) -> Self {
        let id = id.into();
        if self.steps.insert(id.clone(), collector).is_some() {
            self.duplicates.push(id);
        }
        self
    }

    /// Declare the start step.
    pub fn start(mut self, id: impl Into<StepId>) -> Self {
        self.start = Some(id.into());
        self
    }

    /// Add an unconditional edge.
    pub fn edge(mut self, from: impl Into<StepId>, to: impl Into<StepId>) -> Self {
        self.edges.push(StepEdge::next(from, to));
        self
    }

    /// Add a conditional edge.
    pub fn conditional(
        mut self,
        from: impl Into<StepId>,
        label: impl Into<String>,
        predicate: impl Fn(&crate::record::ResearchRecord) -> bool + Send + Sync + 'static,
        when_true: impl Into<StepId>,
        when_false: impl Into<StepId>,
    ) -> Self {
        self.edges
            .push(StepEdge::conditional(from, label, predicate, when_true, when_false));
        self
    }

    /// Add a fan-out edge.
    pub fn fan_out(
        mut self,
        from: impl Into<StepId>,
        to: impl IntoIterator<Item = impl Into<StepId>>,
    ) -> Self {
        self.edges.push(StepEdge::fan_out(from, to));
        self
    }

    /// Declare a join barrier: `target` becomes eligible only once every
    /// step in `predecessors` has completed.
    pub fn join(
        mut self,
        target: impl Into<StepId>,
        predecessors: impl IntoIterator<Item = impl Into<StepId>>,
    ) -> Self {
        let set = self
            .joins
            .entry(target.into())
            .or_default();
        set.extend(predecessors.into_iter().map(Into::into));
        self
    }

    /// Mark a step as fatal: a fault in it fails the run.
    pub fn fatal(mut self, step: impl Into<StepId>) -> Self {
        self.fatal.insert(step.into());
        self
    }

    /// Validate the wiring and produce the immutable graph.
    pub fn build(self) -> Result<StepGraph, GraphError> {
        if let Some(dup) = self.duplicates.first() {
            return Err(GraphError::DuplicateStep(dup.to_string()));
        }
        let start = self.start.ok_or(GraphError::MissingStart)?;
        if !self.steps.contains_key(&start) {
            return Err(GraphError::UnknownStart(start.to_string()));
        }
        for edge in &self.edges {
            if !self.steps.contains_key(edge.from()) {
                return Err(GraphError::UnknownEdgeSource(edge.from().to_string()));
            }
            for target in edge.possible_targets() {
                if !self.steps.contains_key(target) {
                    return Err(GraphError::DanglingEdge {
                        from: edge.from().to_string(),
                        to: target.to_string(),
                    });
                }
            }
        }
        for (join, predecessors) in &self.joins {
            if !self.steps.contains_key(join) {
                return Err(GraphError::UnknownJoinTarget(join.to_string()));
            }
            if predecessors.is_empty() {
                return Err(GraphError::EmptyJoin(join.to_string()));
            }
            for predecessor in predecessors {
                if !self.steps.contains_key(predecessor) {
                    return Err(GraphError::UnknownJoinPredecessor {
                        join: join.to_string(),
                        predecessor: predecessor.to_string(),
                    });
                }
                // The barrier can only fire if the last-completing
                // predecessor triggers an enqueue attempt, so every
                // predecessor needs an edge that can reach the join.
                let wired = self.edges.iter().any(|e| {
                    e.from() == predecessor
                        && e.possible_targets().iter().any(|t| *t == join)
                });
                if !wired {
                    return Err(GraphError::JoinPredecessorNotWired {
                        join: join.to_string(),
                        predecessor: predecessor.to_string(),
                    });
                }
            }
        }
        Ok(StepGraph {
            start,
            steps: self.steps,
            edges: self.edges,
            joins: self.joins,
            fatal: self.fatal,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::{CancellationToken, Collector, CollectorOutput, CollectorResult};
    use crate::record::ResearchRecord;
    use async_trait::async_trait;

    struct NoopCollector(&'static str);

    #[async_trait]
    impl Collector for NoopCollector {
        fn id(&self) -> &str {
            self.0
        }
        fn name(&self) -> &str {
            "Noop"
        }
        async fn collect(
            &self,
            _snapshot: &ResearchRecord,
            _cancel: &CancellationToken,
        ) -> CollectorResult {
            Ok(CollectorOutput::default())
        }
    }

    fn noop(id: &'static str) -> Arc<dyn Collector> {
        Arc::new(NoopCollector(id))
    }

    #[test]
    fn build_validates_start() {
        let err = StepGraph::builder().step("a", noop("a")).build();
        assert!(matches!(err, Err(GraphError::MissingStart)));

        let err = StepGraph::builder()
            .step("a", noop("a"))
            .start("missing")
            .build();
        assert!(matches!(err, Err(GraphError::UnknownStart(_))));
    }

    #[test]
    fn build_rejects_dangling_edge() {
        let err = StepGraph::builder()
            .step("a", noop("a"))
            .start("a")
            .edge("a", "ghost")
            .build();
        assert!(matches!(err, Err(GraphError::DanglingEdge { .. })));
    }

    #[test]
    fn build_rejects_undeclared_join_predecessor() {
        let err = StepGraph::builder()
            .step("a", noop("a"))
            .step("j", noop("j"))
            .start("a")
            .edge("a", "j")
            .join("j", ["a", "ghost"])
            .build();
        assert!(matches!(
            err,
            Err(GraphError::UnknownJoinPredecessor { .. })
        ));
    }

    #[test]
    fn build_rejects_unwired_join_predecessor() {
        // b never has an edge to j, so the barrier could never fire
        let err = StepGraph::builder()
            .step("a", noop("a"))
            .step("b", noop("b"))
            .step("j", noop("j"))
            .start("a")
            .edge("a", "j")
            .join("j", ["a", "b"])
            .build();
        assert!(matches!(
            err,
            Err(GraphError::JoinPredecessorNotWired { .. })
        ));
    }

    #[test]
    fn build_rejects_duplicate_step() {
        let err = StepGraph::builder()
            .step("a", noop("a"))
            .step("a", noop("a"))
            .start("a")
            .build();
        assert!(matches!(err, Err(GraphError::DuplicateStep(_))));
    }

    #[test]
    fn valid_graph_builds() {
        let graph = StepGraph::builder()
            .step("a", noop("a"))
            .step("b", noop("b"))
            .step("c", noop("c"))
            .step("j", noop("j"))
            .start("a")
            .fan_out("a", ["b", "c"])
            .edge("b", "j")
            .edge("c", "j")
            .join("j", ["b", "c"])
            .build()
            .unwrap();

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.start().as_str(), "a");
        assert!(graph.join_set(&StepId::from("j")).is_some());
        assert_eq!(graph.outgoing(&StepId::from("a")).count(), 1);
    }
}
