//! Workflow execution engine
//!
//! Drives a validated step graph over one research record. Collector
//! invocations run as concurrent tasks bounded by a semaphore; their
//! outputs come back over a channel and are folded into the canonical
//! record one at a time — the receive loop is the single merge critical
//! section. Collectors only ever see immutable snapshots.

use super::edge::StepEdge;
use super::graph::StepGraph;
use super::step::StepId;
use crate::collect::{CancellationToken, CollectorError, CollectorOutput};
use crate::record::{merge, RecordUpdate, ResearchRecord, Stage};
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};
use tracing::{debug, info, warn};

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Per-collector invocation timeout
    pub step_timeout: Duration,
    /// Whole-run deadline; past it, remaining branches are cancelled and
    /// folded into errors independently
    pub run_timeout: Duration,
    /// Concurrent collector invocations allowed at once
    pub max_concurrent: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            step_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(300),
            max_concurrent: 4,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_step_timeout(mut self, timeout: Duration) -> Self {
        self.step_timeout = timeout;
        self
    }

    pub fn with_run_timeout(mut self, timeout: Duration) -> Self {
        self.run_timeout = timeout;
        self
    }

    pub fn with_max_concurrent(mut self, limit: usize) -> Self {
        self.max_concurrent = limit.max(1);
        self
    }
}

/// Message sent back when a spawned step finishes, faults, or times out.
struct StepCompletion {
    step: StepId,
    outcome: Result<CollectorOutput, CollectorError>,
    elapsed_ms: u64,
}

/// Executes a step graph over one research record per call.
///
/// The engine exclusively owns the in-flight record; merges are serialized
/// in the completion loop, so field reducers see one update at a time.
#[derive(Debug, Default)]
pub struct WorkflowEngine {
    config: EngineConfig,
}

impl WorkflowEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Run the graph to termination and return the final record.
    ///
    /// A faulting step never halts the run; its outgoing edges are
    /// evaluated against whatever partial update it managed to produce.
    /// The run ends when no step is ready and none is in flight.
    pub async fn run(&self, graph: &StepGraph, record: ResearchRecord) -> ResearchRecord {
        let mut record = record;
        record.stage = record.stage.advance(Stage::Running);
        info!(address = %record.address, run_id = %record.run_id, "starting research run");

        let cancel = CancellationToken::new();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent));
        let (tx, mut rx) = mpsc::unbounded_channel::<StepCompletion>();
        let deadline = tokio::time::Instant::now() + self.config.run_timeout;

        let mut scheduled: HashSet<StepId> = HashSet::new();
        let mut completed: HashSet<StepId> = HashSet::new();
        let mut in_flight = 0usize;
        let mut fatal_faulted = false;

        self.spawn_step(
            graph,
            graph.start().clone(),
            &record,
            &tx,
            &semaphore,
            &cancel,
        );
        scheduled.insert(graph.start().clone());
        in_flight += 1;

        while in_flight > 0 {
            let completion = match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(completion)) => completion,
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        timeout_secs = self.config.run_timeout.as_secs(),
                        "run deadline passed, cancelling remaining branches"
                    );
                    cancel.cancel();
                    record.errors.push(format!(
                        "research run timed out after {} seconds",
                        self.config.run_timeout.as_secs()
                    ));
                    // Each still-running branch folds its own outcome in;
                    // no new steps are scheduled.
                    while in_flight > 0 {
                        match rx.recv().await {
                            Some(completion) => {
                                in_flight -= 1;
                                completed.insert(completion.step.clone());
                                record = fold_completion(record, completion);
                            }
                            None => break,
                        }
                    }
                    break;
                }
            };

            in_flight -= 1;
            let step = completion.step.clone();
            let faulted = completion.outcome.is_err();
            completed.insert(step.clone());
            record = fold_completion(record, completion);

            if faulted && graph.is_fatal(&step) {
                fatal_faulted = true;
            }

            for target in route(graph, &step, &record) {
                if scheduled.contains(&target) {
                    continue;
                }
                if let Some(join_set) = graph.join_set(&target) {
                    // Barrier: every declared predecessor must have
                    // completed. Fault counts as completion.
                    if !join_set.iter().all(|p| completed.contains(p)) {
                        debug!(step = %target, "join barrier not yet satisfied");
                        continue;
                    }
                }
                self.spawn_step(graph, target.clone(), &record, &tx, &semaphore, &cancel);
                scheduled.insert(target);
                in_flight += 1;
            }
        }

        record.stage = record.stage.advance(if fatal_faulted {
            Stage::Failed
        } else {
            Stage::Completed
        });
        if record.completed_at.is_none() {
            record.completed_at = Some(Utc::now());
        }
        info!(
            address = %record.address,
            stage = %record.stage,
            steps_run = completed.len(),
            errors = record.errors.len(),
            "research run finished"
        );
        record
    }

    fn spawn_step(
        &self,
        graph: &StepGraph,
        step: StepId,
        record: &ResearchRecord,
        tx: &mpsc::UnboundedSender<StepCompletion>,
        semaphore: &Arc<Semaphore>,
        cancel: &CancellationToken,
    ) {
        let collector = match graph.collector(&step) {
            Some(collector) => collector,
            None => {
                // Unreachable on a validated graph; report and move on.
                let _ = tx.send(StepCompletion {
                    step: step.clone(),
                    outcome: Err(CollectorError::Internal(format!(
                        "no collector bound to step '{}'",
                        step
                    ))),
                    elapsed_ms: 0,
                });
                return;
            }
        };

        debug!(step = %step, collector = collector.name(), "scheduling step");
        let snapshot = Arc::new(record.clone());
        let step_timeout = self.config.step_timeout;
        let tx = tx.clone();
        let semaphore = Arc::clone(semaphore);
        let cancel = cancel.clone();

        tokio::spawn(async move {
            let started = std::time::Instant::now();
            let outcome = match semaphore.acquire_owned().await {
                Ok(_permit) => {
                    if cancel.is_cancelled() {
                        Err(CollectorError::Cancelled)
                    } else {
                        match tokio::time::timeout(
                            step_timeout,
                            collector.collect(&snapshot, &cancel),
                        )
                        .await
                        {
                            Ok(result) => result,
                            Err(_) => Err(CollectorError::Timeout(step_timeout)),
                        }
                    }
                }
                Err(_) => Err(CollectorError::Internal("collector pool closed".into())),
            };
            let _ = tx.send(StepCompletion {
                step,
                outcome,
                elapsed_ms: started.elapsed().as_millis() as u64,
            });
        });
    }
}

/// Merge one completion into the record. Faults become error entries with
/// an empty update so routing still proceeds.
fn fold_completion(record: ResearchRecord, completion: StepCompletion) -> ResearchRecord {
    match completion.outcome {
        Ok(output) => {
            debug!(
                step = %completion.step,
                elapsed_ms = completion.elapsed_ms,
                soft_errors = output.errors.len(),
                "step completed"
            );
            let mut update = output.update;
            for error in output.errors {
                update.errors.push(format!("{}: {}", completion.step, error));
            }
            merge(record, update)
        }
        Err(err) => {
            warn!(step = %completion.step, error = %err, "step faulted, continuing");
            let update =
                RecordUpdate::new().with_error(format!("{}: {}", completion.step, err));
            merge(record, update)
        }
    }
}

/// Evaluate every edge whose source just completed against the merged
/// record, deduplicating targets within this evaluation.
fn route(graph: &StepGraph, from: &StepId, record: &ResearchRecord) -> Vec<StepId> {
    let mut targets = Vec::new();
    for edge in graph.outgoing(from) {
        for target in edge.route(record) {
            if let StepEdge::Conditional { label, .. } = edge {
                debug!(step = %from, predicate = %label, chosen = %target, "conditional edge");
            }
            if !targets.contains(&target) {
                targets.push(target);
            }
        }
    }
    targets
}
