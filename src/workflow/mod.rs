//! Workflow graph model and execution engine
//!
//! A graph of named steps bound to collectors, with unconditional,
//! conditional, fan-out, and join-barrier edges. Built once through a
//! validating builder, immutable afterwards, executed by `WorkflowEngine`.

mod edge;
mod engine;
mod graph;
mod step;

pub use edge::{RoutePredicate, StepEdge};
pub use engine::{EngineConfig, WorkflowEngine};
pub use graph::{GraphError, StepGraph, StepGraphBuilder};
pub use step::StepId;
