//! Edges connecting steps in the workflow graph

use super::step::StepId;
use crate::record::ResearchRecord;
use std::sync::Arc;

/// A pure routing predicate evaluated against the merged record.
pub type RoutePredicate = Arc<dyn Fn(&ResearchRecord) -> bool + Send + Sync>;

/// An outgoing edge from a completed step.
#[derive(Clone)]
pub enum StepEdge {
    /// Unconditionally enqueue the target.
    Next { from: StepId, to: StepId },
    /// Evaluate the predicate against the merged record and enqueue
    /// exactly one of the two targets.
    Conditional {
        from: StepId,
        /// Name of the predicate, for logs and Debug output
        label: String,
        predicate: RoutePredicate,
        when_true: StepId,
        when_false: StepId,
    },
    /// Enqueue all targets; they run concurrently on the same merged
    /// snapshot.
    FanOut { from: StepId, to: Vec<StepId> },
}

impl StepEdge {
    /// Create an unconditional edge.
    pub fn next(from: impl Into<StepId>, to: impl Into<StepId>) -> Self {
        Self::Next {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Create a conditional edge.
    pub fn conditional(
        from: impl Into<StepId>,
        label: impl Into<String>,
        predicate: impl Fn(&ResearchRecord) -> bool + Send + Sync + 'static,
        when_true: impl Into<StepId>,
        when_false: impl Into<StepId>,
    ) -> Self {
        Self::Conditional {
            from: from.into(),
            label: label.into(),
            predicate: Arc::new(predicate),
            when_true: when_true.into(),
            when_false: when_false.into(),
        }
    }

    /// Create a fan-out edge.
    pub fn fan_out(
        from: impl Into<StepId>,
        to: impl IntoIterator<Item = impl Into<StepId>>,
    ) -> Self {
        Self::FanOut {
            from: from.into(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Source step of this edge.
    pub fn from(&self) -> &StepId {
        match self {
            Self::Next { from, .. } => from,
            Self::Conditional { from, .. } => from,
            Self::FanOut { from, .. } => from,
        }
    }

    /// All steps this edge can possibly enqueue (used for validation).
    pub fn possible_targets(&self) -> Vec<&StepId> {
        match self {
            Self::Next { to, .. } => vec![to],
            Self::Conditional {
                when_true,
                when_false,
                ..
            } => vec![when_true, when_false],
            Self::FanOut { to, .. } => to.iter().collect(),
        }
    }

    /// Steps this edge enqueues for the given merged record.
    pub fn route(&self, record: &ResearchRecord) -> Vec<StepId> {
        match self {
            Self::Next { to, .. } => vec![to.clone()],
            Self::Conditional {
                predicate,
                when_true,
                when_false,
                ..
            } => {
                if predicate(record) {
                    vec![when_true.clone()]
                } else {
                    vec![when_false.clone()]
                }
            }
            Self::FanOut { to, .. } => to.clone(),
        }
    }
}

impl std::fmt::Debug for StepEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Next { from, to } => write!(f, "Next({} -> {})", from, to),
            Self::Conditional {
                from,
                label,
                when_true,
                when_false,
                ..
            } => write!(
                f,
                "Conditional({} -[{}]-> {} | {})",
                from, label, when_true, when_false
            ),
            Self::FanOut { from, to } => {
                let targets: Vec<&str> = to.iter().map(|t| t.as_str()).collect();
                write!(f, "FanOut({} -> [{}])", from, targets.join(", "))
            }
        }
    }
}
