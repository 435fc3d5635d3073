//! Reconciliation tuning
//!
//! The exact thresholds (similarity ratio, corroboration count, source
//! priority) are configuration, not invariants; the defaults encode the
//! standard pipeline's sources.

use crate::collect::source;
use crate::record::SourceId;
use std::collections::BTreeSet;

/// Configuration for evidence reconciliation.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Edit-similarity ratio at or above which two names are the same owner
    pub similarity_threshold: f64,
    /// Distinct sources required for `High` confidence
    pub corroboration_count: usize,
    /// Minimum length both names need before substring containment counts
    /// as a match (avoids false positives on short names)
    pub min_substring_len: usize,
    /// Tie-break order among equal-confidence candidates; earlier is better
    pub source_priority: Vec<SourceId>,
    /// Sources whose single assertion rates `Medium` on its own
    pub authoritative: BTreeSet<SourceId>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.95,
            corroboration_count: 2,
            min_substring_len: 5,
            source_priority: vec![
                SourceId::from(source::REGISTRY),
                SourceId::from(source::DEED_EXTRACTION),
                SourceId::from(source::DIRECTORY),
                SourceId::from(source::CORPORATE),
                SourceId::from(source::PEOPLE_PRIMARY),
                SourceId::from(source::PEOPLE_SECONDARY),
                SourceId::from(source::LINE_CHECK),
            ],
            authoritative: [
                SourceId::from(source::REGISTRY),
                SourceId::from(source::DEED_EXTRACTION),
            ]
            .into_iter()
            .collect(),
        }
    }
}

impl ReconcileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_corroboration_count(mut self, count: usize) -> Self {
        self.corroboration_count = count.max(1);
        self
    }

    /// Position of a source in the priority order; unknown sources sort last.
    pub fn priority_index(&self, source: &SourceId) -> usize {
        self.source_priority
            .iter()
            .position(|s| s == source)
            .unwrap_or(usize::MAX)
    }

    pub fn is_authoritative(&self, source: &SourceId) -> bool {
        self.authoritative.contains(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ReconcileConfig::default();
        assert!(config.is_authoritative(&SourceId::from("registry")));
        assert!(!config.is_authoritative(&SourceId::from("directory")));
        assert_eq!(config.priority_index(&SourceId::from("registry")), 0);
        assert_eq!(config.priority_index(&SourceId::from("nonsense")), usize::MAX);
    }
}
