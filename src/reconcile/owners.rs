//! Owner identity resolution
//!
//! Clusters owner sightings from all sources into distinct owners,
//! assigns corroboration-based confidence, and picks the primary.

use super::config::ReconcileConfig;
use super::normalize::{infer_owner_type, normalize_name, same_owner};
use crate::record::{Confidence, OwnerCandidate, OwnerType, SourceId};
use std::collections::BTreeSet;

/// Result of owner resolution: one candidate per distinct owner, ranked.
#[derive(Debug, Clone, Default)]
pub struct OwnerResolution {
    /// Best first
    pub ranked: Vec<OwnerCandidate>,
    pub primary: Option<OwnerCandidate>,
}

struct Cluster<'a> {
    norms: Vec<String>,
    members: Vec<&'a OwnerCandidate>,
}

/// Resolve sightings into distinct owners.
///
/// Confidence: `High` when corroborated by enough distinct sources,
/// `Medium` when asserted by exactly one authoritative source, `Low`
/// otherwise. Ranking: confidence, then configured source priority, then
/// discovery order. Zero sightings resolve to an empty result — a valid
/// "insufficient evidence" state.
pub fn resolve_owners(
    candidates: &[OwnerCandidate],
    config: &ReconcileConfig,
) -> OwnerResolution {
    if candidates.is_empty() {
        return OwnerResolution::default();
    }

    // Cluster in discovery order so the earliest sighting anchors its
    // cluster.
    let mut ordered: Vec<&OwnerCandidate> = candidates.iter().collect();
    ordered.sort_by_key(|c| c.order);

    let mut clusters: Vec<Cluster> = Vec::new();
    for candidate in ordered {
        let norm = normalize_name(&candidate.name);
        match clusters
            .iter_mut()
            .find(|cl| cl.norms.iter().any(|n| same_owner(n, &norm, config)))
        {
            Some(cluster) => {
                cluster.norms.push(norm);
                cluster.members.push(candidate);
            }
            None => clusters.push(Cluster {
                norms: vec![norm],
                members: vec![candidate],
            }),
        }
    }

    let mut ranked: Vec<OwnerCandidate> = clusters
        .iter()
        .map(|cluster| resolve_cluster(cluster, config))
        .collect();
    ranked.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| config.priority_index(&a.source).cmp(&config.priority_index(&b.source)))
            .then_with(|| a.order.cmp(&b.order))
    });

    let primary = ranked.first().cloned();
    OwnerResolution { ranked, primary }
}

fn resolve_cluster(cluster: &Cluster, config: &ReconcileConfig) -> OwnerCandidate {
    let sources: BTreeSet<&SourceId> = cluster.members.iter().map(|m| &m.source).collect();
    let confidence = if sources.len() >= config.corroboration_count {
        Confidence::High
    } else if sources.len() == 1 && sources.iter().all(|s| config.is_authoritative(s)) {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    // Representative: the member from the best-priority source, earliest
    // discovered among equals. Its casing becomes the display name.
    let representative = cluster
        .members
        .iter()
        .min_by_key(|m| (config.priority_index(&m.source), m.order))
        .copied()
        .unwrap_or(cluster.members[0]);

    let owner_type = cluster
        .members
        .iter()
        .map(|m| m.owner_type)
        .find(|t| *t != OwnerType::Unknown)
        .unwrap_or_else(|| infer_owner_type(&representative.name));

    let order = cluster.members.iter().map(|m| m.order).min().unwrap_or(0);

    OwnerCandidate {
        name: representative.name.clone(),
        owner_type,
        source: representative.source.clone(),
        confidence,
        order,
    }
}
