//! Phone evidence resolution
//!
//! Scores deduplicated phone candidates on the corroboration ladder,
//! attributes each to the contact most often co-reported with it, and
//! selects a primary number with a stability preference for a previously
//! chosen one.

use super::config::ReconcileConfig;
use crate::record::{Confidence, PhoneCandidate};

/// Score and rank phone candidates.
///
/// Ladder: one non-authoritative source → `Low`; authoritative only →
/// `Medium`; enough distinct sources (authoritative or not) → `High`.
/// Ranking: confidence, then discovery order.
pub fn score_phones(
    candidates: &[PhoneCandidate],
    config: &ReconcileConfig,
) -> Vec<PhoneCandidate> {
    let mut scored: Vec<PhoneCandidate> = candidates
        .iter()
        .cloned()
        .map(|mut candidate| {
            candidate.confidence = ladder(&candidate, config);
            candidate
        })
        .collect();
    scored.sort_by(|a, b| {
        b.confidence
            .cmp(&a.confidence)
            .then_with(|| a.order.cmp(&b.order))
    });
    scored
}

fn ladder(candidate: &PhoneCandidate, config: &ReconcileConfig) -> Confidence {
    let total = candidate.sources.len();
    let authoritative = candidate
        .sources
        .iter()
        .filter(|s| config.is_authoritative(s))
        .count();
    if total >= config.corroboration_count {
        Confidence::High
    } else if authoritative >= 1 {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

/// The contact name most frequently co-reported with this number.
/// Ties and unattributed numbers resolve to `None`; display defaults to
/// "Unknown".
pub fn attributed_contact(candidate: &PhoneCandidate) -> Option<String> {
    let best = candidate.contacts.iter().max_by_key(|(_, count)| **count)?;
    let tied = candidate
        .contacts
        .values()
        .filter(|count| *count == best.1)
        .count();
    if tied > 1 {
        None
    } else {
        Some(best.0.clone())
    }
}

/// Pick the primary number from a ranked candidate list.
///
/// Numbers marked invalid by validation are ineligible. If a previously
/// selected number is still eligible, it stays selected; otherwise the
/// best-ranked eligible candidate wins.
pub fn select_primary<'a>(
    ranked: &'a [PhoneCandidate],
    previously_selected: Option<&str>,
) -> Option<&'a PhoneCandidate> {
    let eligible: Vec<&PhoneCandidate> = ranked.iter().filter(|p| p.eligible()).collect();
    if let Some(digits) = previously_selected {
        if let Some(kept) = eligible.iter().find(|p| p.digits == digits) {
            return Some(kept);
        }
    }
    eligible.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::SourceId;

    fn candidate(raw: &str, sources: &[&str], order: usize) -> PhoneCandidate {
        let mut phone = PhoneCandidate::new(raw, sources[0], None);
        for source in &sources[1..] {
            phone.sources.insert(SourceId::from(*source));
        }
        phone.order = order;
        phone
    }

    #[test]
    fn single_weak_source_is_low() {
        let config = ReconcileConfig::default();
        let scored = score_phones(&[candidate("2125550100", &["directory"], 0)], &config);
        assert_eq!(scored[0].confidence, Confidence::Low);
    }

    #[test]
    fn authoritative_only_is_medium() {
        let config = ReconcileConfig::default();
        let scored = score_phones(&[candidate("2125550100", &["registry"], 0)], &config);
        assert_eq!(scored[0].confidence, Confidence::Medium);
    }

    // === Scenario: corroborated phone across two sources ===
    #[test]
    fn two_independent_sources_are_high() {
        let config = ReconcileConfig::default();
        let scored = score_phones(
            &[candidate("2125550100", &["people_search_primary", "people_search_secondary"], 0)],
            &config,
        );
        assert_eq!(scored[0].confidence, Confidence::High);
    }

    #[test]
    fn corroboration_never_lowers_confidence() {
        let config = ReconcileConfig::default();
        let alone = score_phones(&[candidate("2125550100", &["registry"], 0)], &config);
        let corroborated = score_phones(
            &[candidate("2125550100", &["registry", "directory"], 0)],
            &config,
        );
        assert!(corroborated[0].confidence >= alone[0].confidence);
        assert_eq!(corroborated[0].confidence, Confidence::High);
    }

    #[test]
    fn ranking_is_confidence_then_discovery_order() {
        let config = ReconcileConfig::default();
        let scored = score_phones(
            &[
                candidate("7185550123", &["directory"], 0),
                candidate("2125550100", &["registry", "directory"], 1),
            ],
            &config,
        );
        assert_eq!(scored[0].digits, "2125550100");
        assert_eq!(scored[1].digits, "7185550123");
    }

    #[test]
    fn attribution_prefers_most_frequent_contact() {
        let mut phone = PhoneCandidate::new("2125550100", "directory", Some("Jane Doe"));
        *phone.contacts.entry("Jane Doe".into()).or_insert(0) += 1;
        phone.contacts.insert("Bob Lee".into(), 1);
        assert_eq!(attributed_contact(&phone).as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn attribution_tie_is_unknown() {
        let mut phone = PhoneCandidate::new("2125550100", "directory", Some("Jane Doe"));
        phone.contacts.insert("Bob Lee".into(), 1);
        assert_eq!(attributed_contact(&phone), None);
    }

    #[test]
    fn primary_prefers_previously_selected_number() {
        let config = ReconcileConfig::default();
        let scored = score_phones(
            &[
                candidate("2125550100", &["registry", "directory"], 0),
                candidate("7185550123", &["directory"], 1),
            ],
            &config,
        );
        // the weaker number was selected in an earlier partial run
        let primary = select_primary(&scored, Some("7185550123")).unwrap();
        assert_eq!(primary.digits, "7185550123");
        // absent a previous selection, the ladder decides
        let primary = select_primary(&scored, None).unwrap();
        assert_eq!(primary.digits, "2125550100");
    }

    #[test]
    fn invalid_numbers_lose_eligibility_but_stay_ranked() {
        let config = ReconcileConfig::default();
        let mut best = candidate("2125550100", &["registry", "directory"], 0);
        best.apply_validation(false, Some("voip"));
        let runner_up = candidate("7185550123", &["directory"], 1);

        let scored = score_phones(&[best, runner_up], &config);
        assert_eq!(scored.len(), 2);
        let primary = select_primary(&scored, None).unwrap();
        assert_eq!(primary.digits, "7185550123");
        // even a stale previous selection cannot resurrect an invalid number
        let primary = select_primary(&scored, Some("2125550100")).unwrap();
        assert_eq!(primary.digits, "7185550123");
    }

    #[test]
    fn no_candidates_is_a_valid_state() {
        assert!(select_primary(&[], None).is_none());
    }
}
