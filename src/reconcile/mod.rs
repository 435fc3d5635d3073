//! Evidence reconciliation
//!
//! Turns accumulated owner and phone evidence from all collectors into a
//! ranked, de-duplicated, confidence-labeled view. Reconciliation is pure:
//! zero viable candidates yields an empty outcome, which is a valid
//! "insufficient evidence" terminal state, never an error.

mod config;
mod normalize;
mod owners;
mod phones;

pub use config::ReconcileConfig;
pub use normalize::{edit_similarity, infer_owner_type, normalize_name, same_owner};
pub use owners::{resolve_owners, OwnerResolution};
pub use phones::{attributed_contact, score_phones, select_primary};

use crate::record::{OwnerCandidate, OwnerType, PhoneCandidate, ResearchRecord};

/// Finalized view produced by one reconciliation pass.
#[derive(Debug, Clone, Default)]
pub struct ReconcileOutcome {
    /// Distinct owners, best first; replaces the working candidate list
    pub ranked_owners: Vec<OwnerCandidate>,
    /// Scored phones, best first; replaces the working candidate list
    pub ranked_phones: Vec<PhoneCandidate>,
    pub primary_owner: Option<String>,
    pub owner_type: Option<OwnerType>,
    /// Display form of the chosen contact number
    pub contact_number: Option<String>,
    /// Digits of the chosen contact number, kept for stability across runs
    pub selected_phone: Option<String>,
}

/// Reconciles identity and phone evidence under one configuration.
#[derive(Debug, Clone, Default)]
pub struct EvidenceReconciler {
    config: ReconcileConfig,
}

impl EvidenceReconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReconcileConfig {
        &self.config
    }

    /// Produce the finalized candidate view for a record.
    pub fn reconcile(&self, record: &ResearchRecord) -> ReconcileOutcome {
        let owners = resolve_owners(&record.owner_candidates, &self.config);
        let ranked_phones = score_phones(&record.phone_candidates, &self.config);
        let primary_phone = select_primary(&ranked_phones, record.selected_phone.as_deref());

        ReconcileOutcome {
            primary_owner: owners.primary.as_ref().map(|o| o.name.clone()),
            owner_type: owners.primary.as_ref().map(|o| o.owner_type),
            contact_number: primary_phone.map(|p| p.formatted.clone()),
            selected_phone: primary_phone.map(|p| p.digits.clone()),
            ranked_owners: owners.ranked,
            ranked_phones,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{merge, RecordUpdate};

    #[test]
    fn reconcile_empty_record_is_empty_outcome() {
        let record = ResearchRecord::new("100 Main St");
        let outcome = EvidenceReconciler::default().reconcile(&record);
        assert!(outcome.ranked_owners.is_empty());
        assert!(outcome.ranked_phones.is_empty());
        assert!(outcome.primary_owner.is_none());
        assert!(outcome.contact_number.is_none());
    }

    #[test]
    fn dedup_is_idempotent_for_repeated_reports() {
        // feeding the same (raw, source) pair twice must equal feeding it once
        let mut once = RecordUpdate::new();
        once.add_phone(PhoneCandidate::new("(212) 555-0100", "directory", Some("Jane")));
        let record_once = merge(ResearchRecord::new("100 Main St"), once.clone());

        let record_twice = merge(record_once.clone(), once);

        let reconciler = EvidenceReconciler::default();
        let a = reconciler.reconcile(&record_once);
        let b = reconciler.reconcile(&record_twice);
        assert_eq!(a.ranked_phones.len(), 1);
        assert_eq!(b.ranked_phones.len(), 1);
        assert_eq!(
            a.ranked_phones[0].sources,
            b.ranked_phones[0].sources
        );
        assert_eq!(a.ranked_phones[0].confidence, b.ranked_phones[0].confidence);
    }
}
