//! Field-level merge of partial updates into the record
//!
//! `merge` is pure and total: it never faults, and every field has a
//! declared reducer. Concurrent fan-out branches produce updates touching
//! overlapping fields of the same record; whole-record last-write-wins
//! would silently drop a branch's contribution, so each field merges
//! independently:
//!
//! - first-source-wins scalars: `address`
//! - last-writer-wins scalars: `current_step`, display owner/contact fields
//! - append-only collections: `errors`
//! - keyed set-union collections: reports (by source), owner candidates
//!   (by name+source), contacts (by name+source), phones (by digit string),
//!   emails (by value)
//! - `stage`: forward-only
//!
//! For the set-union fields the reducer is commutative and associative, so
//! the final record is invariant to branch completion order up to the
//! discovery indices assigned on insertion.

use super::record::ResearchRecord;
use super::update::RecordUpdate;

/// Fold one partial update into a base record, producing the new record.
pub fn merge(base: ResearchRecord, update: RecordUpdate) -> ResearchRecord {
    let mut merged = base;

    // address: keep existing non-empty value. Updates never carry an
    // address today, but the rule is declared with the rest.

    if let Some(step) = update.current_step {
        merged.current_step = step;
    }
    if let Some(pending) = update.pending_steps {
        merged.pending_steps = pending;
    }
    if let Some(stage) = update.stage {
        merged.stage = merged.stage.advance(stage);
    }

    // One report per source; the first one sticks.
    for report in update.reports {
        merged.reports.entry(report.source.clone()).or_insert(report);
    }

    // Owner sightings: union by (name, source). On collision keep the
    // existing entry's discovery order, prefer the more specific type and
    // the higher confidence.
    let mut next_owner_order = next_order(merged.owner_candidates.iter().map(|c| c.order));
    for candidate in update.owner_candidates {
        match merged
            .owner_candidates
            .iter_mut()
            .find(|c| c.name == candidate.name && c.source == candidate.source)
        {
            Some(existing) => {
                if existing.owner_type == super::types::OwnerType::Unknown {
                    existing.owner_type = candidate.owner_type;
                }
                existing.confidence = existing.confidence.max(candidate.confidence);
            }
            None => {
                let mut candidate = candidate;
                candidate.order = next_owner_order;
                next_owner_order += 1;
                merged.owner_candidates.push(candidate);
            }
        }
    }

    // Contacts: union by (name, source); never mutated after creation
    // except an empty role adopting a later one.
    let mut next_contact_order = next_order(merged.contacts.iter().map(|c| c.order));
    for contact in update.contacts {
        match merged
            .contacts
            .iter_mut()
            .find(|c| c.name == contact.name && c.source == contact.source)
        {
            Some(existing) => {
                if existing.role.is_empty() {
                    existing.role = contact.role;
                }
            }
            None => {
                let mut contact = contact;
                contact.order = next_contact_order;
                next_contact_order += 1;
                merged.contacts.push(contact);
            }
        }
    }

    // Phones: union by digit string. Sources and contact co-report counts
    // only grow; `valid` adopts the more decided value with invalid sticky.
    let mut next_phone_order = next_order(merged.phone_candidates.iter().map(|p| p.order));
    for phone in update.phone_candidates {
        match merged
            .phone_candidates
            .iter_mut()
            .find(|p| p.digits == phone.digits)
        {
            Some(existing) => {
                existing.sources.extend(phone.sources);
                for (name, count) in phone.contacts {
                    *existing.contacts.entry(name).or_insert(0) += count;
                }
                if existing.line_type.is_none() {
                    existing.line_type = phone.line_type;
                }
                existing.valid = merge_valid(existing.valid, phone.valid);
                existing.confidence = existing.confidence.max(phone.confidence);
            }
            None => {
                let mut phone = phone;
                phone.order = next_phone_order;
                next_phone_order += 1;
                merged.phone_candidates.push(phone);
            }
        }
    }

    // Validation verdicts attach to known candidates only.
    for validation in update.phone_validations {
        if let Some(candidate) = merged
            .phone_candidates
            .iter_mut()
            .find(|p| p.digits == validation.digits)
        {
            candidate.apply_validation(validation.valid, validation.line_type.as_deref());
        }
    }

    // Emails: union by value, case-insensitive, insertion order kept.
    for email in update.emails {
        let email = email.trim().to_string();
        if email.is_empty() {
            continue;
        }
        let seen = merged
            .emails
            .iter()
            .any(|e| e.eq_ignore_ascii_case(&email));
        if !seen {
            merged.emails.push(email);
        }
    }

    // Reconciler output replaces the working candidate lists wholesale.
    // Only the reconcile step writes these; it runs behind a join barrier,
    // so no concurrent writer exists.
    if let Some(ranked) = update.ranked_owners {
        merged.owner_candidates = ranked;
    }
    if let Some(ranked) = update.ranked_phones {
        merged.phone_candidates = ranked;
    }

    if let Some(owner) = update.primary_owner {
        merged.primary_owner = Some(owner);
    }
    if let Some(owner_type) = update.owner_type {
        merged.owner_type = Some(owner_type);
    }
    if let Some(digits) = update.selected_phone {
        merged.selected_phone = Some(digits);
    }
    if let Some(number) = update.contact_number {
        merged.contact_number = Some(number);
    }
    if let Some(at) = update.completed_at {
        merged.completed_at = Some(at);
    }

    // errors: append-only, order preserved, no dedup.
    merged.errors.extend(update.errors);

    merged
}

fn next_order(orders: impl Iterator<Item = usize>) -> usize {
    orders.max().map(|n| n + 1).unwrap_or(0)
}

/// Tri-state validity: invalid is sticky, any verdict beats no verdict.
fn merge_valid(base: Option<bool>, update: Option<bool>) -> Option<bool> {
    match (base, update) {
        (Some(false), _) | (_, Some(false)) => Some(false),
        (Some(true), _) | (_, Some(true)) => Some(true),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::record::{OwnerCandidate, PhoneCandidate, ResearchRecord, SourceReport};
    use crate::record::types::{Confidence, OwnerType, SourceId, Stage};
    use crate::record::update::PhoneValidation;

    fn base() -> ResearchRecord {
        ResearchRecord::new("100 Main St")
    }

    /// Strip ordering artifacts so records from different merge orders
    /// compare equal on content.
    fn normalized(mut record: ResearchRecord) -> ResearchRecord {
        record
            .owner_candidates
            .sort_by(|a, b| (&a.name, &a.source).cmp(&(&b.name, &b.source)));
        record.phone_candidates.sort_by(|a, b| a.digits.cmp(&b.digits));
        record.contacts.sort_by(|a, b| (&a.name, &a.source).cmp(&(&b.name, &b.source)));
        record.emails.sort();
        for c in &mut record.owner_candidates {
            c.order = 0;
        }
        for p in &mut record.phone_candidates {
            p.order = 0;
        }
        for c in &mut record.contacts {
            c.order = 0;
        }
        record
    }

    #[test]
    fn errors_append_only() {
        let record = base();
        let first = merge(record, RecordUpdate::new().with_error("a"));
        let second = merge(first.clone(), RecordUpdate::new().with_error("b"));
        assert_eq!(second.errors, vec!["a", "b"]);
        // existing prefix untouched
        assert_eq!(&second.errors[..1], &first.errors[..]);
    }

    #[test]
    fn stage_never_goes_backward() {
        let mut record = base();
        record.stage = Stage::Completed;
        let update = RecordUpdate {
            stage: Some(Stage::Running),
            ..RecordUpdate::default()
        };
        assert_eq!(merge(record, update).stage, Stage::Completed);
    }

    #[test]
    fn first_report_per_source_wins() {
        let record = base();
        let first = SourceReport::new("registry", serde_json::json!({"v": 1}));
        let second = SourceReport::new("registry", serde_json::json!({"v": 2}));
        let merged = merge(
            merge(record, RecordUpdate::new().with_report(first)),
            RecordUpdate::new().with_report(second),
        );
        assert_eq!(
            merged.reports[&SourceId::from("registry")].payload["v"],
            serde_json::json!(1)
        );
    }

    #[test]
    fn phone_union_by_digits() {
        let mut a = RecordUpdate::new();
        a.add_phone(PhoneCandidate::new("(212) 555-0100", "people_a", Some("Jane")));
        let mut b = RecordUpdate::new();
        b.add_phone(PhoneCandidate::new("2125550100", "people_b", Some("Jane")));

        let merged = merge(merge(base(), a), b);
        assert_eq!(merged.phone_candidates.len(), 1);
        let phone = &merged.phone_candidates[0];
        assert_eq!(phone.digits, "2125550100");
        assert_eq!(phone.sources.len(), 2);
        assert_eq!(phone.contacts.get("Jane"), Some(&2));
    }

    #[test]
    fn merge_commutative_on_union_fields() {
        let mut a = RecordUpdate::new();
        a.add_owner(OwnerCandidate::new("ACME LLC", OwnerType::Llc, "registry"));
        a.add_phone(PhoneCandidate::new("2125550100", "people_a", Some("Jane")));
        a.emails.push("jane@example.com".into());

        let mut b = RecordUpdate::new();
        b.add_owner(OwnerCandidate::new("ACME LLC", OwnerType::Llc, "directory"));
        b.add_phone(PhoneCandidate::new("(212) 555-0100", "people_b", None));
        b.add_phone(PhoneCandidate::new("7185550123", "people_b", Some("Bob")));
        b.emails.push("bob@example.com".into());

        let ab = merge(merge(base(), a.clone()), b.clone());
        let ba = merge(merge(base(), b), a);
        // invariant to completion order up to discovery indices
        let ab = normalized(ab);
        let mut ba = normalized(ba);
        // run ids and start times differ between the two fresh bases
        ba.run_id = ab.run_id;
        ba.started_at = ab.started_at;
        assert_eq!(ab, ba);
    }

    #[test]
    fn validation_never_invents_candidates() {
        let record = base();
        let update = RecordUpdate {
            phone_validations: vec![PhoneValidation {
                digits: "9999999999".into(),
                valid: true,
                line_type: Some("mobile".into()),
            }],
            ..RecordUpdate::default()
        };
        let merged = merge(record, update);
        assert!(merged.phone_candidates.is_empty());
    }

    #[test]
    fn validation_downgrades_known_candidate() {
        let mut seed = RecordUpdate::new();
        seed.add_phone(PhoneCandidate::new("2125550100", "directory", None));
        let record = merge(base(), seed);

        let update = RecordUpdate {
            phone_validations: vec![PhoneValidation {
                digits: "2125550100".into(),
                valid: false,
                line_type: None,
            }],
            ..RecordUpdate::default()
        };
        let merged = merge(record, update);
        assert_eq!(merged.phone_candidates[0].valid, Some(false));
        // kept for audit
        assert_eq!(merged.phone_candidates.len(), 1);
    }

    #[test]
    fn owner_collision_keeps_order_and_raises_confidence() {
        let mut first = RecordUpdate::new();
        first.add_owner(OwnerCandidate::new("ACME LLC", OwnerType::Unknown, "registry"));
        let mut second = RecordUpdate::new();
        let mut upgraded = OwnerCandidate::new("ACME LLC", OwnerType::Llc, "registry");
        upgraded.confidence = Confidence::High;
        second.add_owner(upgraded);

        let merged = merge(merge(base(), first), second);
        assert_eq!(merged.owner_candidates.len(), 1);
        assert_eq!(merged.owner_candidates[0].order, 0);
        assert_eq!(merged.owner_candidates[0].owner_type, OwnerType::Llc);
        assert_eq!(merged.owner_candidates[0].confidence, Confidence::High);
    }
}
