//! Merge-order invariance properties
//!
//! Fan-out branches complete in arbitrary order; the merged record must
//! not depend on that order for any set-union or append-only field.

use deedtrace::{
    merge, OwnerCandidate, OwnerType, PhoneCandidate, RecordUpdate, ResearchRecord,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeSet;

fn branch_updates() -> Vec<RecordUpdate> {
    let mut registry = RecordUpdate::step("registry done");
    registry.add_owner(OwnerCandidate::new("ACME LLC", OwnerType::Llc, "registry"));

    let mut directory = RecordUpdate::step("directory done");
    directory.add_owner(OwnerCandidate::new("Acme L.L.C.", OwnerType::Unknown, "directory"));
    directory.add_phone(PhoneCandidate::new("(212) 555-0100", "directory", Some("Jane Doe")));
    directory.emails.push("jane@acme.example".into());

    let mut people_a = RecordUpdate::new().with_error("people_a: partial result");
    people_a.add_phone(PhoneCandidate::new("2125550100", "people_a", Some("Jane Doe")));
    people_a.add_phone(PhoneCandidate::new("718 555 0123", "people_a", Some("Bob Lee")));
    people_a.emails.push("JANE@ACME.EXAMPLE".into());

    let mut people_b = RecordUpdate::new();
    people_b.add_phone(PhoneCandidate::new("+1 (212) 555-0100", "people_b", None));

    vec![registry, directory, people_a, people_b]
}

/// Content view of a record that ignores discovery indices and list
/// positions.
#[derive(Debug, PartialEq)]
struct ContentView {
    owners: BTreeSet<(String, String)>,
    phones: BTreeSet<(String, Vec<String>, Vec<(String, u32)>)>,
    emails: BTreeSet<String>,
    error_count: usize,
}

fn content_view(record: &ResearchRecord) -> ContentView {
    ContentView {
        owners: record
            .owner_candidates
            .iter()
            .map(|c| (c.name.clone(), c.source.to_string()))
            .collect(),
        phones: record
            .phone_candidates
            .iter()
            .map(|p| {
                (
                    p.digits.clone(),
                    p.sources.iter().map(|s| s.to_string()).collect(),
                    p.contacts
                        .iter()
                        .map(|(name, count)| (name.clone(), *count))
                        .collect(),
                )
            })
            .collect(),
        emails: record.emails.iter().map(|e| e.to_lowercase()).collect(),
        error_count: record.errors.len(),
    }
}

#[test]
fn merge_is_invariant_to_branch_completion_order() {
    let updates = branch_updates();

    let mut in_order = ResearchRecord::new("100 Main St");
    for update in updates.clone() {
        in_order = merge(in_order, update);
    }
    let expected = content_view(&in_order);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let mut shuffled = updates.clone();
        shuffled.shuffle(&mut rng);
        let mut record = ResearchRecord::new("100 Main St");
        for update in shuffled {
            record = merge(record, update);
        }
        assert_eq!(content_view(&record), expected);
    }
}

#[test]
fn errors_grow_monotonically_under_any_order() {
    let updates = branch_updates();
    let mut rng = StdRng::seed_from_u64(11);

    for _ in 0..20 {
        let mut shuffled = updates.clone();
        shuffled.shuffle(&mut rng);

        let mut record = ResearchRecord::new("100 Main St");
        let mut previous: Vec<String> = Vec::new();
        for update in shuffled {
            record = merge(record, update);
            // previous entries survive as a prefix
            assert!(record.errors.len() >= previous.len());
            assert_eq!(&record.errors[..previous.len()], previous.as_slice());
            previous = record.errors.clone();
        }
    }
}

#[test]
fn pairwise_commutativity_on_overlapping_updates() {
    let updates = branch_updates();
    for (i, a) in updates.iter().enumerate() {
        for b in updates.iter().skip(i + 1) {
            let ab = merge(
                merge(ResearchRecord::new("100 Main St"), a.clone()),
                b.clone(),
            );
            let ba = merge(
                merge(ResearchRecord::new("100 Main St"), b.clone()),
                a.clone(),
            );
            assert_eq!(content_view(&ab), content_view(&ba));
        }
    }
}
