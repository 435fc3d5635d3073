//! End-to-end scenarios over the standard pipeline and fixture sources

mod common;

use common::{clients_with_failing_directory, clients_with_failing_people_search, fixture_api};
use deedtrace::{
    Confidence, MemorySink, OwnerType, ResearchApi, ResearchConfig, Stage,
};
use std::collections::BTreeSet;
use std::sync::Arc;

// === Scenario: company owner — conditional corporate branch, fan-out, join ===
#[tokio::test]
async fn company_owner_end_to_end() {
    let (api, sink) = fixture_api();
    let record = api
        .run_research("798 Lexington Avenue, New York, NY")
        .await
        .unwrap();

    assert_eq!(record.stage, Stage::Completed);
    assert!(record.errors.is_empty(), "unexpected errors: {:?}", record.errors);

    // registry + deed extraction + directory corroborate the same company
    assert_eq!(record.primary_owner.as_deref(), Some("Lexington Holdings LLC"));
    assert_eq!(record.owner_type, Some(OwnerType::Llc));
    assert_eq!(record.owner_candidates.len(), 1);
    assert_eq!(record.owner_candidates[0].confidence, Confidence::High);

    // every source along the company path filed a report
    let sources: BTreeSet<&str> = record.reports.keys().map(|s| s.as_str()).collect();
    for expected in [
        "registry",
        "records",
        "deed_extraction",
        "corporate_registry",
        "directory",
        "people_search_primary",
        "people_search_secondary",
        "line_check",
    ] {
        assert!(sources.contains(expected), "missing report for {}", expected);
    }

    // the office line is triple-corroborated and wins over the mobile
    assert_eq!(record.phone_candidates.len(), 2);
    let primary = &record.phone_candidates[0];
    assert_eq!(primary.digits, "2125550184");
    assert_eq!(primary.confidence, Confidence::High);
    assert_eq!(primary.sources.len(), 3);
    assert_eq!(primary.valid, Some(true));
    assert_eq!(record.contact_number.as_deref(), Some("(212) 555-0184"));

    // officers from the corporate registry became contacts
    assert!(record.contacts.iter().any(|c| c.name == "Sarah Chen"));
    assert!(!record.emails.is_empty());

    // the terminal record reached the sink
    assert_eq!(sink.records().len(), 1);
}

// === Scenario: individual owner — no documents, no directory listing ===
#[tokio::test]
async fn individual_owner_end_to_end() {
    let (api, _sink) = fixture_api();
    let record = api.run_research("415 Greene Street").await.unwrap();

    assert_eq!(record.stage, Stage::Completed);
    assert_eq!(record.primary_owner.as_deref(), Some("Margaret Holloway"));
    assert_eq!(record.owner_type, Some(OwnerType::Individual));
    // single authoritative source only
    assert_eq!(record.owner_candidates[0].confidence, Confidence::Medium);

    // the corporate branch was not taken
    assert!(record.report("corporate_registry").is_none());

    // both people searches found the same number independently
    assert_eq!(record.phone_candidates.len(), 1);
    let phone = &record.phone_candidates[0];
    assert_eq!(phone.digits, "6465550192");
    assert_eq!(phone.confidence, Confidence::High);
    assert_eq!(phone.valid, Some(true));
    assert_eq!(record.contact_number.as_deref(), Some("(646) 555-0192"));

    // the missing directory listing is a diagnostic, not a failure
    assert_eq!(record.errors.len(), 1);
    assert!(record.errors[0].contains("directory_lookup"));
}

// === Scenario: unknown address — insufficient evidence is a valid state ===
#[tokio::test]
async fn unknown_address_completes_with_empty_candidates() {
    let (api, _sink) = fixture_api();
    let record = api.run_research("1 Nowhere Road, Nowhere").await.unwrap();

    assert_eq!(record.stage, Stage::Completed);
    assert!(record.owner_candidates.is_empty());
    assert!(record.phone_candidates.is_empty());
    assert!(record.primary_owner.is_none());
    assert!(record.contact_number.is_none());
    // every missing source reported a diagnostic
    assert!(!record.errors.is_empty());
}

// === Scenario: collector fault mid-fan-out ===
#[tokio::test]
async fn directory_fault_does_not_halt_the_join() {
    let api = ResearchApi::standard(
        &clients_with_failing_directory(),
        ResearchConfig::default(),
        Arc::new(MemorySink::new()),
    )
    .unwrap();

    let record = api
        .run_research("798 Lexington Avenue, New York, NY")
        .await
        .unwrap();

    // the faulted branch completed, the join fired, the run finished
    assert_eq!(record.stage, Stage::Completed);
    // sibling branches still delivered their evidence
    assert!(record.report("people_search_primary").is_some());
    assert!(record.report("people_search_secondary").is_some());
    assert!(record.report("line_check").is_some());
    // exactly one diagnostic for the faulted branch
    let directory_errors: Vec<&String> = record
        .errors
        .iter()
        .filter(|e| e.contains("directory_lookup"))
        .collect();
    assert_eq!(directory_errors.len(), 1);

    // phones survived through the people searches alone
    assert_eq!(record.phone_candidates.len(), 2);
    assert_eq!(record.contact_number.as_deref(), Some("(212) 555-0184"));
}

// === Scenario: every people-search provider down — evidence degrades, run completes ===
#[tokio::test]
async fn people_search_outage_degrades_confidence() {
    let api = ResearchApi::standard(
        &clients_with_failing_people_search(),
        ResearchConfig::default(),
        Arc::new(MemorySink::new()),
    )
    .unwrap();

    let record = api
        .run_research("798 Lexington Avenue, New York, NY")
        .await
        .unwrap();

    assert_eq!(record.stage, Stage::Completed);
    // the directory's number survives alone, uncorroborated
    assert_eq!(record.phone_candidates.len(), 1);
    let phone = &record.phone_candidates[0];
    assert_eq!(phone.digits, "2125550184");
    assert_eq!(phone.confidence, Confidence::Low);
    // still selected: a Low-confidence valid number beats nothing
    assert_eq!(record.contact_number.as_deref(), Some("(212) 555-0184"));
    // each provider failure was reported per searched name
    assert!(record
        .errors
        .iter()
        .any(|e| e.contains("people_search_primary")));
    assert!(record
        .errors
        .iter()
        .any(|e| e.contains("people_search_secondary")));
}

// === Scenario: re-running the same address touches the same output keys ===
#[tokio::test]
async fn rerun_is_deterministic_in_keys_touched() {
    let (api, _sink) = fixture_api();
    let first = api
        .run_research("798 Lexington Avenue, New York, NY")
        .await
        .unwrap();
    let second = api
        .run_research("798 Lexington Avenue, New York, NY")
        .await
        .unwrap();

    let first_sources: BTreeSet<String> =
        first.reports.keys().map(|s| s.to_string()).collect();
    let second_sources: BTreeSet<String> =
        second.reports.keys().map(|s| s.to_string()).collect();
    assert_eq!(first_sources, second_sources);

    let first_digits: BTreeSet<&str> = first
        .phone_candidates
        .iter()
        .map(|p| p.digits.as_str())
        .collect();
    let second_digits: BTreeSet<&str> = second
        .phone_candidates
        .iter()
        .map(|p| p.digits.as_str())
        .collect();
    assert_eq!(first_digits, second_digits);
    assert_eq!(first.primary_owner, second.primary_owner);
    assert_eq!(first.contact_number, second.contact_number);
}
